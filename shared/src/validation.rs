//! Validation utilities for FarmHub requests
//!
//! Includes India-specific checks for postal codes and mobile numbers.

/// Longest notification body accepted for bulk dispatch
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Validate an Indian postal code (PIN): six digits, not starting with zero
pub fn validate_pincode(pincode: &str) -> Result<(), &'static str> {
    let bytes = pincode.as_bytes();
    if bytes.len() != 6 || !bytes.iter().all(u8::is_ascii_digit) {
        return Err("Pincode must be exactly 6 digits");
    }
    if bytes[0] == b'0' {
        return Err("Pincode cannot start with 0");
    }
    Ok(())
}

/// Validate an Indian mobile number, with or without the +91 / 91 / 0 prefix
pub fn validate_mobile_number(number: &str) -> Result<(), &'static str> {
    let digits: String = number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    let local = digits
        .strip_prefix("+91")
        .or_else(|| (digits.len() == 12).then(|| digits.strip_prefix("91")).flatten())
        .or_else(|| (digits.len() == 11).then(|| digits.strip_prefix('0')).flatten())
        .unwrap_or(digits.as_str());

    if local.len() != 10 || !local.chars().all(|c| c.is_ascii_digit()) {
        return Err("Mobile number must have 10 digits");
    }
    if !matches!(local.chars().next(), Some('6'..='9')) {
        return Err("Mobile number must start with 6, 7, 8 or 9");
    }
    Ok(())
}

/// Validate a notification body
pub fn validate_message(message: &str) -> Result<(), &'static str> {
    if message.trim().is_empty() {
        return Err("Message is required");
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err("Message is too long");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pincode_valid() {
        assert!(validate_pincode("110001").is_ok());
        assert!(validate_pincode("560001").is_ok());
    }

    #[test]
    fn test_validate_pincode_invalid() {
        assert!(validate_pincode("11001").is_err()); // Too short
        assert!(validate_pincode("1100011").is_err()); // Too long
        assert!(validate_pincode("011001").is_err()); // Leading zero
        assert!(validate_pincode("11A001").is_err());
    }

    #[test]
    fn test_validate_mobile_number_valid() {
        assert!(validate_mobile_number("9876543210").is_ok());
        assert!(validate_mobile_number("+919876543210").is_ok());
        assert!(validate_mobile_number("919876543210").is_ok());
        assert!(validate_mobile_number("09876543210").is_ok());
        assert!(validate_mobile_number("98765-43210").is_ok());
    }

    #[test]
    fn test_validate_mobile_number_invalid() {
        assert!(validate_mobile_number("12345").is_err());
        assert!(validate_mobile_number("1234567890").is_err()); // Bad leading digit
        assert!(validate_mobile_number("98765abcde").is_err());
    }

    #[test]
    fn test_validate_message() {
        assert!(validate_message("Rain expected tomorrow").is_ok());
        assert!(validate_message("   ").is_err());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
    }
}
