//! HTTP request handlers

pub mod admin;
pub mod farmer;
pub mod health;

pub use admin::*;
pub use farmer::*;
pub use health::*;
