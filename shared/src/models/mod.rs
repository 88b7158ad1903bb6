//! Domain models for the FarmHub platform

mod alert;
mod census;
mod market;
mod notification;
mod overview;
mod subject;
mod weather;

pub use alert::*;
pub use census::*;
pub use market::*;
pub use notification::*;
pub use overview::*;
pub use subject::*;
pub use weather::*;
