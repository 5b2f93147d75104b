pub mod auth;
pub(crate) mod macros;
pub mod notification;
pub mod organization;
pub mod shift;
pub mod shift_request;

// Re-export all models for easy importing
pub use auth::*;
pub use notification::*;
pub use organization::*;
pub use shift::*;
pub use shift_request::*;
