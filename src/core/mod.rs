//! Core types shared across armsnap: the error model and the cooperative
//! cancellation token.

pub mod cancel;
pub mod error;

pub use cancel::CancelToken;
pub use error::{ArmsnapError, ErrorContext, user_friendly_error};
