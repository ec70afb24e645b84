//! Domain models with validation at construction
//!
//! Write payloads are validated when converted into [`NewUser`] or
//! [`UserUpdate`].
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod user;

pub use validation::ValidationError;
pub use user::{NewUser, User, UserInput, UserUpdate};
