//! Shared types for the user system.

pub mod errors;

pub use errors::{UserError, UserResult};
