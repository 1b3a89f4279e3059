//! # Taskdash Users Crate
//!
//! User domain for the Taskdash backend: the `User` entity, the flat
//! settings object and its merge rules, profile updates, input validation,
//! password hashing, and the `UserStore` repository seam.
//!
//! ## Architecture
//!
//! - **Entities**: domain models (`User`, `UserSettings`, `ProfileUpdate`)
//! - **Repositories**: the `UserStore` trait plus an in-memory implementation
//! - **Services**: `UserService`, the profile and settings business rules
//! - **Types**: error definitions
//! - **Utils**: validation and password hashing

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;

pub use entities::{
    NewUser, ProfileUpdate, SettingsPatch, User, UserSettings,
};
pub use repositories::{MemoryUserStore, UserStore};
pub use services::UserService;
pub use types::{UserError, UserResult};
