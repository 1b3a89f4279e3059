//! Business rules for profiles and settings.

pub mod user_service;

pub use user_service::UserService;
