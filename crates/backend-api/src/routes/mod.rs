pub mod auth;
pub mod health;
pub mod models;
pub mod profile;
pub mod settings;
