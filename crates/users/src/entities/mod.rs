//! Domain entities for the user system.

pub mod profile;
pub mod settings;
pub mod user;

pub use profile::ProfileUpdate;
pub use settings::{SettingsPatch, UserSettings};
pub use user::{NewUser, User};
