//! Integration tests for the users crate against the in-memory store

use std::sync::Arc;

use serde_json::json;
use taskdash_users::{
    utils::{hash_password, verify_password},
    MemoryUserStore, NewUser, ProfileUpdate, SettingsPatch, User, UserError, UserService,
    UserSettings, UserStore,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

async fn service_with_user(username: &str, email: &str) -> (UserService, User) {
    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    let hash = hash_password("password123").await.unwrap();
    let user = store
        .insert(User::new(NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: hash,
        }))
        .await
        .unwrap();
    (UserService::new(store), user)
}

#[tokio::test]
async fn settings_read_before_any_write_returns_defaults() -> TestResult {
    let (service, user) = service_with_user("ada", "ada@example.com").await;

    let settings = service.get_settings(&user.id).await?;
    assert_eq!(settings, UserSettings::default());
    Ok(())
}

#[tokio::test]
async fn settings_write_merges_over_current_values() -> TestResult {
    let (service, user) = service_with_user("ada", "ada@example.com").await;

    let first = SettingsPatch::from_json(&json!({ "darkMode": true }))?;
    service.update_settings(&user.id, &first).await?;

    let second = SettingsPatch::from_json(&json!({ "pushNotifications": true }))?;
    let settings = service.update_settings(&user.id, &second).await?;

    assert!(settings.dark_mode);
    assert!(settings.push_notifications);
    assert!(settings.email_notifications);
    assert_eq!(service.get_settings(&user.id).await?, settings);
    Ok(())
}

#[tokio::test]
async fn rejected_settings_write_leaves_settings_untouched() -> TestResult {
    let (service, user) = service_with_user("ada", "ada@example.com").await;

    let result = SettingsPatch::from_json(&json!({ "darkMode": true, "language": "fr" }));
    assert!(matches!(result, Err(UserError::InvalidSettings(_))));

    assert_eq!(service.get_settings(&user.id).await?, UserSettings::default());
    Ok(())
}

#[tokio::test]
async fn profile_update_rehashes_password_and_clears_bio() -> TestResult {
    let (service, user) = service_with_user("ada", "ada@example.com").await;

    let with_bio = ProfileUpdate::from_json(&json!({ "bio": "Analyst" }))?;
    let updated = service.update_profile(&user.id, with_bio).await?;
    assert_eq!(updated.bio.as_deref(), Some("Analyst"));

    let update = ProfileUpdate::from_json(&json!({ "password": "new-secret", "bio": null }))?;
    let updated = service.update_profile(&user.id, update).await?;

    assert!(updated.bio.is_none());
    assert_ne!(updated.password_hash, user.password_hash);
    assert!(verify_password("new-secret", &updated.password_hash).await?);
    assert!(!verify_password("password123", &updated.password_hash).await?);
    Ok(())
}

#[tokio::test]
async fn profile_update_rejects_email_of_another_user() -> TestResult {
    let (service, ada) = service_with_user("ada", "ada@example.com").await;
    service
        .store()
        .insert(User::new(NewUser {
            username: "grace".into(),
            email: "grace@example.com".into(),
            password_hash: "hash".into(),
        }))
        .await?;

    let update = ProfileUpdate::from_json(&json!({ "email": "Grace@Example.com" }))?;
    let result = service.update_profile(&ada.id, update).await;
    assert!(matches!(result, Err(UserError::EmailTaken)));

    let update = ProfileUpdate::from_json(&json!({ "username": "grace" }))?;
    let result = service.update_profile(&ada.id, update).await;
    assert!(matches!(result, Err(UserError::UsernameTaken)));

    let unchanged = service.get_user(&ada.id).await?;
    assert_eq!(unchanged.email, "ada@example.com");
    assert_eq!(unchanged.username, "ada");
    Ok(())
}

#[tokio::test]
async fn keeping_own_username_is_not_a_conflict() -> TestResult {
    let (service, ada) = service_with_user("ada", "ada@example.com").await;

    let update = ProfileUpdate::from_json(&json!({ "username": "ada", "email": "ada@example.com" }))?;
    let updated = service.update_profile(&ada.id, update).await?;
    assert_eq!(updated.id, ada.id);
    Ok(())
}

#[tokio::test]
async fn deleted_user_is_gone() -> TestResult {
    let (service, user) = service_with_user("ada", "ada@example.com").await;

    service.delete_user(&user.id).await?;

    assert!(matches!(
        service.get_user(&user.id).await,
        Err(UserError::UserNotFound)
    ));
    assert!(matches!(
        service.get_settings(&user.id).await,
        Err(UserError::UserNotFound)
    ));
    Ok(())
}
