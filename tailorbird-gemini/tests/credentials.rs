use secrecy::{ExposeSecret, SecretString};

use tailorbird_gemini::{
    migrate_legacy_credential, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};

#[tokio::test]
async fn migrates_legacy_key_and_removes_the_old_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("gemini_api_key"), "legacy-key\n").unwrap();
    let store = FileCredentialStore::new(dir.path());

    assert!(migrate_legacy_credential(&store).await.unwrap());

    let key = store.load().await.unwrap().unwrap();
    assert_eq!(key.expose_secret(), "legacy-key");
    assert!(!dir.path().join("gemini_api_key").exists());

    // Nothing left to move on a second run.
    assert!(!migrate_legacy_credential(&store).await.unwrap());
}

#[tokio::test]
async fn existing_credential_wins_over_legacy() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path());
    store
        .store(SecretString::new("current-key".to_string()))
        .await
        .unwrap();
    std::fs::write(dir.path().join("gemini_api_key"), "stale-key").unwrap();

    assert!(!migrate_legacy_credential(&store).await.unwrap());
    assert_eq!(
        store.load().await.unwrap().unwrap().expose_secret(),
        "current-key"
    );
    // The stale plaintext copy is still cleaned up.
    assert!(!dir.path().join("gemini_api_key").exists());
}

#[tokio::test]
async fn missing_and_blank_credentials_load_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileCredentialStore::new(dir.path());

    assert!(store.load().await.unwrap().is_none());
    assert!(store.load_legacy().await.unwrap().is_none());

    std::fs::write(dir.path().join("gemini_api_key"), "   \n").unwrap();
    assert!(store.load_legacy().await.unwrap().is_none());
}

#[tokio::test]
async fn memory_store_migration_round_trip() {
    let store = MemoryCredentialStore::new().with_legacy(SecretString::new("old".to_string()));

    assert!(migrate_legacy_credential(&store).await.unwrap());
    assert_eq!(store.load().await.unwrap().unwrap().expose_secret(), "old");
    assert!(store.load_legacy().await.unwrap().is_none());
}
