//! Per-call transport selection: direct when a local credential exists,
//! relay otherwise.

use std::sync::Arc;

use tokio::sync::OnceCell;

use tailorbird_core::{InferenceClient, TailorbirdError};

use crate::{migrate_legacy_credential, CredentialStore, DirectClient, ProxyClient};

// One migration per process lifetime. Concurrent first callers await the
// winner; a failed migration logs and stays closed rather than re-running
// against storage that already failed once.
static LEGACY_MIGRATION: OnceCell<()> = OnceCell::const_new();

pub struct ClientFactory {
    store: Arc<dyn CredentialStore>,
    relay_url: Option<String>,
    gemini_base_url: Option<String>,
}

impl ClientFactory {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            relay_url: None,
            gemini_base_url: None,
        }
    }

    pub fn with_relay_url(mut self, relay_url: impl Into<String>) -> Self {
        self.relay_url = Some(relay_url.into());
        self
    }

    /// Overrides the Gemini endpoint, for regional deployments and tests.
    pub fn with_gemini_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.gemini_base_url = Some(base_url.into());
        self
    }

    /// Selects the transport for one call. A credential read failure is
    /// treated as an absent credential so a corrupt local file degrades
    /// to the relay instead of taking the feature down.
    pub async fn resolve(&self) -> Result<Arc<dyn InferenceClient>, TailorbirdError> {
        LEGACY_MIGRATION
            .get_or_init(|| async {
                match migrate_legacy_credential(self.store.as_ref()).await {
                    Ok(true) => tracing::debug!("migrated legacy Gemini credential"),
                    Ok(false) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "legacy credential migration failed")
                    }
                }
            })
            .await;

        let credential = match self.store.load().await {
            Ok(credential) => credential,
            Err(err) => {
                tracing::warn!(error = %err, "credential load failed, falling back to relay");
                None
            }
        };

        if let Some(key) = credential {
            let mut client = DirectClient::new(key);
            if let Some(base_url) = &self.gemini_base_url {
                client = client.with_base_url(base_url.clone());
            }
            return Ok(Arc::new(client));
        }

        match &self.relay_url {
            Some(relay_url) => Ok(Arc::new(ProxyClient::new(relay_url.clone()))),
            None => Err(TailorbirdError::InvalidConfig(
                "no Gemini credential stored and no relay endpoint configured".to_string(),
            )),
        }
    }
}
