//! Gemini transports for Tailorbird: a direct generateContent client
//! for deployments holding their own API key, and a relay client for
//! those that defer the provider call to a server-side proxy. Both
//! implement `tailorbird_core::InferenceClient`, so everything above
//! the transport is agnostic to which one is active.

mod credentials;
mod direct;
mod factory;
mod proxy;
mod wire;

pub use credentials::{
    migrate_legacy_credential, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
pub use direct::DirectClient;
pub use factory::ClientFactory;
pub use proxy::ProxyClient;
