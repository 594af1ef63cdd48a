use axum::extract::FromRef;
use dispatch::Dispatcher;
use std::sync::Arc;

/// State passed to each request handler
#[derive(Clone)]
pub(crate) struct AppState {
    pub dispatcher: Dispatcher,
    pub secret: ApiSecret,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, secret: ApiSecret) -> AppState {
        AppState { dispatcher, secret }
    }
}

impl FromRef<AppState> for Dispatcher {
    fn from_ref(state: &AppState) -> Self {
        state.dispatcher.clone()
    }
}

impl FromRef<AppState> for ApiSecret {
    fn from_ref(state: &AppState) -> Self {
        state.secret.clone()
    }
}

/// The shared secret callers must present to trigger a run
///
/// Only a hash of the secret is kept, so checks compare in constant time.
#[derive(Clone)]
pub struct ApiSecret(Arc<blake3::Hash>);

impl ApiSecret {
    pub fn new(secret: &str) -> Self {
        Self(Arc::new(blake3::hash(secret.as_bytes())))
    }

    /// Check a credential, with or without a `Bearer` prefix
    pub fn verify(&self, credential: &str) -> bool {
        let credential = credential.strip_prefix("Bearer ").unwrap_or(credential);
        blake3::hash(credential.as_bytes()) == *self.0
    }
}

impl std::fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiSecret(..)")
    }
}
