//! Configuration, HTTP client, and session state shared by every adapter.

use hubchat_core::{AdapterConfig, AdapterError, AdapterResult};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;

use crate::lifecycle::SendLifecycle;

/// Everything `initialize` produces.
#[derive(Debug, Clone)]
pub(crate) struct Initialized {
    pub config: Arc<AdapterConfig>,
    pub client: Client,
}

impl Initialized {
    /// POST request with auth and static headers applied.
    pub fn post(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.post(url);
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }
        for (name, value) in &self.config.headers {
            request = request.header(name, value);
        }
        request
    }
}

/// Interior state of an adapter instance.
#[derive(Debug, Default)]
pub(crate) struct AdapterState {
    initialized: RwLock<Option<Initialized>>,
    session_id: RwLock<Option<String>>,
    pub lifecycle: SendLifecycle,
}

impl AdapterState {
    /// Validate the config, build a client, and replace all prior state.
    pub fn initialize(&self, config: AdapterConfig) -> AdapterResult<()> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AdapterError::configuration(format!("failed to build HTTP client: {e}")))?;

        self.lifecycle.cancel();
        *self.session_id.write() = config.session_id.clone();
        *self.initialized.write() = Some(Initialized {
            config: Arc::new(config),
            client,
        });
        Ok(())
    }

    /// Current configuration and client.
    pub fn snapshot(&self) -> AdapterResult<Initialized> {
        self.initialized
            .read()
            .clone()
            .ok_or_else(AdapterError::not_initialized)
    }

    /// Cancel and forget everything.
    pub fn dispose(&self) {
        self.lifecycle.cancel();
        self.initialized.write().take();
        self.session_id.write().take();
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().clone()
    }

    pub fn set_session_id(&self, session_id: String) {
        *self.session_id.write() = Some(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_snapshot_fails() {
        let state = AdapterState::default();
        let err = state.snapshot().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_initialize_and_dispose() {
        let state = AdapterState::default();
        state
            .initialize(AdapterConfig::new("http://localhost:8000").with_session_id("s1"))
            .unwrap();
        assert!(state.snapshot().is_ok());
        assert_eq!(state.session_id().as_deref(), Some("s1"));

        state.dispose();
        assert!(state.snapshot().is_err());
        assert_eq!(state.session_id(), None);
    }

    #[test]
    fn test_reinitialize_resets_session() {
        let state = AdapterState::default();
        state.initialize(AdapterConfig::new("http://localhost:8000")).unwrap();
        state.set_session_id("server-issued".into());

        state.initialize(AdapterConfig::new("http://localhost:9000")).unwrap();
        assert_eq!(state.session_id(), None);
        assert_eq!(state.snapshot().unwrap().config.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let state = AdapterState::default();
        assert!(state.initialize(AdapterConfig::new("")).is_err());
        assert!(state.snapshot().is_err());
    }
}
