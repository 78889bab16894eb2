//! Adapter configuration.
//!
//! An [`AdapterConfig`] is built by the caller and handed to an adapter's
//! `initialize`. It is immutable for the lifetime of that initialization;
//! persisting choices such as the selected Agno resource is the caller's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::errors::{AdapterError, AdapterResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Kind of resource hosted behind an Agno endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A team of agents. Only team-level events form the answer.
    Team,
    /// A single agent.
    Agent,
}

impl ResourceKind {
    /// URL path segment (`teams` / `agents`).
    #[must_use]
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceKind::Team => "teams",
            ResourceKind::Agent => "agents",
        }
    }

    /// Wire name (`team` / `agent`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Team => "team",
            ResourceKind::Agent => "agent",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource selected on a multi-resource backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedResource {
    /// Team or agent.
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Backend identifier of the resource.
    pub id: String,
}

impl SelectedResource {
    /// Select a team.
    pub fn team(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Team,
            id: id.into(),
        }
    }

    /// Select an agent.
    pub fn agent(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Agent,
            id: id.into(),
        }
    }
}

/// Shape of a Langchain endpoint's response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// `data:` lines, one event per line.
    #[default]
    Sse,
    /// A single blocking JSON body.
    Json,
}

/// Inline markers that wrap reasoning text inside answer content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingMarkers {
    /// Opening marker.
    pub open: String,
    /// Closing marker.
    pub close: String,
}

impl ThinkingMarkers {
    /// Create a custom marker pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for ThinkingMarkers {
    fn default() -> Self {
        Self::new("<think>", "</think>")
    }
}

/// Connection parameters for one adapter instance.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Base URL of the backend or gateway.
    pub endpoint: String,
    /// Bearer token. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Agent identifier known to the gateway.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Server-held session to resume.
    #[serde(default)]
    pub session_id: Option<String>,
    /// User identifier forwarded to backends that track users.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Selected team/agent for multi-resource backends.
    #[serde(default)]
    pub selected_resource: Option<SelectedResource>,
    /// JSON request template; `{{message}}` is replaced with the prompt.
    #[serde(default)]
    pub request_template: Option<String>,
    /// Response shape for user-configured endpoints.
    #[serde(default)]
    pub response_format: ResponseFormat,
    /// Dot path to the answer inside a JSON response, e.g. `result.content`.
    #[serde(default)]
    pub message_path_in_response: Option<String>,
    /// Extra static request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Reasoning markers.
    #[serde(default)]
    pub thinking_markers: ThinkingMarkers,
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("agent_id", &self.agent_id)
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("selected_resource", &self.selected_resource)
            .field("request_template", &self.request_template)
            .field("response_format", &self.response_format)
            .field("message_path_in_response", &self.message_path_in_response)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout_seconds", &self.timeout_seconds)
            .field("thinking_markers", &self.thinking_markers)
            .finish()
    }
}

impl AdapterConfig {
    /// Create a config for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Load from `HUBCHAT_*` environment variables.
    ///
    /// `HUBCHAT_ENDPOINT` is required. `HUBCHAT_RESOURCE_TYPE` (`team`/`agent`)
    /// and `HUBCHAT_RESOURCE_ID` must be set together to select a resource.
    pub fn from_env() -> AdapterResult<Self> {
        let endpoint = std::env::var("HUBCHAT_ENDPOINT")
            .map_err(|_| AdapterError::configuration("HUBCHAT_ENDPOINT not set"))?;

        let mut config = Self::new(endpoint);
        config.api_key = env_opt("HUBCHAT_API_KEY");
        config.agent_id = env_opt("HUBCHAT_AGENT_ID");
        config.session_id = env_opt("HUBCHAT_SESSION_ID");
        config.user_id = env_opt("HUBCHAT_USER_ID");

        if let Some(secs) = env_opt("HUBCHAT_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| {
                AdapterError::configuration(format!("invalid HUBCHAT_TIMEOUT_SECS: {secs}"))
            })?;
            config.timeout_seconds = Some(secs);
        }

        match (env_opt("HUBCHAT_RESOURCE_TYPE"), env_opt("HUBCHAT_RESOURCE_ID")) {
            (Some(kind), Some(id)) => {
                let kind = match kind.to_ascii_lowercase().as_str() {
                    "team" | "teams" => ResourceKind::Team,
                    "agent" | "agents" => ResourceKind::Agent,
                    other => {
                        return Err(AdapterError::configuration(format!(
                            "invalid HUBCHAT_RESOURCE_TYPE: {other}"
                        )))
                    }
                };
                config.selected_resource = Some(SelectedResource { kind, id });
            }
            (None, None) => {}
            _ => {
                return Err(AdapterError::configuration(
                    "HUBCHAT_RESOURCE_TYPE and HUBCHAT_RESOURCE_ID must be set together",
                ))
            }
        }

        Ok(config)
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the agent id.
    #[must_use]
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Set the session to resume.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the user id.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Select a team or agent.
    #[must_use]
    pub fn with_selected_resource(mut self, resource: SelectedResource) -> Self {
        self.selected_resource = Some(resource);
        self
    }

    /// Set the request template.
    #[must_use]
    pub fn with_request_template(mut self, template: impl Into<String>) -> Self {
        self.request_template = Some(template.into());
        self
    }

    /// Set the response format.
    #[must_use]
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Set the answer path for JSON responses.
    #[must_use]
    pub fn with_message_path(mut self, path: impl Into<String>) -> Self {
        self.message_path_in_response = Some(path.into());
        self
    }

    /// Add a static request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = Some(timeout.as_secs());
        self
    }

    /// Set custom reasoning markers.
    #[must_use]
    pub fn with_thinking_markers(mut self, markers: ThinkingMarkers) -> Self {
        self.thinking_markers = markers;
        self
    }

    /// Effective request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Endpoint without trailing slashes.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Check the parts every adapter relies on.
    pub fn validate(&self) -> AdapterResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(AdapterError::configuration("endpoint is empty"));
        }
        Url::parse(self.base_url()).map_err(|e| {
            AdapterError::configuration(format!("invalid endpoint {}: {e}", self.endpoint))
        })?;
        if self.thinking_markers.open.is_empty() || self.thinking_markers.close.is_empty() {
            return Err(AdapterError::configuration("thinking markers must not be empty"));
        }
        Ok(())
    }

    /// The agent id, or a configuration error naming the adapter that needs it.
    pub fn require_agent_id(&self, adapter: &str) -> AdapterResult<&str> {
        self.agent_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AdapterError::configuration(format!("{adapter} requires an agent_id")))
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder() {
        let config = AdapterConfig::new("http://localhost:8000/")
            .with_api_key("secret")
            .with_agent_id("agent-1")
            .with_selected_resource(SelectedResource::team("research"))
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.selected_resource.as_ref().map(|r| r.kind),
            Some(ResourceKind::Team)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        assert!(AdapterConfig::new("").validate().is_err());
        assert!(AdapterConfig::new("not a url").validate().is_err());
    }

    #[test]
    fn test_api_key_not_serialized_or_logged() {
        let config = AdapterConfig::new("http://localhost").with_api_key("secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: AdapterConfig = serde_json::from_str(
            r#"{
                "endpoint": "http://localhost:7777",
                "selectedResource": {"type": "agent", "id": "a1"},
                "responseFormat": "json",
                "messagePathInResponse": "result.content"
            }"#,
        )
        .unwrap();

        assert_eq!(config.selected_resource, Some(SelectedResource::agent("a1")));
        assert_eq!(config.response_format, ResponseFormat::Json);
        assert_eq!(config.message_path_in_response.as_deref(), Some("result.content"));
        assert_eq!(config.thinking_markers, ThinkingMarkers::default());
    }

    #[test]
    fn test_require_agent_id() {
        let config = AdapterConfig::new("http://localhost");
        assert!(config.require_agent_id("ADK").is_err());
        let config = config.with_agent_id("a");
        assert_eq!(config.require_agent_id("ADK").unwrap(), "a");
    }
}
