//! Agent framework identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AdapterError;

/// Agent backend framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Framework {
    /// Google Agent Development Kit, reached through the console gateway.
    #[serde(rename = "ADK")]
    Adk,
    /// Agno team/agent runtime.
    #[serde(rename = "Agno")]
    Agno,
    /// Langchain / LangServe style endpoints.
    #[serde(rename = "Langchain")]
    Langchain,
}

impl Framework {
    /// Every supported framework, in display order.
    pub const ALL: &'static [Framework] = &[Framework::Adk, Framework::Agno, Framework::Langchain];

    /// Display name, also the accepted identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Adk => "ADK",
            Framework::Agno => "Agno",
            Framework::Langchain => "Langchain",
        }
    }

    /// Lowercase tag used in gateway envelopes.
    #[must_use]
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Framework::Adk => "adk",
            Framework::Agno => "agno",
            Framework::Langchain => "langchain",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adk" => Ok(Framework::Adk),
            "agno" => Ok(Framework::Agno),
            "langchain" => Ok(Framework::Langchain),
            _ => Err(AdapterError::UnsupportedFramework(s.to_string())),
        }
    }
}

/// How an adapter reaches its backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterVariant {
    /// Talks to the framework's own endpoint (or the workbench gateway for ADK).
    #[default]
    Direct,
    /// Goes through the shared hub gateway.
    Hub,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ADK", Framework::Adk)]
    #[case("adk", Framework::Adk)]
    #[case("Agno", Framework::Agno)]
    #[case(" AGNO ", Framework::Agno)]
    #[case("Langchain", Framework::Langchain)]
    #[case("langchain", Framework::Langchain)]
    fn test_parse_framework(#[case] input: &str, #[case] expected: Framework) {
        assert_eq!(input.parse::<Framework>().unwrap(), expected);
    }

    #[rstest]
    #[case("Unknown")]
    #[case("")]
    #[case("crewai")]
    fn test_parse_unknown_framework(#[case] input: &str) {
        let err = input.parse::<Framework>().unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedFramework(_)));
    }

    #[test]
    fn test_display_round_trips() {
        for framework in Framework::ALL {
            assert_eq!(framework.to_string().parse::<Framework>().unwrap(), *framework);
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Framework::Adk).unwrap(), "\"ADK\"");
        let parsed: Framework = serde_json::from_str("\"Langchain\"").unwrap();
        assert_eq!(parsed, Framework::Langchain);
    }
}
