//! Adapter construction by framework.

use hubchat_core::{AdapterError, AdapterResult, AdapterVariant, Framework};

use crate::adapter::ChatAdapter;

#[cfg(feature = "adk")]
use crate::adk::AdkAdapter;
#[cfg(feature = "agno")]
use crate::agno::AgnoAdapter;
#[cfg(feature = "langchain")]
use crate::langchain::LangchainAdapter;

const SUPPORTED: &[Framework] = &[
    #[cfg(feature = "adk")]
    Framework::Adk,
    #[cfg(feature = "agno")]
    Framework::Agno,
    #[cfg(feature = "langchain")]
    Framework::Langchain,
];

/// Builds a fresh, uninitialized adapter for a framework.
///
/// ```rust
/// use hubchat_adapters::{AdapterFactory, ChatAdapter};
/// use hubchat_core::{AdapterVariant, Framework};
///
/// let adapter = AdapterFactory::create("agno", AdapterVariant::Hub).unwrap();
/// assert_eq!(adapter.framework(), Framework::Agno);
/// assert!(AdapterFactory::create_adapter_by_name("Unknown").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterFactory;

impl AdapterFactory {
    /// Direct adapter for `framework`.
    pub fn create_adapter(framework: Framework) -> AdapterResult<Box<dyn ChatAdapter>> {
        Self::build(framework, AdapterVariant::Direct)
    }

    /// Hub-proxied adapter for `framework`.
    pub fn create_hub_adapter(framework: Framework) -> AdapterResult<Box<dyn ChatAdapter>> {
        Self::build(framework, AdapterVariant::Hub)
    }

    /// Direct adapter for a framework name such as `"ADK"` or `"langchain"`.
    pub fn create_adapter_by_name(name: &str) -> AdapterResult<Box<dyn ChatAdapter>> {
        Self::create(name, AdapterVariant::Direct)
    }

    /// Adapter for a framework name and variant.
    ///
    /// Unknown names fail before anything is constructed.
    pub fn create(name: &str, variant: AdapterVariant) -> AdapterResult<Box<dyn ChatAdapter>> {
        let framework: Framework = name.parse()?;
        Self::build(framework, variant)
    }

    /// Whether `name` names a framework with an adapter in this build.
    #[must_use]
    pub fn is_supported(name: &str) -> bool {
        name.parse::<Framework>()
            .is_ok_and(|framework| SUPPORTED.contains(&framework))
    }

    /// Frameworks with an adapter in this build.
    #[must_use]
    pub fn supported_frameworks() -> &'static [Framework] {
        SUPPORTED
    }

    fn build(framework: Framework, variant: AdapterVariant) -> AdapterResult<Box<dyn ChatAdapter>> {
        let hub = variant == AdapterVariant::Hub;
        match framework {
            #[cfg(feature = "adk")]
            Framework::Adk => Ok(Box::new(if hub { AdkAdapter::hub() } else { AdkAdapter::new() })),
            #[cfg(feature = "agno")]
            Framework::Agno => Ok(Box::new(if hub {
                AgnoAdapter::hub()
            } else {
                AgnoAdapter::new()
            })),
            #[cfg(feature = "langchain")]
            Framework::Langchain => Ok(Box::new(if hub {
                LangchainAdapter::hub()
            } else {
                LangchainAdapter::new()
            })),
            #[allow(unreachable_patterns)]
            other => Err(AdapterError::UnsupportedFramework(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("ADK", Framework::Adk)]
    #[case("agno", Framework::Agno)]
    #[case(" Langchain ", Framework::Langchain)]
    #[case("LANGCHAIN", Framework::Langchain)]
    fn test_create_by_name(#[case] name: &str, #[case] expected: Framework) {
        let adapter = AdapterFactory::create_adapter_by_name(name).unwrap();
        assert_eq!(adapter.framework(), expected);
        assert_eq!(adapter.variant(), AdapterVariant::Direct);
        assert!(adapter.supports_streaming());
        assert_eq!(adapter.session_id(), None);
    }

    #[rstest]
    #[case(Framework::Adk)]
    #[case(Framework::Agno)]
    #[case(Framework::Langchain)]
    fn test_create_hub(#[case] framework: Framework) {
        let adapter = AdapterFactory::create_hub_adapter(framework).unwrap();
        assert_eq!(adapter.framework(), framework);
        assert_eq!(adapter.variant(), AdapterVariant::Hub);
    }

    #[rstest]
    #[case("Unknown")]
    #[case("")]
    #[case("crewai")]
    fn test_unknown_framework(#[case] name: &str) {
        let err = AdapterFactory::create_adapter_by_name(name).unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedFramework(_)));
        assert!(!AdapterFactory::is_supported(name));
    }

    #[test]
    fn test_supported_frameworks() {
        assert_eq!(AdapterFactory::supported_frameworks(), Framework::ALL);
        assert!(AdapterFactory::is_supported("Agno"));
        assert!(AdapterFactory::is_supported("adk"));
    }

    #[tokio::test]
    async fn test_created_adapter_requires_initialize() {
        let adapter = AdapterFactory::create_adapter(Framework::Langchain).unwrap();
        let mut callbacks = crate::callbacks::CollectingCallbacks::new();
        let err = adapter
            .send_message("hi".into(), &mut callbacks, &[])
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
