//! LLM provider implementations for Lucan.
//!
//! All providers implement the `lucan_core::Provider` trait. The rest of the
//! workspace only ever sees `Arc<dyn Provider>`.

pub mod anthropic;

pub use anthropic::AnthropicProvider;

use lucan_core::error::ProviderError;
use lucan_core::Provider;
use std::sync::Arc;

/// Build the configured provider.
///
/// Fails with `NotConfigured` when no API key was found in the config file
/// or the environment.
pub fn build_provider(
    config: &lucan_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::NotConfigured(
                "no API key found (set LUCAN_API_KEY or ANTHROPIC_API_KEY)".into(),
            )
        })?;

    let provider = AnthropicProvider::new(api_key).with_base_url(config.api_url());
    tracing::debug!(provider = provider.name(), base_url = config.api_url(), "Provider built");
    Ok(Arc::new(provider))
}
