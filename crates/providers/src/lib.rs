//! LLM provider implementations for Coursewise.
//!
//! All providers implement the `coursewise_core::Provider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;

use std::sync::Arc;

use coursewise_config::AppConfig;
use coursewise_core::Provider;
use coursewise_core::error::ProviderError;

/// Build the configured provider, failing early when no API key is set.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured("no Anthropic API key (set ANTHROPIC_API_KEY)".into())
    })?;

    let mut provider = AnthropicProvider::new(api_key);
    if let Some(url) = &config.base_url {
        provider = provider.with_base_url(url);
    }
    Ok(Arc::new(provider))
}
