/*!
 * Provider implementations for the translation backend.
 *
 * This module contains the clients the dispatcher can call:
 * - OpenAI: any OpenAI-compatible chat completions API (DeepSeek, OpenAI, ...)
 * - Mock: deterministic in-process provider used by the test suite
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// The dispatcher treats a provider as an opaque remote function: given
/// source text it returns translated text or a `ProviderError`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate one string
    ///
    /// # Arguments
    /// * `text` - The source text
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw translated text or an error
    async fn translate(&self, text: &str) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod openai;
pub mod mock;
