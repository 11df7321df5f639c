//! The seam between the invoker and a text-completion service.

use hdm_model::RawModelText;

use crate::config::{Credential, ModelEndpoint};
use crate::error::Result;

/// One completion call as the backend sees it.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub endpoint: &'a ModelEndpoint,
    pub credential: &'a Credential,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A text-completion service: prompt in, completion text out.
///
/// Implementations return the whole completion or an error, never a partial
/// text, and must not retry on their own.
pub trait CompletionBackend: Send + Sync {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<RawModelText>;
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for &B {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<RawModelText> {
        (**self).complete(request)
    }
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for std::sync::Arc<B> {
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<RawModelText> {
        (**self).complete(request)
    }
}
