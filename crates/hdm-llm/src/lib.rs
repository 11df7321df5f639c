//! Model invocation for mapping prompts.
//!
//! A [`ModelInvoker`] resolves a model selector to a configured serving
//! endpoint, attaches the bearer token and returns the complete completion
//! text. Transport is behind [`CompletionBackend`]; [`HttpBackend`] is the
//! production implementation.
//!
//! Prompt and completion text are never logged. Only lengths, durations and
//! error kinds are.

#![deny(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod invoker;

pub use backend::{CompletionBackend, CompletionRequest};
pub use config::{
    BackendSettings, Credential, DEFAULT_TOKEN_ENV, InvokerConfig, ModelEndpoint,
    PLACEHOLDER_TOKEN, default_models,
};
pub use error::{InvokeError, Result};
pub use http::HttpBackend;
pub use invoker::{ConnectionCheck, ModelInvoker};
