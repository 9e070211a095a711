//! Sublate - provider-agnostic translation client
//!
//! This library hides the difference between providers that translate
//! immediately and providers that run translation jobs (documents) behind a
//! single asynchronous call, with batch support and cancellation.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod providers;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    config::TranslatorConfig,
    errors::{ErrorKind, Result, TranslateError},
    models::{AsyncResponse, Credentials, Format, JobStatus, Language, ProviderId, Request, Response},
    provider::{AsyncClient, Client, SyncClient},
    registry::{Registry, RegistryBuilder},
    translator::{batch_translate, translate, Translator},
};

pub use crate::providers::{builtin_registry, deepl::DeepLClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
