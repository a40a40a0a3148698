//! Provider-polymorphic LLM client with unified errors and health checks.
//!
//! - [`config`] — provider tag and per-model configuration
//! - [`llm_service`] — [`llm_service::LlmService`], one variant per provider
//! - [`health_service`] — best-effort and strict provider probes
//! - [`error_handler`] — [`error_handler::AiLlmError`] and its [`error_handler::FailureKind`]
//! - [`telemetry`] — library-scoped log layer

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod llm_service;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, FailureKind};
pub use llm_service::{GenerateParams, LlmService};
