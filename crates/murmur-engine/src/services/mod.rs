//! Engine service handlers for front-end-driven requests.
//!
//! This module groups async request handlers that operate on the shared
//! `AppContext`, perform side effects (network, filesystem, inference), and
//! emit progress or results back to the front end.

pub mod config_service;
pub mod model_service;
pub mod transcription_service;

/// Represents a type that is used in all handlers as an engine context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::app::AppContext>;
