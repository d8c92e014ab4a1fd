//! Backend factory for creating embedding backends from configuration

use super::remote::{RemoteBackend, RemoteConfig};
use super::traits::{EmbeddingBackend, EmbeddingResult};
use crate::core::config::{EmbeddingBackendKind, EmbeddingConfig};
use std::sync::Arc;
use tracing::info;

/// Create an embedding backend from configuration
///
/// Returns an `Arc<dyn EmbeddingBackend>` that can be shared across
/// threads. Asking for the local backend in a build without the
/// `local` feature is a configuration error.
pub fn create_backend(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingBackend>> {
    match config.backend {
        EmbeddingBackendKind::Remote => {
            info!("Creating remote embedding backend: endpoint={}", config.endpoint);

            let backend = RemoteBackend::new(RemoteConfig {
                endpoint: config.endpoint.clone(),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                dimensions: config.dimensions,
                timeout_secs: config.timeout_secs,
                max_batch_size: config.max_batch_size,
            })?;
            Ok(Arc::new(backend))
        }
        EmbeddingBackendKind::Local => create_local(config),
    }
}

#[cfg(feature = "local")]
fn create_local(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingBackend>> {
    use super::local::{LocalBackend, LocalConfig};

    info!("Creating local embedding backend: model={}", config.model);

    let backend = LocalBackend::new(LocalConfig {
        model: config.model.clone(),
        dimensions: config.dimensions,
        max_batch_size: config.max_batch_size,
    })?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "local"))]
fn create_local(_config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingBackend>> {
    Err(super::traits::EmbeddingError::Config(
        "Local embedding backend requires building with --features local".to_string(),
    ))
}
