//! Backend connectivity check.

use readymix_backend::http::HttpBackend;

use crate::env;

/// Probe the hosted backend's health endpoint.
///
/// # Errors
///
/// Returns an error when configuration is incomplete or the backend is
/// unreachable or unhealthy.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = env::backend_config()?;
    tracing::info!(project = %config.project, "checking backend connectivity");

    let backend = HttpBackend::connect(&config)?;
    backend.ping().await?;

    tracing::info!("backend is reachable and healthy");
    Ok(())
}
