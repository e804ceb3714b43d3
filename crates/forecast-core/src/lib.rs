pub mod config;
pub mod error;

pub use config::{Config, ForecastConfig, IconConfig, ValidationResult};
pub use error::{ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging for the forecast application.
///
/// Honors `RUST_LOG`; falls back to `info`. When a global subscriber is
/// already installed it is kept and the attempt is logged through it.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    if let Err(e) = installed {
        tracing::debug!("Keeping existing tracing subscriber: {}", e);
    }

    tracing::info!("Forecast core initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_keeps_first_subscriber() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }
}
