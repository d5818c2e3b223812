//! Light actuator over HTTP
//!
//! Best effort: one GET per command, no retries. Callers log failures.

use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::config::SentryConfig;
use crate::core::ports::LightActuator;
use crate::error::{Result, SentryError};

#[derive(Debug, Clone)]
pub struct HttpLightActuator {
    client: reqwest::Client,
    on_url: String,
    off_url: String,
    runtime: Handle,
}

impl HttpLightActuator {
    /// Must be called inside a tokio runtime
    pub fn new(config: &SentryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.actuator_timeout_ms))
            .build()
            .map_err(|e| SentryError::Config(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            on_url: config.light_on_url.clone(),
            off_url: config.light_off_url.clone(),
            runtime: Handle::current(),
        })
    }

    pub fn url_for(&self, on: bool) -> &str {
        if on {
            &self.on_url
        } else {
            &self.off_url
        }
    }
}

impl LightActuator for HttpLightActuator {
    /// Blocks; call from a blocking thread, never from async code
    fn set_light(&self, on: bool) -> Result<()> {
        let url = self.url_for(on).to_string();
        info!("🔌 light request: {}", url);
        let client = self.client.clone();
        let result = self.runtime.block_on(async move {
            client.get(&url).send().await?.error_for_status()?;
            Ok::<(), reqwest::Error>(())
        });
        result.map_err(|e| {
            warn!(error = %e, on, "light request failed");
            SentryError::ActuatorUnreachable(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreachable_host_is_reported() {
        let config = SentryConfig {
            // Port 9 (discard) on localhost is closed on test machines
            light_on_url: "http://127.0.0.1:9/light/on".into(),
            actuator_timeout_ms: 500,
            ..SentryConfig::default()
        };
        let actuator = HttpLightActuator::new(&config).unwrap();
        assert_eq!(actuator.url_for(true), "http://127.0.0.1:9/light/on");

        let result = tokio::task::spawn_blocking(move || actuator.set_light(true))
            .await
            .unwrap();
        assert!(matches!(result, Err(SentryError::ActuatorUnreachable(_))));
    }
}
