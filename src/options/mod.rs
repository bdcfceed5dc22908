//! Client configuration with TOML file support.
//!
//! Every timing constant of the protocol (connect timeout, reconnect delay,
//! ordering-lock wait, outbound throttles, child-list delays, upload chunk
//! size) lives here. Sub-structs use `#[serde(default)]` so partial TOML
//! files (e.g. only overriding `[transport]`) work correctly.

mod interaction;
mod scene;
mod transfer;
mod transport;

use std::path::Path;

pub use interaction::InteractionOptions;
pub use scene::SceneOptions;
use serde::{Deserialize, Serialize};
pub use transfer::TransferOptions;
pub use transport::TransportOptions;

use crate::error::ClientError;

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ClientOptions {
    /// Connection timing.
    pub transport: TransportOptions,
    /// Pointer thresholds and outbound rate limits.
    pub interaction: InteractionOptions,
    /// Scene graph propagation tuning.
    pub scene: SceneOptions,
    /// File transfer parameters.
    pub transfer: TransferOptions,
}

impl ClientOptions {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read and
    /// [`ClientError::OptionsParse`] if it is not valid TOML for this
    /// schema.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::OptionsParse`] on malformed input.
    pub fn from_toml(content: &str) -> Result<Self, ClientError> {
        toml::from_str(content)
            .map_err(|e| ClientError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ClientError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = ClientOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: ClientOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let parsed = ClientOptions::from_toml(
            "[transport]\nreconnect_delay_ms = 250\n",
        )
        .unwrap();
        assert_eq!(parsed.transport.reconnect_delay_ms, 250);
        assert_eq!(parsed.transport.connect_timeout_ms, 5000);
        assert_eq!(parsed.interaction, InteractionOptions::default());
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = ClientOptions::from_toml("transport = 3").unwrap_err();
        assert!(matches!(err, ClientError::OptionsParse(_)));
    }

    #[test]
    fn child_delay_grows_with_fan_out() {
        let scene = SceneOptions::default();
        assert_eq!(scene.child_list_delay(3), Duration::ZERO);
        assert_eq!(scene.child_list_delay(16), Duration::from_millis(50));
        assert_eq!(scene.child_list_delay(127), Duration::from_millis(50));
        assert_eq!(scene.child_list_delay(128), Duration::from_millis(200));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("scenelink-opts-{}", std::process::id()));
        let path = dir.join("client.toml");
        let mut opts = ClientOptions::default();
        opts.transfer.upload_chunk_bytes = 1024;
        opts.save(&path).unwrap();
        let loaded = ClientOptions::load(&path).unwrap();
        assert_eq!(loaded, opts);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
