// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Application configuration (panel, connection, mixer behavior).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Edge of the screen the hosting panel is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelEdge {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

/// Panel item settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Icon shown in the panel.
    pub icon_name: String,
    /// Where the panel sits, used to anchor the popup.
    pub edge: PanelEdge,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            icon_name: "multimedia-volume-control".to_string(),
            edge: PanelEdge::Top,
        }
    }
}

/// Sound server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Client name announced to the server.
    pub client_name: String,
    /// Reconnect after the connection fails or is terminated.
    pub auto_reconnect: bool,
    /// Delay before a reconnect attempt.
    pub reconnect_delay_ms: u64,
}

impl ConnectionConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            client_name: "Mixlet Volume Mixer".to_string(),
            auto_reconnect: false,
            reconnect_delay_ms: 2000,
        }
    }
}

/// Mixer popup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Application labels longer than this are ellipsized.
    pub label_max_chars: usize,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self { label_max_chars: 12 }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub mixer: MixerConfig,
}

impl AppConfig {
    /// Load config from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.panel.icon_name, "multimedia-volume-control");
        assert_eq!(config.panel.edge, PanelEdge::Top);
        assert!(!config.connection.auto_reconnect);
        assert_eq!(config.connection.reconnect_delay(), Duration::from_secs(2));
        assert_eq!(config.mixer.label_max_chars, 12);
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml(
            r#"
            [panel]
            edge = "bottom"

            [connection]
            auto_reconnect = true
            "#,
        )
        .unwrap();

        assert_eq!(config.panel.edge, PanelEdge::Bottom);
        assert_eq!(config.panel.icon_name, "multimedia-volume-control");
        assert!(config.connection.auto_reconnect);
        assert_eq!(config.connection.client_name, "Mixlet Volume Mixer");
    }

    #[test]
    fn test_invalid_edge_rejected() {
        assert!(AppConfig::from_toml("[panel]\nedge = \"middle\"\n").is_err());
    }
}
