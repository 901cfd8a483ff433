// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mixlet - per-application volume mixer for the panel.
//!
//! Shows a popup of per-application volume sliders for every stream playing
//! through a PulseAudio compatible sound server.

mod app;
mod audio;
mod config;
mod message;
mod panel;
mod popup;
mod state;
mod tray;
mod ui;

use app::Mixlet;
use config::{AppConfig, ConfigManager};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> iced::Result {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mixlet=info")))
        .init();

    let module = panel::module_init();
    info!("Starting Mixlet ({})", module.type_name);

    let config = load_config();

    // Run as daemon so hiding the popup doesn't exit the app
    iced::daemon(move || Mixlet::new(config.clone()), Mixlet::update, Mixlet::view)
        .title("Mixlet")
        .subscription(Mixlet::subscription)
        .theme(Mixlet::theme)
        .run()
}

fn load_config() -> AppConfig {
    let manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            warn!("No config directory, using defaults: {}", e);
            return AppConfig::default();
        }
    };

    match manager.load_config() {
        Ok(config) => {
            info!("Loaded config from {}", manager.config_path().display());
            config
        }
        Err(e) => {
            warn!("Ignoring {}: {}", manager.config_path().display(), e);
            AppConfig::default()
        }
    }
}
