// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Panel host adapter.
//!
//! The host panel loads an applet type by name, constructs one instance per
//! panel slot and forwards activations to it. Mixlet is hosted by any
//! StatusNotifierItem panel; the item itself lives in [`crate::tray`].

use crate::config::PanelConfig;
use crate::tray::TrayApplet;
use iced::Point;
use thiserror::Error;
use tracing::info;

/// Type name registered with the host.
pub const APPLET_TYPE: &str = "mixlet-volume-mixer";

/// What [`module_init`] reports to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleInfo {
    pub type_name: &'static str,
    /// Whether the host must keep the module loaded after its last instance
    /// is destroyed.
    pub make_resident: bool,
}

/// Module entry point: register the applet type.
pub fn module_init() -> ModuleInfo {
    ModuleInfo {
        type_name: module_type(),
        make_resident: false,
    }
}

/// The applet type name.
pub fn module_type() -> &'static str {
    APPLET_TYPE
}

/// Slot of the host panel an instance is placed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSlot {
    /// Unique id within the host, used as the item id.
    pub id: String,
    /// Human readable title.
    pub title: String,
}

impl Default for PanelSlot {
    fn default() -> Self {
        Self {
            id: "mixlet".to_string(),
            title: "Volume Mixer".to_string(),
        }
    }
}

/// Opaque handle of the widget placed in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetHandle {
    pub item_id: String,
    pub icon_name: String,
}

/// Events the host forwards to the applet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    /// Primary activation at screen coordinates.
    Activate { x: i32, y: i32 },
    /// The user asked the applet to go away.
    Quit,
}

impl PanelEvent {
    /// Anchor point of an activation.
    pub fn anchor(&self) -> Option<Point> {
        match *self {
            PanelEvent::Activate { x, y } => Some(Point::new(x as f32, y as f32)),
            PanelEvent::Quit => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Panel host unavailable: {0}")]
    HostUnavailable(String),
    #[error("Timed out waiting for the panel host")]
    Timeout,
    #[error("Panel thread error: {0}")]
    ThreadError(String),
}

/// One applet instance placed in a panel slot.
pub trait PanelApplet {
    /// Place a new instance in `slot`.
    fn create(slot: PanelSlot, config: &PanelConfig) -> Result<Self, PanelError>
    where
        Self: Sized;

    /// Handle of the widget shown in the panel.
    fn widget_handle(&self) -> WidgetHandle;

    /// Drain activations received since the last call.
    fn poll_events(&self) -> Vec<PanelEvent>;

    /// Update the panel tooltip with the number of known streams.
    fn set_stream_count(&self, count: usize);

    /// Remove the widget from the panel and release its resources.
    fn destroy(self: Box<Self>);
}

/// Construct an applet instance for `slot`.
pub fn construct(slot: PanelSlot, config: &PanelConfig) -> Result<Box<dyn PanelApplet>, PanelError> {
    info!("Constructing {} in slot {}", module_type(), slot.id);
    let applet = TrayApplet::create(slot, config)?;
    Ok(Box::new(applet))
}
