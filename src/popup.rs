// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Popup window visibility and placement.

use crate::config::PanelEdge;
use iced::window;
use iced::{Point, Size};
use tracing::debug;

/// Gap between the panel anchor and the popup.
const ANCHOR_GAP: f32 = 4.0;

/// Whether the mixer popup is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupVisibility {
    #[default]
    Hidden,
    Visible(window::Id),
}

/// What the caller must do after an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupTransition {
    /// Open a new popup window.
    Show,
    /// Close the given popup window.
    Hide(window::Id),
}

/// Tracks the popup window and decides where it goes.
#[derive(Debug)]
pub struct PopupController {
    visibility: PopupVisibility,
    edge: PanelEdge,
}

impl PopupController {
    pub fn new(edge: PanelEdge) -> Self {
        Self {
            visibility: PopupVisibility::Hidden,
            edge,
        }
    }

    pub fn visibility(&self) -> PopupVisibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.visibility, PopupVisibility::Visible(_))
    }

    /// Window id of the visible popup.
    pub fn window(&self) -> Option<window::Id> {
        match self.visibility {
            PopupVisibility::Visible(id) => Some(id),
            PopupVisibility::Hidden => None,
        }
    }

    /// Primary activation toggles the popup.
    pub fn activate(&mut self) -> PopupTransition {
        match self.visibility {
            PopupVisibility::Hidden => PopupTransition::Show,
            PopupVisibility::Visible(id) => {
                self.visibility = PopupVisibility::Hidden;
                PopupTransition::Hide(id)
            }
        }
    }

    /// Record that `id` now shows the popup.
    pub fn shown(&mut self, id: window::Id) {
        self.visibility = PopupVisibility::Visible(id);
    }

    /// Focus left a window. Returns the popup to close if it was ours.
    pub fn focus_lost(&mut self, id: window::Id) -> Option<window::Id> {
        match self.visibility {
            PopupVisibility::Visible(current) if current == id => {
                debug!("Popup lost focus, hiding");
                self.visibility = PopupVisibility::Hidden;
                Some(current)
            }
            _ => None,
        }
    }

    /// A window was closed outside our control (e.g. by the window manager).
    pub fn closed(&mut self, id: window::Id) {
        if self.visibility == PopupVisibility::Visible(id) {
            self.visibility = PopupVisibility::Hidden;
        }
    }

    /// Position of the popup's top-left corner for an activation at `anchor`.
    pub fn anchor_position(&self, anchor: Point, size: Size) -> Point {
        anchor_position(anchor, size, self.edge)
    }
}

/// Place a popup of `size` next to `anchor` on the side away from the panel.
///
/// Top and bottom panels centre the popup horizontally on the anchor; left
/// and right panels centre it vertically. The result is clamped at zero.
pub fn anchor_position(anchor: Point, size: Size, edge: PanelEdge) -> Point {
    let (x, y) = match edge {
        PanelEdge::Top => (anchor.x - size.width / 2.0, anchor.y + ANCHOR_GAP),
        PanelEdge::Bottom => (
            anchor.x - size.width / 2.0,
            anchor.y - size.height - ANCHOR_GAP,
        ),
        PanelEdge::Left => (anchor.x + ANCHOR_GAP, anchor.y - size.height / 2.0),
        PanelEdge::Right => (
            anchor.x - size.width - ANCHOR_GAP,
            anchor.y - size.height / 2.0,
        ),
    };
    Point::new(x.max(0.0), y.max(0.0))
}
