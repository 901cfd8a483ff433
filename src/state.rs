// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Application state: the stream registry and its synchronizer.
//!
//! All mutation happens on the UI event loop. The sound server thread only
//! produces [`PulseEvent`]s; [`StreamSync::handle`] applies each one to the
//! registry and reports which requests to issue and whether the mixer view
//! must be rebuilt.

use crate::audio::volume;
use crate::audio::{ConnectionState, PulseCommand, PulseEvent, StreamEntry};
use crate::config::AppConfig;
use crate::popup::{PopupController, PopupTransition};
use crate::ui::{MixerView, Placeholder};
use iced::window;
use iced::Point;
use tracing::{debug, info, warn};

/// Cached streams keyed by index, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamRegistry {
    entries: Vec<StreamEntry>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry or replace the one with the same index in place.
    pub fn upsert(&mut self, entry: StreamEntry) {
        match self.entries.iter_mut().find(|e| e.index == entry.index) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove an entry. Returns whether it was present.
    pub fn remove(&mut self, index: u32) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.index != index);
        self.entries.len() != before
    }

    pub fn get(&self, index: u32) -> Option<&StreamEntry> {
        self.entries.iter().find(|e| e.index == index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Result of handling one sound server event.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Requests to forward to the sound server thread.
    pub requests: Vec<PulseCommand>,
    /// Whether the mixer view must be rebuilt.
    pub rebuild: bool,
}

impl SyncOutcome {
    fn request(cmd: Option<PulseCommand>) -> Self {
        Self {
            requests: cmd.into_iter().collect(),
            rebuild: false,
        }
    }

    fn rebuild() -> Self {
        Self {
            requests: Vec::new(),
            rebuild: true,
        }
    }
}

/// Keeps the registry consistent with the sound server's notifications.
#[derive(Debug, Default)]
pub struct StreamSync {
    registry: StreamRegistry,
    connection: ConnectionState,
}

impl StreamSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Drop every cached stream.
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Apply one event from the sound server.
    pub fn handle(&mut self, event: PulseEvent) -> SyncOutcome {
        match event {
            PulseEvent::Connecting => {
                self.connection = ConnectionState::Connecting;
                SyncOutcome::default()
            }
            PulseEvent::Ready => {
                self.connection = ConnectionState::Ready;
                SyncOutcome::request(self.enumeration_request())
            }
            PulseEvent::Failed(reason) => {
                warn!("Sound server unavailable: {}", reason);
                self.connection = ConnectionState::Failed;
                SyncOutcome::default()
            }
            PulseEvent::Disconnected => {
                self.connection = ConnectionState::Disconnected;
                SyncOutcome::default()
            }
            PulseEvent::StreamNew(index) | PulseEvent::StreamChanged(index) => {
                debug!("Stream {} new or changed, fetching", index);
                SyncOutcome::request(self.ready_then(PulseCommand::FetchStream(index)))
            }
            PulseEvent::StreamRemoved(index) => {
                if self.registry.remove(index) {
                    debug!("Stream {} removed", index);
                }
                SyncOutcome::rebuild()
            }
            PulseEvent::EnumerationItem(descriptor) => {
                self.registry.upsert(StreamEntry::from(descriptor));
                SyncOutcome::default()
            }
            PulseEvent::EnumerationDone => SyncOutcome::rebuild(),
        }
    }

    /// Full enumeration request, if the connection allows it.
    pub fn enumeration_request(&self) -> Option<PulseCommand> {
        self.ready_then(PulseCommand::EnumerateStreams)
    }

    /// Uniform volume request for a slider position, if the stream is known,
    /// has a writable volume and the connection allows it.
    pub fn volume_request(&self, index: u32, slider: f32) -> Option<PulseCommand> {
        let entry = self.registry.get(index)?;
        if !entry.volume_adjustable() {
            debug!("Stream {} volume is not adjustable", index);
            return None;
        }
        self.ready_then(PulseCommand::SetVolume {
            index,
            channels: entry.channels(),
            volume: volume::slider_to_volume(slider),
        })
    }

    fn ready_then(&self, cmd: PulseCommand) -> Option<PulseCommand> {
        self.connection.is_ready().then_some(cmd)
    }
}

/// Everything the applet instance tracks besides its I/O handles.
pub struct AppState {
    pub sync: StreamSync,
    pub mixer: MixerView,
    pub popup: PopupController,
}

/// What the UI must do after a sound server event.
#[derive(Debug, Default, PartialEq)]
pub struct PulseOutcome {
    /// Requests to forward to the sound server thread.
    pub requests: Vec<PulseCommand>,
    /// Resize the visible popup after a rebuild.
    pub resize: Option<(window::Id, iced::Size)>,
    /// New stream count for the panel tooltip after a rebuild.
    pub stream_count: Option<usize>,
}

/// What the UI must do after the popup opened.
#[derive(Debug, PartialEq)]
pub struct PopupOpen {
    pub position: Point,
    pub size: iced::Size,
    pub enumerate: Option<PulseCommand>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            sync: StreamSync::new(),
            mixer: MixerView::new(config.mixer.label_max_chars),
            popup: PopupController::new(config.panel.edge),
        }
    }

    /// Apply a sound server event and rebuild the view when needed.
    pub fn handle_pulse_event(&mut self, event: PulseEvent) -> PulseOutcome {
        let outcome = self.sync.handle(event);
        if !outcome.rebuild {
            return PulseOutcome {
                requests: outcome.requests,
                ..PulseOutcome::default()
            };
        }

        self.mixer.rebuild(self.sync.registry(), Placeholder::Empty);
        PulseOutcome {
            requests: outcome.requests,
            resize: self
                .popup
                .window()
                .map(|id| (id, self.mixer.natural_size())),
            stream_count: Some(self.sync.registry().len()),
        }
    }

    /// Panel activation: toggle the popup.
    pub fn activate(&mut self) -> PopupTransition {
        self.popup.activate()
    }

    /// Prepare the popup for showing: clear the registry, show the
    /// loading placeholder and decide where the window goes.
    pub fn prepare_open(&mut self, anchor: Point) -> PopupOpen {
        self.sync.clear();
        self.mixer.rebuild(self.sync.registry(), Placeholder::Loading);

        let size = self.mixer.natural_size();
        let position = self.popup.anchor_position(anchor, size);
        info!(
            "Opening mixer popup at ({}, {}), sound server {}",
            position.x,
            position.y,
            self.sync.connection()
        );

        PopupOpen {
            position,
            size,
            enumerate: self.sync.enumeration_request(),
        }
    }

    /// Record the window that now shows the popup.
    pub fn opened(&mut self, id: window::Id) {
        self.popup.shown(id);
    }
}
