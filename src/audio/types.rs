// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sound server type definitions for application streams.

use std::fmt;

/// Suffix carried by desktop-entry style application ids.
const DESKTOP_SUFFIX: &str = ".desktop";

/// Connection state of the sound server client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No context exists (before start or after shutdown).
    #[default]
    Disconnected,
    /// Context created, handshake in progress.
    Connecting,
    /// Requests may be issued.
    Ready,
    /// Connection failed or was terminated by the server.
    Failed,
}

impl ConnectionState {
    /// Whether enumeration and volume requests are valid.
    pub fn is_ready(self) -> bool {
        matches!(self, ConnectionState::Ready)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Ready => "ready",
            ConnectionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Application properties attached to a stream by its client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamProperties {
    /// `application.icon_name`
    pub icon_name: Option<String>,
    /// `application.id`, usually a desktop entry id such as `firefox.desktop`.
    pub application_id: Option<String>,
    /// `application.name`
    pub application_name: Option<String>,
}

impl StreamProperties {
    /// Derive an icon name for the stream.
    ///
    /// Tries the explicit icon name, then the application id without its
    /// `.desktop` suffix, then the application name lowercased with spaces
    /// turned into dashes. Returns `None` when nothing usable is set.
    pub fn icon_hint(&self) -> Option<String> {
        if let Some(icon) = non_empty(&self.icon_name) {
            return Some(icon.to_string());
        }

        if let Some(app_id) = non_empty(&self.application_id) {
            let stem = app_id.strip_suffix(DESKTOP_SUFFIX).unwrap_or(app_id);
            return (!stem.is_empty()).then(|| stem.to_string());
        }

        non_empty(&self.application_name).map(|name| name.to_ascii_lowercase().replace(' ', "-"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A stream as reported by the sound server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub index: u32,
    /// Media name of the stream (e.g. "Playback").
    pub name: Option<String>,
    pub properties: StreamProperties,
    /// Per-channel volume in native units.
    pub volume: Vec<u32>,
    /// Whether the stream carries a volume at all (false for passthrough).
    pub has_volume: bool,
    /// Whether the server accepts volume changes for the stream.
    pub volume_writable: bool,
    /// Sink the stream plays into.
    pub sink: u32,
}

/// A cached stream held by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub index: u32,
    /// Application name, if the client announced one.
    pub app_name: Option<String>,
    pub icon: Option<String>,
    pub media_name: Option<String>,
    pub volume: Vec<u32>,
    pub has_volume: bool,
    pub volume_writable: bool,
    pub sink: u32,
}

impl StreamEntry {
    /// Number of channels in the volume vector.
    pub fn channels(&self) -> u8 {
        u8::try_from(self.volume.len()).unwrap_or(u8::MAX)
    }

    /// Whether a volume change can be sent for this stream.
    pub fn volume_adjustable(&self) -> bool {
        self.has_volume && self.volume_writable && self.channels() > 0
    }
}

impl From<StreamDescriptor> for StreamEntry {
    fn from(desc: StreamDescriptor) -> Self {
        let icon = desc.properties.icon_hint();
        Self {
            index: desc.index,
            app_name: desc.properties.application_name.filter(|n| !n.is_empty()),
            icon,
            media_name: desc.name,
            volume: desc.volume,
            has_volume: desc.has_volume,
            volume_writable: desc.volume_writable,
            sink: desc.sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(icon: Option<&str>, id: Option<&str>, name: Option<&str>) -> StreamProperties {
        StreamProperties {
            icon_name: icon.map(String::from),
            application_id: id.map(String::from),
            application_name: name.map(String::from),
        }
    }

    #[test]
    fn test_icon_hint_prefers_icon_name() {
        assert_eq!(props(Some("foo"), None, None).icon_hint().as_deref(), Some("foo"));
        assert_eq!(
            props(Some("foo"), Some("bar.desktop"), Some("My App")).icon_hint().as_deref(),
            Some("foo")
        );
    }

    #[test]
    fn test_icon_hint_strips_desktop_suffix() {
        assert_eq!(props(None, Some("bar.desktop"), None).icon_hint().as_deref(), Some("bar"));
        assert_eq!(
            props(None, Some("org.gnome.Rhythmbox3"), None).icon_hint().as_deref(),
            Some("org.gnome.Rhythmbox3")
        );
    }

    #[test]
    fn test_icon_hint_from_application_name() {
        assert_eq!(props(None, None, Some("My App")).icon_hint().as_deref(), Some("my-app"));
        assert_eq!(
            props(None, None, Some("Google Chrome Beta")).icon_hint().as_deref(),
            Some("google-chrome-beta")
        );
    }

    #[test]
    fn test_icon_hint_absent() {
        assert_eq!(props(None, None, None).icon_hint(), None);
        assert_eq!(props(Some(""), Some(""), Some("")).icon_hint(), None);
        assert_eq!(props(None, Some(".desktop"), None).icon_hint(), None);
    }

    #[test]
    fn test_empty_icon_name_falls_through() {
        assert_eq!(props(Some(""), Some("vlc.desktop"), None).icon_hint().as_deref(), Some("vlc"));
    }

    #[test]
    fn test_entry_from_descriptor() {
        let desc = StreamDescriptor {
            index: 42,
            name: Some("Playback".into()),
            properties: props(None, Some("firefox.desktop"), Some("Firefox")),
            volume: vec![65536, 32768],
            has_volume: true,
            volume_writable: true,
            sink: 3,
        };

        let entry = StreamEntry::from(desc);
        assert_eq!(entry.index, 42);
        assert_eq!(entry.app_name.as_deref(), Some("Firefox"));
        assert_eq!(entry.icon.as_deref(), Some("firefox"));
        assert_eq!(entry.media_name.as_deref(), Some("Playback"));
        assert_eq!(entry.channels(), 2);
        assert!(entry.volume_adjustable());
        assert_eq!(entry.sink, 3);
    }

    #[test]
    fn test_passthrough_entry_not_adjustable() {
        let entry = StreamEntry::from(StreamDescriptor {
            index: 3,
            volume: vec![],
            has_volume: false,
            volume_writable: false,
            ..Default::default()
        });
        assert_eq!(entry.channels(), 0);
        assert!(!entry.volume_adjustable());

        let read_only = StreamEntry::from(StreamDescriptor {
            index: 4,
            volume: vec![65536, 65536],
            has_volume: true,
            volume_writable: false,
            ..Default::default()
        });
        assert!(!read_only.volume_adjustable());
    }

    #[test]
    fn test_connection_state_ready() {
        assert!(ConnectionState::Ready.is_ready());
        assert!(!ConnectionState::Connecting.is_ready());
        assert!(!ConnectionState::Failed.is_ready());
        assert!(!ConnectionState::default().is_ready());
    }
}
