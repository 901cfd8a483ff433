// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Message types for UI actions and window events.

use iced::window;

/// All messages in the application.
#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic tick used to poll the sound server and panel channels.
    Tick,
    /// A stream's slider moved (stream index, slider position 0..=100).
    VolumeChanged(u32, f32),
    /// The popup window finished opening.
    PopupOpened(window::Id),
    /// A window lost keyboard focus.
    WindowFocusLost(window::Id),
    /// A window was closed.
    WindowClosed(window::Id),
}
