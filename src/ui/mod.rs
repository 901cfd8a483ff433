// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! UI components for Mixlet.

pub mod icons;
pub mod mixer_view;
pub mod theme;

pub use mixer_view::{MixerView, Placeholder};
