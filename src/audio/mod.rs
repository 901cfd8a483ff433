// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Audio subsystem - sound server integration.

pub mod pulse_thread;
pub mod types;
pub mod volume;

pub use pulse_thread::{PulseCommand, PulseEvent, PulseThread};
pub use types::*;
