// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conversion between slider positions and native volume units.

use libpulse_binding::volume::{ChannelVolumes, Volume};

/// Nominal 100% volume of the sound server.
pub const VOLUME_NORM: u32 = Volume::NORMAL.0;

/// Slider range upper bound (percent).
pub const SLIDER_MAX: f32 = 100.0;

/// Map a slider position (0..=100) to a native volume.
///
/// Values outside the range are clamped; the mapping is linear with
/// 0 at silence and 100 at the nominal volume.
pub fn slider_to_volume(value: f32) -> u32 {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, SLIDER_MAX) };
    (f64::from(value) * f64::from(VOLUME_NORM) / f64::from(SLIDER_MAX)) as u32
}

/// Map a native volume to a slider position. Volumes above nominal
/// saturate at the top of the slider.
pub fn volume_to_slider(volume: u32) -> f32 {
    let percent = f64::from(volume) * f64::from(SLIDER_MAX) / f64::from(VOLUME_NORM);
    percent.min(f64::from(SLIDER_MAX)) as f32
}

/// Average of a per-channel volume vector (0 for an empty vector).
pub fn average(volume: &[u32]) -> u32 {
    if volume.is_empty() {
        return 0;
    }
    let sum: u64 = volume.iter().map(|&v| u64::from(v)).sum();
    (sum / volume.len() as u64) as u32
}

/// Convert a libpulse channel volume set into native units.
pub fn from_channel_volumes(volumes: &ChannelVolumes) -> Vec<u32> {
    volumes.get().iter().map(|v| v.0).collect()
}

/// Build a libpulse channel volume set with all channels equal.
pub fn to_channel_volumes(channels: u8, volume: u32) -> ChannelVolumes {
    let mut cv = ChannelVolumes::default();
    cv.set(channels, Volume(volume));
    cv
}
