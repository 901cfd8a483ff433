// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Theme constants and styling for Mixlet.

use iced::theme::Palette;
use iced::widget::{container, slider};
use iced::{Background, Border, Color, Theme};

// ============================================================================
// Color Constants (Dark Theme)
// ============================================================================

/// Main background color.
pub const BACKGROUND: Color = Color::from_rgb(0.12, 0.12, 0.14);

/// Surface color for stream columns.
pub const SURFACE: Color = Color::from_rgb(0.18, 0.18, 0.20);

/// Lighter surface for borders and hover states.
pub const SURFACE_LIGHT: Color = Color::from_rgb(0.24, 0.24, 0.26);

/// Primary accent color (blue).
pub const PRIMARY: Color = Color::from_rgb(0.40, 0.65, 0.95);

/// Main text color.
pub const TEXT: Color = Color::from_rgb(0.90, 0.90, 0.92);

/// Dimmed text color.
pub const TEXT_DIM: Color = Color::from_rgb(0.60, 0.60, 0.65);

/// Error indicator (red).
pub const DANGER: Color = Color::from_rgb(0.85, 0.30, 0.30);

/// Success indicator (green).
pub const SUCCESS: Color = Color::from_rgb(0.40, 0.75, 0.40);

/// Warning indicator (yellow).
pub const WARNING: Color = Color::from_rgb(0.90, 0.75, 0.20);

/// Slider track background.
pub const SLIDER_TRACK: Color = Color::from_rgb(0.30, 0.30, 0.32);

pub const THEME_PALETTE: Palette = Palette {
    background: BACKGROUND,
    text: TEXT,
    primary: PRIMARY,
    success: SUCCESS,
    danger: DANGER,
    warning: WARNING,
};

/// Get the Mixlet custom theme.
pub fn mixlet_theme() -> Theme {
    Theme::custom("Mixlet Dark".to_string(), THEME_PALETTE)
}

// ============================================================================
// Layout
// ============================================================================

/// Standard border radius for UI elements.
pub const BORDER_RADIUS: f32 = 6.0;

/// Spacing between columns.
pub const SPACING: f32 = 10.0;

/// Spacing inside a column.
pub const SPACING_SMALL: f32 = 5.0;

/// Padding around the popup content.
pub const PADDING: f32 = 15.0;

/// Padding inside a stream column.
pub const COLUMN_PADDING: f32 = 8.0;

/// Width of one stream column.
pub const COLUMN_WIDTH: f32 = 96.0;

/// Application icon edge length.
pub const ICON_SIZE: f32 = 32.0;

/// Height of the volume value line.
pub const VALUE_HEIGHT: f32 = 16.0;

/// Height of the application label line.
pub const LABEL_HEIGHT: f32 = 16.0;

/// Volume slider height.
pub const VOLUME_SLIDER_HEIGHT: f32 = 200.0;

/// Popup size while only a placeholder is shown.
pub const PLACEHOLDER_WIDTH: f32 = 300.0;
pub const PLACEHOLDER_HEIGHT: f32 = 420.0;

// ============================================================================
// Style Helpers
// ============================================================================

/// Create a standard border.
pub fn standard_border() -> Border {
    Border::default()
        .rounded(BORDER_RADIUS)
        .color(SURFACE_LIGHT)
        .width(1.0)
}

/// Background of the whole popup.
pub fn popup_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(BACKGROUND)),
        border: standard_border(),
        ..container::Style::default()
    }
}

/// Card behind one stream column.
pub fn column_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(SURFACE)),
        border: standard_border(),
        ..container::Style::default()
    }
}

/// Vertical volume slider.
pub fn volume_slider_style(_theme: &Theme, status: slider::Status) -> slider::Style {
    let handle = match status {
        slider::Status::Hovered | slider::Status::Dragged => PRIMARY,
        slider::Status::Active => TEXT,
    };
    slider::Style {
        rail: slider::Rail {
            backgrounds: (Background::Color(PRIMARY), Background::Color(SLIDER_TRACK)),
            width: 8.0,
            border: Border::default().rounded(4.0),
        },
        handle: slider::Handle {
            shape: slider::HandleShape::Rectangle {
                width: 20,
                border_radius: 3.0.into(),
            },
            background: Background::Color(handle),
            border_width: 0.0,
            border_color: Color::TRANSPARENT,
        },
    }
}

/// Format a slider position for the value line.
pub fn format_percent(value: f32) -> String {
    format!("{:.0}", value.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0");
        assert_eq!(format_percent(49.6), "50");
        assert_eq!(format_percent(100.0), "100");
    }
}
