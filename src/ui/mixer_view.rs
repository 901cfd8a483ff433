// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-application volume columns shown inside the popup.

use crate::audio::volume;
use crate::message::Message;
use crate::state::StreamRegistry;
use crate::ui::icons::{IconResolver, IconSource};
use crate::ui::theme::{self, *};
use iced::widget::{column, container, image, svg, text, vertical_slider, Row};
use iced::{Alignment, Element, Fill, Size};
use std::collections::HashMap;

/// Label used when a stream does not announce an application name.
pub const UNKNOWN_APPLICATION: &str = "Unknown Application";

/// Which message to show when there are no columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// The popup just opened and enumeration is in flight.
    Loading,
    /// Enumeration finished with no streams.
    Empty,
}

impl Placeholder {
    pub fn text(self) -> &'static str {
        match self {
            Placeholder::Loading => "Loading…",
            Placeholder::Empty => "No applications playing audio",
        }
    }
}

/// One stream column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnModel {
    pub index: u32,
    pub label: String,
    pub icon: IconSource,
    /// Slider position preloaded from the stream's average volume.
    pub slider: f32,
    /// False for streams whose volume cannot be changed (e.g. passthrough).
    pub adjustable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MixerLayout {
    Placeholder(Placeholder),
    Columns(Vec<ColumnModel>),
}

/// The rebuilt-from-scratch mixer layout plus transient slider positions.
pub struct MixerView {
    layout: MixerLayout,
    /// Positions the user dragged to since the last rebuild.
    dragged: HashMap<u32, f32>,
    label_max_chars: usize,
    icons: IconResolver,
}

impl MixerView {
    pub fn new(label_max_chars: usize) -> Self {
        Self::with_resolver(label_max_chars, IconResolver::from_env())
    }

    pub fn with_resolver(label_max_chars: usize, icons: IconResolver) -> Self {
        Self {
            layout: MixerLayout::Placeholder(Placeholder::Loading),
            dragged: HashMap::new(),
            label_max_chars,
            icons,
        }
    }

    /// Discard the current layout and build a new one from the registry.
    /// `empty` selects the placeholder used when the registry has no entries.
    pub fn rebuild(&mut self, registry: &StreamRegistry, empty: Placeholder) {
        self.dragged.clear();

        if registry.is_empty() {
            self.layout = MixerLayout::Placeholder(empty);
            return;
        }

        let columns = registry
            .iter()
            .map(|entry| {
                let name = entry.app_name.as_deref().unwrap_or(UNKNOWN_APPLICATION);
                ColumnModel {
                    index: entry.index,
                    label: truncate_label(name, self.label_max_chars),
                    icon: self.icons.resolve(entry.icon.as_deref()),
                    slider: volume::volume_to_slider(volume::average(&entry.volume)),
                    adjustable: entry.volume_adjustable(),
                }
            })
            .collect();
        self.layout = MixerLayout::Columns(columns);
    }

    pub fn layout(&self) -> &MixerLayout {
        &self.layout
    }

    pub fn columns(&self) -> &[ColumnModel] {
        match &self.layout {
            MixerLayout::Columns(columns) => columns,
            MixerLayout::Placeholder(_) => &[],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.layout, MixerLayout::Placeholder(_))
    }

    /// Remember a dragged slider position until the next rebuild.
    pub fn set_slider(&mut self, index: u32, value: f32) {
        if self.columns().iter().any(|c| c.index == index) {
            self.dragged.insert(index, value.clamp(0.0, volume::SLIDER_MAX));
        }
    }

    /// Current slider position of a column.
    pub fn slider_value(&self, column: &ColumnModel) -> f32 {
        self.dragged.get(&column.index).copied().unwrap_or(column.slider)
    }

    /// Size at which every column is visible without scrolling.
    pub fn natural_size(&self) -> Size {
        match &self.layout {
            MixerLayout::Placeholder(_) => Size::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT),
            MixerLayout::Columns(columns) => natural_size(columns.len()),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.layout {
            MixerLayout::Placeholder(placeholder) => container(
                text(placeholder.text()).size(14).color(TEXT_DIM),
            )
            .center(Fill)
            .into(),
            MixerLayout::Columns(columns) => columns
                .iter()
                .fold(Row::new().spacing(SPACING), |row, c| {
                    row.push(self.column_view(c))
                })
                .align_y(Alignment::Start)
                .into(),
        };

        container(content)
            .padding(PADDING)
            .width(Fill)
            .height(Fill)
            .style(theme::popup_style)
            .into()
    }

    fn column_view<'a>(&'a self, model: &'a ColumnModel) -> Element<'a, Message> {
        let index = model.index;
        let value = self.slider_value(model);

        let slider: Element<'a, Message> = if model.adjustable {
            vertical_slider(0.0..=volume::SLIDER_MAX, value, move |v| {
                Message::VolumeChanged(index, v)
            })
            .step(1.0)
            .height(VOLUME_SLIDER_HEIGHT)
            .style(theme::volume_slider_style)
            .into()
        } else {
            // No volume to control; keep the column height
            container(text("fixed").size(11).color(TEXT_DIM))
                .height(VOLUME_SLIDER_HEIGHT)
                .center_x(Fill)
                .into()
        };

        let content = column![
            icon_view(&model.icon),
            container(
                text(model.label.as_str())
                    .size(12)
                    .color(TEXT)
                    .wrapping(text::Wrapping::None)
            )
            .height(LABEL_HEIGHT)
            .center_x(Fill),
            container(text(theme::format_percent(value)).size(12).color(TEXT_DIM))
                .height(VALUE_HEIGHT)
                .center_x(Fill),
            slider,
        ]
        .align_x(Alignment::Center)
        .spacing(SPACING_SMALL);

        container(content)
            .width(COLUMN_WIDTH)
            .padding(COLUMN_PADDING)
            .style(theme::column_style)
            .into()
    }
}

fn icon_view(icon: &IconSource) -> Element<'_, Message> {
    match icon {
        IconSource::Svg(path) => svg(svg::Handle::from_path(path))
            .width(ICON_SIZE)
            .height(ICON_SIZE)
            .into(),
        IconSource::Raster(path) => image(image::Handle::from_path(path))
            .width(ICON_SIZE)
            .height(ICON_SIZE)
            .into(),
        IconSource::Glyph => container(text("♪").size(22).color(TEXT_DIM))
            .center(ICON_SIZE)
            .into(),
    }
}

/// Popup size for `count` columns.
pub fn natural_size(count: usize) -> Size {
    let n = count as f32;
    let width = PADDING * 2.0 + n * COLUMN_WIDTH + (n - 1.0).max(0.0) * SPACING;
    let height = PADDING * 2.0
        + COLUMN_PADDING * 2.0
        + ICON_SIZE
        + LABEL_HEIGHT
        + VALUE_HEIGHT
        + VOLUME_SLIDER_HEIGHT
        + SPACING_SMALL * 3.0;
    Size::new(width, height)
}

/// Shorten a label to at most `max_chars` characters, ending in an ellipsis
/// when cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StreamEntry;

    fn view() -> MixerView {
        let dir = std::env::temp_dir().join("mixlet-no-icons");
        MixerView::with_resolver(12, IconResolver::with_data_dirs(vec![dir]))
    }

    fn entry(index: u32, name: Option<&str>, volume: Vec<u32>) -> StreamEntry {
        StreamEntry {
            index,
            app_name: name.map(String::from),
            icon: None,
            media_name: None,
            has_volume: !volume.is_empty(),
            volume_writable: true,
            volume,
            sink: 0,
        }
    }

    #[test]
    fn test_empty_registry_single_placeholder() {
        let mut mixer = view();
        mixer.rebuild(&StreamRegistry::new(), Placeholder::Empty);
        assert_eq!(mixer.layout(), &MixerLayout::Placeholder(Placeholder::Empty));
        assert!(mixer.columns().is_empty());
        assert_eq!(Placeholder::Empty.text(), "No applications playing audio");
        assert_eq!(Placeholder::Loading.text(), "Loading…");
    }

    #[test]
    fn test_one_column_per_entry_in_order() {
        let mut registry = StreamRegistry::new();
        registry.upsert(entry(5, Some("Firefox"), vec![volume::VOLUME_NORM; 2]));
        registry.upsert(entry(2, None, vec![volume::VOLUME_NORM / 2]));

        let mut mixer = view();
        mixer.rebuild(&registry, Placeholder::Empty);

        let columns = mixer.columns();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].index, 5);
        assert_eq!(columns[0].label, "Firefox");
        assert_eq!(columns[0].slider, 100.0);
        assert_eq!(columns[1].index, 2);
        assert_eq!(columns[1].label, "Unknown App…");
        assert_eq!(columns[1].slider, 50.0);
        assert_eq!(columns[1].icon, IconSource::Glyph);
    }

    #[test]
    fn test_rebuild_discards_dragged_positions() {
        let mut registry = StreamRegistry::new();
        registry.upsert(entry(1, Some("mpv"), vec![0, 0]));

        let mut mixer = view();
        mixer.rebuild(&registry, Placeholder::Empty);
        let column = mixer.columns()[0].clone();

        mixer.set_slider(1, 70.0);
        assert_eq!(mixer.slider_value(&column), 70.0);

        // Unknown columns are ignored
        mixer.set_slider(9, 30.0);
        assert!(!mixer.dragged.contains_key(&9));

        mixer.rebuild(&registry, Placeholder::Empty);
        assert_eq!(mixer.slider_value(&mixer.columns()[0]), 0.0);
    }

    #[test]
    fn test_passthrough_column_is_fixed() {
        let mut registry = StreamRegistry::new();
        registry.upsert(entry(1, Some("Kodi"), vec![]));
        registry.upsert(entry(2, Some("mpv"), vec![volume::VOLUME_NORM; 2]));

        let mut mixer = view();
        mixer.rebuild(&registry, Placeholder::Empty);
        assert!(!mixer.columns()[0].adjustable);
        assert_eq!(mixer.columns()[0].slider, 0.0);
        assert!(mixer.columns()[1].adjustable);

        // Both kinds of column render
        let _ = mixer.view();
    }

    #[test]
    fn test_longest_label_renders() {
        let mut registry = StreamRegistry::new();
        registry.upsert(entry(1, Some("WWWWWWWWWWWWWWWWWW"), vec![0, 0]));

        let mut mixer = view();
        mixer.rebuild(&registry, Placeholder::Empty);
        let label = &mixer.columns()[0].label;
        assert_eq!(label.chars().count(), 12);
        assert!(label.ends_with('…'));
        let _ = mixer.view();
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Firefox", 12), "Firefox");
        assert_eq!(truncate_label("Twelve chars", 12), "Twelve chars");
        assert_eq!(truncate_label("Unknown Application", 12), "Unknown App…");
        assert_eq!(truncate_label("Ünïcödé Ünïcödé", 5), "Ünïc…");
        assert_eq!(truncate_label("abc", 0), "…");
    }

    #[test]
    fn test_natural_size_grows_with_columns() {
        let one = natural_size(1);
        let three = natural_size(3);
        assert_eq!(one.width, PADDING * 2.0 + COLUMN_WIDTH);
        assert_eq!(three.width, one.width + 2.0 * (COLUMN_WIDTH + SPACING));
        assert_eq!(one.height, three.height);
        assert!(one.height >= VOLUME_SLIDER_HEIGHT + ICON_SIZE);
    }

    #[test]
    fn test_placeholder_size() {
        let mixer = view();
        assert_eq!(mixer.natural_size(), Size::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT));
    }
}
