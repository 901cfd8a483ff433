// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Freedesktop icon theme lookup for application icons.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Icon used when a stream has no hint or its hint does not resolve.
pub const FALLBACK_ICON: &str = "audio-volume-high-symbolic";

const THEMES: &[&str] = &["hicolor", "Adwaita"];
const SIZES: &[&str] = &["scalable", "48x48", "64x64", "32x32", "128x128", "256x256", "24x24", "symbolic"];
const CONTEXTS: &[&str] = &["apps", "status", "devices"];

/// A resolved icon file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    Svg(PathBuf),
    Raster(PathBuf),
    /// Nothing found; draw a neutral glyph.
    Glyph,
}

impl IconSource {
    fn from_path(path: PathBuf) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("svg") => IconSource::Svg(path),
            _ => IconSource::Raster(path),
        }
    }
}

/// Resolves icon names against the icon theme directories, caching results.
#[derive(Debug)]
pub struct IconResolver {
    data_dirs: Vec<PathBuf>,
    cache: HashMap<String, IconSource>,
}

impl IconResolver {
    /// Search `$XDG_DATA_HOME` then `$XDG_DATA_DIRS`.
    pub fn from_env() -> Self {
        let mut data_dirs = Vec::new();
        if let Some(home) = dirs::data_dir() {
            data_dirs.push(home);
        }
        let system = env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
        data_dirs.extend(system.split(':').filter(|d| !d.is_empty()).map(PathBuf::from));
        Self::with_data_dirs(data_dirs)
    }

    pub fn with_data_dirs(data_dirs: Vec<PathBuf>) -> Self {
        Self {
            data_dirs,
            cache: HashMap::new(),
        }
    }

    /// Resolve a hint, falling back to the generic icon and then a glyph.
    pub fn resolve(&mut self, hint: Option<&str>) -> IconSource {
        if let Some(name) = hint.filter(|n| !n.is_empty()) {
            let found = self.lookup(name);
            if found != IconSource::Glyph {
                return found;
            }
        }
        self.lookup(FALLBACK_ICON)
    }

    fn lookup(&mut self, name: &str) -> IconSource {
        if let Some(hit) = self.cache.get(name) {
            return hit.clone();
        }
        let found = self.search(name).map_or(IconSource::Glyph, IconSource::from_path);
        trace!("Icon {} resolved to {:?}", name, found);
        self.cache.insert(name.to_string(), found.clone());
        found
    }

    fn search(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_absolute() {
            return direct.is_file().then(|| direct.to_path_buf());
        }

        for data_dir in &self.data_dirs {
            let icons = data_dir.join("icons");
            for theme in THEMES {
                for size in SIZES {
                    for context in CONTEXTS {
                        let dir = icons.join(theme).join(size).join(context);
                        if let Some(path) = find_in(&dir, name) {
                            return Some(path);
                        }
                    }
                }
            }
        }

        self.data_dirs
            .iter()
            .find_map(|data_dir| find_in(&data_dir.join("pixmaps"), name))
    }
}

fn find_in(dir: &Path, name: &str) -> Option<PathBuf> {
    ["svg", "png"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_resolves_theme_icon() {
        let dir = tempfile::tempdir().unwrap();
        let svg = dir.path().join("icons/hicolor/scalable/apps/firefox.svg");
        touch(&svg);

        let mut resolver = IconResolver::with_data_dirs(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve(Some("firefox")), IconSource::Svg(svg));
    }

    #[test]
    fn test_resolves_pixmap() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("pixmaps/mpv.png");
        touch(&png);

        let mut resolver = IconResolver::with_data_dirs(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve(Some("mpv")), IconSource::Raster(png));
    }

    #[test]
    fn test_unknown_hint_uses_fallback_icon() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir
            .path()
            .join("icons/Adwaita/symbolic/status/audio-volume-high-symbolic.svg");
        touch(&fallback);

        let mut resolver = IconResolver::with_data_dirs(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve(Some("nonexistent")), IconSource::Svg(fallback.clone()));
        assert_eq!(resolver.resolve(None), IconSource::Svg(fallback));
    }

    #[test]
    fn test_nothing_found_is_glyph() {
        let dir = tempfile::tempdir().unwrap();
        let mut resolver = IconResolver::with_data_dirs(vec![dir.path().to_path_buf()]);
        assert_eq!(resolver.resolve(Some("nothing")), IconSource::Glyph);
    }

    #[test]
    fn test_earlier_data_dir_wins() {
        let home = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        let user = home.path().join("icons/hicolor/48x48/apps/app.png");
        touch(&user);
        touch(&system.path().join("icons/hicolor/48x48/apps/app.png"));

        let mut resolver = IconResolver::with_data_dirs(vec![
            home.path().to_path_buf(),
            system.path().to_path_buf(),
        ]);
        assert_eq!(resolver.resolve(Some("app")), IconSource::Raster(user));
    }
}
