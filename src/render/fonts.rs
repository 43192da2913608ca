// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label font resolution.
//!
//! Fonts are tried in priority order: user-configured descriptors, then the
//! platform's CJK-capable system fonts, then the fonts compiled into egui.
//! The built-in fallback means a font is available even on a machine with no
//! fonts installed.

use ab_glyph::{Font, FontArc, FontVec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// egui's bundled fonts, in the order they are tried.
const BUILTIN_FONT_NAMES: [&str; 2] = ["Ubuntu-Light", "Hack"];

/// A font file on disk. `index` selects a face inside a `.ttc` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub path: PathBuf,
    #[serde(default)]
    pub index: u32,
}

impl FontDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            index: 0,
        }
    }

    fn load(&self) -> Option<FontArc> {
        let data = std::fs::read(&self.path).ok()?;
        match FontVec::try_from_vec_and_index(data, self.index) {
            Ok(font) => Some(FontArc::new(font)),
            Err(e) => {
                log::warn!("Ignoring unreadable font {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// System fonts worth trying on the current platform, best first.
pub fn platform_fonts() -> Vec<FontDescriptor> {
    let paths: &[&str] = if cfg!(target_os = "windows") {
        &[
            "C:\\Windows\\Fonts\\msyh.ttc",
            "C:\\Windows\\Fonts\\simhei.ttf",
            "C:\\Windows\\Fonts\\arialbd.ttf",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/PingFang.ttc",
            "/System/Library/Fonts/STHeiti Medium.ttc",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        ]
    };
    paths.iter().map(|p| FontDescriptor::new(*p)).collect()
}

fn builtin_fonts() -> Vec<FontArc> {
    let definitions = egui::FontDefinitions::default();
    BUILTIN_FONT_NAMES
        .iter()
        .filter_map(|name| definitions.font_data.get(*name))
        .filter_map(|data| {
            FontVec::try_from_vec_and_index(data.font.to_vec(), data.index)
                .ok()
                .map(FontArc::new)
        })
        .collect()
}

/// A prioritized list of loaded fonts.
pub struct FontProvider {
    fonts: Vec<FontArc>,
}

impl FontProvider {
    /// Load `extra` and the platform list, keeping whichever files exist.
    pub fn new(extra: &[FontDescriptor]) -> Self {
        let mut fonts: Vec<FontArc> = extra
            .iter()
            .chain(platform_fonts().iter())
            .filter_map(|d| {
                let font = d.load()?;
                log::info!("Loaded label font {}", d.path.display());
                Some(font)
            })
            .collect();
        if fonts.is_empty() {
            log::warn!("No system fonts found; using built-in label font");
        }
        fonts.extend(builtin_fonts());
        Self { fonts }
    }

    /// Only the fonts bundled with the binary.
    pub fn builtin() -> Self {
        Self {
            fonts: builtin_fonts(),
        }
    }

    /// The first font that has a glyph for every visible character of
    /// `text`, else the highest-priority font.
    pub fn resolve(&self, text: &str) -> Option<&FontArc> {
        let covers = |font: &&FontArc| {
            text.chars()
                .filter(|c| !c.is_whitespace())
                .all(|c| font.glyph_id(c).0 != 0)
        };
        self.fonts.iter().find(covers).or_else(|| self.fonts.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_font_is_always_available() {
        let fonts = FontProvider::builtin();
        assert!(fonts.resolve("Region 1").is_some());
    }

    #[test]
    fn test_missing_font_files_fall_through() {
        let fonts = FontProvider::new(&[FontDescriptor::new("/nonexistent/font.ttf")]);
        let font = fonts.resolve("abc").unwrap();
        assert_ne!(font.glyph_id('a').0, 0);
    }

    #[test]
    fn test_descriptor_yaml_defaults_index() {
        let d: FontDescriptor = serde_yaml::from_str("path: /tmp/a.ttc").unwrap();
        assert_eq!(d, FontDescriptor::new("/tmp/a.ttc"));
    }
}
