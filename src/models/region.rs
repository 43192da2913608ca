// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region data structures.
//!
//! A region is a named, colored, semi-transparent rectangle with optional
//! label text. Geometry is stored in display space.

use crate::util::geometry::{Rect, Size};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Smallest width a region may be resized to.
pub const MIN_WIDTH: i32 = 50;

/// Smallest height a region may be resized to.
pub const MIN_HEIGHT: i32 = 30;

/// An opaque RGB color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #RRGGBB, got {s:?}"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color {s:?}: {e}"))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A rectangular overlay. Its identity is its position in the owning list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub name: String,
    #[serde(rename = "text", default)]
    pub label_text: String,
    #[serde(rename = "color")]
    pub fill_color: Rgb,
    pub alpha: u8,
}

impl Region {
    /// The region added by the "Add Region" action; `number` is 1-based.
    pub fn default_numbered(number: usize) -> Self {
        let label = format!("Region {number}");
        Self {
            x: 50,
            y: 50,
            width: 200,
            height: 100,
            name: label.clone(),
            label_text: label,
            fill_color: Rgb::new(0xFF, 0x6B, 0x6B),
            alpha: 128,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }

    /// Whether the geometry satisfies the size and canvas-bounds invariants.
    pub fn is_within(&self, canvas: Size) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width >= MIN_WIDTH
            && self.height >= MIN_HEIGHT
            && self.right() <= canvas.width as i32
            && self.bottom() <= canvas.height as i32
    }

    /// Force the geometry back inside the invariants, shrinking before moving.
    pub fn clamp_to(&mut self, canvas: Size) {
        let canvas_w = (canvas.width as i32).max(MIN_WIDTH);
        let canvas_h = (canvas.height as i32).max(MIN_HEIGHT);
        self.width = self.width.clamp(MIN_WIDTH, canvas_w);
        self.height = self.height.clamp(MIN_HEIGHT, canvas_h);
        self.x = self.x.clamp(0, canvas_w - self.width);
        self.y = self.y.clamp(0, canvas_h - self.height);
    }

    fn right(&self) -> i32 {
        self.x + self.width
    }

    fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// A single editable, non-geometric attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionAttribute {
    Name(String),
    LabelText(String),
    FillColor(Rgb),
    Alpha(u8),
}

impl RegionAttribute {
    pub(crate) fn apply(self, region: &mut Region) {
        match self {
            RegionAttribute::Name(name) => region.name = name,
            RegionAttribute::LabelText(text) => region.label_text = text,
            RegionAttribute::FillColor(color) => region.fill_color = color,
            RegionAttribute::Alpha(alpha) => region.alpha = alpha,
        }
    }
}
