// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the integer rectangle types shared by the editor and
//! the transform between native image space and display (scaled) space.

use serde::{Deserialize, Serialize};

/// Viewport used before the canvas has been laid out for the first time.
pub const DEFAULT_VIEWPORT: Size = Size {
    width: 800,
    height: 600,
};

/// Absorbs float error so that exact products do not floor one unit low.
const FLOOR_EPSILON: f64 = 1e-6;

/// A pointer position in display space. May lie outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of an image or viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned integer rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Inclusive on all four edges, matching how handles are hit-tested.
    pub fn contains(&self, p: Point) -> bool {
        self.x <= p.x && p.x <= self.right() && self.y <= p.y && p.y <= self.bottom()
    }

    /// Intersect with `[0, width) x [0, height)`; `None` when nothing is left.
    pub fn clip_to(&self, bounds: Size) -> Option<Rect> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(bounds.width as i32);
        let y1 = self.bottom().min(bounds.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// Mapping between native image pixels and the scaled preview canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    scale: f64,
    native: Size,
    display: Size,
}

impl CoordinateTransform {
    /// Fit `native` into `viewport`, preserving aspect ratio.
    ///
    /// Upscaling is allowed. A viewport that has not been realized yet
    /// (either side `<= 1`) is replaced by `fallback`.
    pub fn recompute(native: Size, viewport: Size, fallback: Size) -> Self {
        let viewport = if viewport.width <= 1 || viewport.height <= 1 {
            fallback
        } else {
            viewport
        };

        let scale = if native.width == 0 || native.height == 0 {
            1.0
        } else {
            let scale_x = viewport.width as f64 / native.width as f64;
            let scale_y = viewport.height as f64 / native.height as f64;
            scale_x.min(scale_y)
        };

        let display = Size::new(
            floor_scaled(native.width as i32, scale).max(1) as u32,
            floor_scaled(native.height as i32, scale).max(1) as u32,
        );

        Self {
            scale,
            native,
            display,
        }
    }

    /// Display-space-to-native ratio applied to native coordinates.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn native_size(&self) -> Size {
        self.native
    }

    /// Size of the resampled canvas bitmap.
    pub fn display_size(&self) -> Size {
        self.display
    }

    pub fn to_display(&self, native: Rect) -> Rect {
        Rect::new(
            floor_scaled(native.x, self.scale),
            floor_scaled(native.y, self.scale),
            floor_scaled(native.width, self.scale),
            floor_scaled(native.height, self.scale),
        )
    }

    pub fn to_native(&self, display: Rect) -> Rect {
        let inv = 1.0 / self.scale;
        Rect::new(
            floor_scaled(display.x, inv),
            floor_scaled(display.y, inv),
            floor_scaled(display.width, inv),
            floor_scaled(display.height, inv),
        )
    }
}

fn floor_scaled(value: i32, factor: f64) -> i32 {
    (value as f64 * factor + FLOOR_EPSILON).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(native: (u32, u32), viewport: (u32, u32)) -> CoordinateTransform {
        CoordinateTransform::recompute(
            Size::new(native.0, native.1),
            Size::new(viewport.0, viewport.1),
            DEFAULT_VIEWPORT,
        )
    }

    #[test]
    fn test_scale_fits_limiting_axis() {
        let t = transform((1920, 1080), (960, 960));
        assert!((t.scale() - 0.5).abs() < 1e-9);
        assert_eq!(t.display_size(), Size::new(960, 540));
    }

    #[test]
    fn test_upscaling_is_permitted() {
        let t = transform((400, 300), (1200, 900));
        assert!((t.scale() - 3.0).abs() < 1e-9);
        assert_eq!(t.display_size(), Size::new(1200, 900));
    }

    #[test]
    fn test_unrealized_viewport_uses_fallback() {
        let t = transform((1600, 1200), (1, 0));
        assert!((t.scale() - 0.5).abs() < 1e-9);
        assert_eq!(t.display_size(), Size::new(800, 600));
    }

    #[test]
    fn test_native_roundtrip_within_one_unit_when_upscaling() {
        for &(native, viewport) in &[((300, 200), (900, 700)), ((640, 480), (1000, 1000))] {
            let t = transform(native, viewport);
            for v in [0, 1, 7, 33, 99, 150, 199] {
                let r = Rect::new(v, v / 2, v + 50, v + 30);
                let back = t.to_native(t.to_display(r));
                assert!((back.x - r.x).abs() <= 1, "{r:?} -> {back:?}");
                assert!((back.y - r.y).abs() <= 1, "{r:?} -> {back:?}");
                assert!((back.width - r.width).abs() <= 1, "{r:?} -> {back:?}");
                assert!((back.height - r.height).abs() <= 1, "{r:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_display_roundtrip_within_one_unit_when_downscaling() {
        let t = transform((3000, 2000), (1000, 800));
        for v in [0, 3, 50, 123, 499, 640] {
            let r = Rect::new(v, v, 200, 100);
            let back = t.to_display(t.to_native(r));
            assert!((back.x - r.x).abs() <= 1);
            assert!((back.y - r.y).abs() <= 1);
            assert!((back.width - r.width).abs() <= 1);
            assert!((back.height - r.height).abs() <= 1);
        }
    }

    #[test]
    fn test_exact_scale_maps_without_loss() {
        let t = transform((2000, 1600), (1000, 800));
        let native = t.to_native(Rect::new(50, 80, 150, 640));
        assert_eq!(native, Rect::new(100, 160, 300, 1280));
    }

    #[test]
    fn test_clip_to_bounds() {
        let r = Rect::new(-10, 5, 30, 30);
        assert_eq!(r.clip_to(Size::new(15, 20)), Some(Rect::new(0, 5, 15, 15)));
        assert_eq!(Rect::new(20, 20, 5, 5).clip_to(Size::new(10, 10)), None);
    }
}
