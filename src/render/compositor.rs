// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region compositing for the preview canvas and for export.
//!
//! The preview draws onto the display-space resample with truncated labels
//! and selection chrome. Export draws onto a copy of the native image, maps
//! every region through the inverse transform and word-wraps its label.

use super::fonts::FontProvider;
use crate::interaction::{Handle, HANDLE_SIZE};
use crate::models::document::Document;
use crate::models::region::Region;
use crate::util::geometry::{Rect, Size};
use ab_glyph::{point, Font, FontArc, ScaleFont};
use image::{Rgba, RgbaImage};
use std::borrow::Cow;

/// Preview labels longer than this are truncated.
pub const PREVIEW_LABEL_MAX_CHARS: usize = 20;

const PREVIEW_FONT_PX: f32 = 12.0;
const EXPORT_FONT_PX: f32 = 14.0;
const LABEL_INSET: i32 = 3;
const LINE_SPACING: f32 = 2.0;
const ELLIPSIS: &str = "...";
const OUTLINE_WIDTH: i32 = 3;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PREVIEW_SHADOW: Rgba<u8> = Rgba([0, 0, 0, 255]);
const EXPORT_SHADOW: Rgba<u8> = Rgba([0, 0, 0, 180]);
const SELECTION: Rgba<u8> = Rgba([255, 255, 0, 255]);
const HANDLE_BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Render the canvas bitmap: resampled source, fills, labels and selection.
pub fn render_preview(doc: &Document, fonts: &FontProvider) -> RgbaImage {
    let mut canvas = doc.display_base().clone();

    for (i, region) in doc.regions().iter().enumerate() {
        let rect = region.rect();
        fill_rect(&mut canvas, rect, region_color(region));

        if !region.label_text.is_empty() {
            let label = preview_label(&region.label_text);
            if let Some(font) = fonts.resolve(&label) {
                let origin = (
                    (rect.x + LABEL_INSET) as f32,
                    (rect.y + LABEL_INSET) as f32,
                );
                let pen = Pen {
                    font,
                    px: PREVIEW_FONT_PX,
                    clip: full_rect(&canvas),
                    bold: true,
                };
                pen.shadowed(&mut canvas, origin, &label, PREVIEW_SHADOW);
            }
        }

        if doc.selected() == Some(i) {
            draw_selection(&mut canvas, rect);
        }
    }

    canvas
}

/// Render the regions over the untouched native-resolution source.
pub fn render_export(doc: &Document, fonts: &FontProvider) -> RgbaImage {
    let mut output = doc.source().clone();
    let transform = doc.transform();

    for region in doc.regions() {
        let rect = transform.to_native(region.rect());
        fill_rect(&mut output, rect, region_color(region));

        if region.label_text.is_empty() {
            continue;
        }
        let Some(font) = fonts.resolve(&region.label_text) else {
            log::warn!("No font available for label {:?}", region.label_text);
            continue;
        };
        let Some(clip) = rect.clip_to(Size::new(output.width(), output.height())) else {
            continue;
        };

        let pen = Pen {
            font,
            px: EXPORT_FONT_PX,
            clip,
            bold: false,
        };
        let (text_width, text_height) = pen.measure(&region.label_text);
        let max_width = (rect.width - 2 * LABEL_INSET) as f32;
        let max_height = (rect.height - 2 * LABEL_INSET) as f32;
        let lines = wrap_label(
            &region.label_text,
            (text_width, text_height),
            (max_width, max_height),
        );

        let line_height = text_height + LINE_SPACING;
        for (i, line) in lines.iter().enumerate() {
            let origin = (
                (rect.x + LABEL_INSET) as f32,
                (rect.y + LABEL_INSET) as f32 + i as f32 * line_height,
            );
            pen.shadowed(&mut output, origin, line, EXPORT_SHADOW);
        }
    }

    output
}

/// Truncate to the preview limit, ending in an ellipsis.
pub fn preview_label(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= PREVIEW_LABEL_MAX_CHARS {
        return Cow::Borrowed(text);
    }
    let keep = PREVIEW_LABEL_MAX_CHARS - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

/// Split an export label into lines that fit `max` (width, height).
///
/// `measured` is the single-line bounding box of the whole text. Characters
/// are packed greedily using the average glyph width. Lines that do not fit
/// vertically are dropped and the last visible line ends in an ellipsis.
pub fn wrap_label(text: &str, measured: (f32, f32), max: (f32, f32)) -> Vec<String> {
    let (text_width, text_height) = measured;
    let (max_width, max_height) = max;
    if text_width <= max_width && text_height <= max_height {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let char_width = text_width / chars.len() as f32;
    let per_line = if char_width > 0.0 {
        ((max_width / char_width) as usize).max(1)
    } else {
        chars.len()
    };
    let lines: Vec<String> = chars
        .chunks(per_line)
        .map(|chunk| chunk.iter().collect())
        .collect();

    let line_height = text_height + LINE_SPACING;
    let fitting = lines
        .iter()
        .enumerate()
        .take_while(|(i, _)| LABEL_INSET as f32 + *i as f32 * line_height + text_height <= max_height)
        .count();
    if fitting == lines.len() {
        return lines;
    }

    let mut visible: Vec<String> = lines.into_iter().take(fitting).collect();
    match visible.last_mut() {
        Some(last) => {
            let keep = per_line.saturating_sub(ELLIPSIS.len());
            *last = last.chars().take(keep).collect();
            last.push_str(ELLIPSIS);
        }
        None => visible.push(ELLIPSIS.to_string()),
    }
    visible
}

fn region_color(region: &Region) -> Rgba<u8> {
    let [r, g, b] = region.fill_color.to_array();
    Rgba([r, g, b, region.alpha])
}

fn full_rect(img: &RgbaImage) -> Rect {
    Rect::new(0, 0, img.width() as i32, img.height() as i32)
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    if src[3] == 0 {
        return;
    }
    if src[3] == 255 || dst[3] == 0 {
        *dst = src;
        return;
    }
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mix = |s: u8, d: u8| {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]);
}

fn fill_rect(img: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let Some(r) = rect.clip_to(Size::new(img.width(), img.height())) else {
        return;
    };
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            blend(img.get_pixel_mut(x as u32, y as u32), color);
        }
    }
}

fn draw_selection(img: &mut RgbaImage, rect: Rect) {
    let half = OUTLINE_WIDTH / 2;
    let w = OUTLINE_WIDTH;
    for edge in [
        Rect::new(rect.x - half, rect.y - half, rect.width + w, w),
        Rect::new(rect.x - half, rect.bottom() - half, rect.width + w, w),
        Rect::new(rect.x - half, rect.y - half, w, rect.height + w),
        Rect::new(rect.right() - half, rect.y - half, w, rect.height + w),
    ] {
        fill_rect(img, edge, SELECTION);
    }

    for handle in Handle::PRECEDENCE {
        let c = handle.corner(rect);
        let square = Rect::new(
            c.x - HANDLE_SIZE / 2,
            c.y - HANDLE_SIZE / 2,
            HANDLE_SIZE,
            HANDLE_SIZE,
        );
        fill_rect(img, square, HANDLE_BORDER);
        fill_rect(
            img,
            Rect::new(square.x + 1, square.y + 1, HANDLE_SIZE - 2, HANDLE_SIZE - 2),
            SELECTION,
        );
    }
}

/// Glyph rasterization settings for one label.
struct Pen<'a> {
    font: &'a FontArc,
    px: f32,
    clip: Rect,
    bold: bool,
}

impl Pen<'_> {
    /// Single-line bounding box of `text`.
    fn measure(&self, text: &str) -> (f32, f32) {
        let scaled = self.font.as_scaled(self.px);
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        (width, scaled.height())
    }

    /// Shadow one pixel down-right, then white glyphs on top.
    fn shadowed(&self, img: &mut RgbaImage, origin: (f32, f32), text: &str, shadow: Rgba<u8>) {
        self.draw(img, (origin.0 + 1.0, origin.1 + 1.0), text, shadow);
        self.draw(img, origin, text, WHITE);
    }

    fn draw(&self, img: &mut RgbaImage, origin: (f32, f32), text: &str, color: Rgba<u8>) {
        let strikes: &[f32] = if self.bold { &[0.0, 1.0] } else { &[0.0] };
        for &dx in strikes {
            self.draw_once(img, (origin.0 + dx, origin.1), text, color);
        }
    }

    fn draw_once(&self, img: &mut RgbaImage, origin: (f32, f32), text: &str, color: Rgba<u8>) {
        let scaled = self.font.as_scaled(self.px);
        let baseline = origin.1 + scaled.ascent();
        let bounds = self
            .clip
            .clip_to(Size::new(img.width(), img.height()))
            .unwrap_or_default();

        let mut caret = origin.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(self.px, point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let px_bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = px_bounds.min.x as i32 + gx as i32;
                let y = px_bounds.min.y as i32 + gy as i32;
                if x < bounds.x || y < bounds.y || x >= bounds.right() || y >= bounds.bottom() {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32).round() as u8;
                blend(
                    img.get_pixel_mut(x as u32, y as u32),
                    Rgba([color[0], color[1], color[2], alpha]),
                );
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::{RegionAttribute, Rgb};
    use crate::util::geometry::DEFAULT_VIEWPORT;
    use std::path::PathBuf;

    fn document(native: (u32, u32), viewport: (u32, u32)) -> Document {
        let source = RgbaImage::from_pixel(native.0, native.1, Rgba([0, 0, 255, 255]));
        Document::new(
            PathBuf::from("wall.png"),
            source,
            Size::new(viewport.0, viewport.1),
            DEFAULT_VIEWPORT,
        )
    }

    #[test]
    fn test_preview_label_truncates_long_text() {
        let text = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(text.chars().count(), 25);
        assert_eq!(preview_label(text), "abcdefghijklmnopq...");
        assert_eq!(preview_label("short"), "short");
        assert_eq!(preview_label("exactly twenty chars"), "exactly twenty chars");
    }

    #[test]
    fn test_export_wraps_long_text_without_truncation() {
        let text = "abcdefghijklmnopqrstuvwxy";
        let lines = wrap_label(text, (250.0, 16.0), (100.0, 200.0));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.concat(), text);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_ends_with_ellipsis_when_height_runs_out() {
        let text = "abcdefghijklmnopqrstuvwxy";
        // Room for two 16px lines: 3 + 18 + 16 = 37 <= 40 but 3 + 36 + 16 > 40.
        let lines = wrap_label(text, (250.0, 16.0), (100.0, 40.0));
        assert_eq!(lines, vec!["abcdefghij".to_string(), "klmnopq...".to_string()]);
    }

    #[test]
    fn test_wrap_with_no_room_is_only_ellipsis() {
        let lines = wrap_label("abcdefghijklmnopqrstuvwxy", (250.0, 16.0), (100.0, 10.0));
        assert_eq!(lines, vec!["..."]);
    }

    #[test]
    fn test_fitting_label_is_single_line() {
        assert_eq!(wrap_label("hi", (12.0, 14.0), (100.0, 40.0)), vec!["hi"]);
    }

    #[test]
    fn test_fill_is_alpha_blended() {
        let mut doc = document((400, 300), (400, 300));
        doc.add_region();
        doc.update_attribute(0, RegionAttribute::LabelText(String::new()))
            .unwrap();
        doc.update_attribute(0, RegionAttribute::FillColor(Rgb::new(255, 0, 0)))
            .unwrap();
        doc.select(None);

        let fonts = FontProvider::builtin();
        let preview = render_preview(&doc, &fonts);
        let blended = preview.get_pixel(70, 70);
        // alpha 128 red over opaque blue
        assert_eq!(blended[3], 255);
        assert!(blended[0] > 120 && blended[0] < 135, "{blended:?}");
        assert!(blended[2] > 120 && blended[2] < 135, "{blended:?}");
        assert_eq!(*preview.get_pixel(10, 10), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_preview_draws_handles_for_selection() {
        let mut doc = document((400, 300), (400, 300));
        doc.add_region();
        let fonts = FontProvider::builtin();
        let preview = render_preview(&doc, &fonts);
        // Handle centred on the south-east corner (250, 150).
        assert_eq!(*preview.get_pixel(251, 151), SELECTION);
        assert_eq!(*preview.get_pixel(246, 146), HANDLE_BORDER);
    }

    #[test]
    fn test_export_maps_regions_to_native_scale() {
        let mut doc = document((800, 600), (400, 300));
        doc.add_region();
        doc.update_attribute(0, RegionAttribute::LabelText(String::new()))
            .unwrap();
        doc.update_attribute(0, RegionAttribute::Alpha(255)).unwrap();
        let fonts = FontProvider::builtin();
        let output = render_export(&doc, &fonts);

        assert_eq!(output.dimensions(), (800, 600));
        // Display (50,50,200,100) is native (100,100,400,200).
        let fill = Rgba([0xFF, 0x6B, 0x6B, 255]);
        assert_eq!(*output.get_pixel(100, 100), fill);
        assert_eq!(*output.get_pixel(499, 299), fill);
        assert_eq!(*output.get_pixel(99, 99), Rgba([0, 0, 255, 255]));
        assert_eq!(*output.get_pixel(500, 300), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_export_draws_white_label_glyphs() {
        let mut doc = document((400, 300), (400, 300));
        doc.add_region();
        doc.update_attribute(0, RegionAttribute::FillColor(Rgb::new(0, 0, 0)))
            .unwrap();
        doc.update_attribute(0, RegionAttribute::Alpha(255)).unwrap();
        doc.update_attribute(0, RegionAttribute::LabelText("HHHH".into()))
            .unwrap();
        let fonts = FontProvider::builtin();
        let output = render_export(&doc, &fonts);

        let label_area = Rect::new(50, 50, 80, 30);
        let has_white = (label_area.y..label_area.bottom()).any(|y| {
            (label_area.x..label_area.right()).any(|x| output.get_pixel(x as u32, y as u32)[0] > 200)
        });
        assert!(has_white);
        // Nothing is drawn outside the region.
        assert_eq!(*output.get_pixel(49, 60), Rgba([0, 0, 255, 255]));
    }
}
