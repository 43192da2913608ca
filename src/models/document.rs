// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Document state management.
//!
//! A document is one loaded background image plus the ordered regions drawn
//! over it. It owns the native pixels, the display-space resample of them,
//! the current selection and the unsaved-changes bookkeeping.

use super::region::{Region, RegionAttribute, Rgb};
use crate::error::EditError;
use crate::util::geometry::{CoordinateTransform, Rect, Size};
use image::{imageops, RgbaImage};
use std::path::{Path, PathBuf};

const TEMPLATE_ALPHA: u8 = 150;

/// Reference geometry a region is rescaled from on viewport changes.
///
/// `rect` was current at `scale`; `shown` is the rect last produced from it.
/// A region whose rect no longer equals `shown` was edited since, and is
/// re-based at the current scale before the next rescale.
#[derive(Debug, Clone, Copy)]
struct ScaleBasis {
    rect: Rect,
    scale: f64,
    shown: Rect,
}

impl ScaleBasis {
    fn new(rect: Rect, scale: f64) -> Self {
        Self {
            rect,
            scale,
            shown: rect,
        }
    }
}

/// One loaded background image and its regions.
pub struct Document {
    source: RgbaImage,
    source_path: PathBuf,
    transform: CoordinateTransform,
    fallback_viewport: Size,
    display_base: RgbaImage,
    regions: Vec<Region>,
    /// Parallel to `regions`.
    bases: Vec<ScaleBasis>,
    selected: Option<usize>,
    revision: u64,
    saved_revision: u64,
}

impl Document {
    /// Create a document for a freshly loaded image. Regions start empty.
    pub fn new(
        source_path: PathBuf,
        source: RgbaImage,
        viewport: Size,
        fallback_viewport: Size,
    ) -> Self {
        let native = Size::new(source.width(), source.height());
        let transform = CoordinateTransform::recompute(native, viewport, fallback_viewport);
        let display_base = resample(&source, transform.display_size());
        Self {
            source,
            source_path,
            transform,
            fallback_viewport,
            display_base,
            regions: Vec::new(),
            bases: Vec::new(),
            selected: None,
            revision: 0,
            saved_revision: 0,
        }
    }

    pub fn source(&self) -> &RgbaImage {
        &self.source
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Display-space canvas size; regions are clamped against this.
    pub fn canvas_size(&self) -> Size {
        self.transform.display_size()
    }

    /// The source resampled to the current canvas size, without overlays.
    pub fn display_base(&self) -> &RgbaImage {
        &self.display_base
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.selected.and_then(|i| self.regions.get(i))
    }

    /// Recompute the transform for a new viewport.
    ///
    /// The canvas bitmap is always resampled from the untouched source. Region
    /// geometry is rescaled from each region's basis rather than from its
    /// previous rescale, so repeated resizes do not accumulate rounding loss.
    /// Returns `false` when the canvas size is unchanged.
    pub fn resize_viewport(&mut self, viewport: Size) -> bool {
        let transform = CoordinateTransform::recompute(
            self.transform.native_size(),
            viewport,
            self.fallback_viewport,
        );
        if transform.display_size() == self.transform.display_size() {
            return false;
        }

        let old_scale = self.transform.scale();
        let canvas = transform.display_size();
        for (region, basis) in self.regions.iter_mut().zip(self.bases.iter_mut()) {
            if region.rect() != basis.shown {
                *basis = ScaleBasis::new(region.rect(), old_scale);
            }
            let ratio = transform.scale() / basis.scale;
            let r = basis.rect;
            region.set_rect(Rect::new(
                scale_floor(r.x, ratio),
                scale_floor(r.y, ratio),
                scale_floor(r.width, ratio),
                scale_floor(r.height, ratio),
            ));
            region.clamp_to(canvas);
            basis.shown = region.rect();
        }

        self.transform = transform;
        self.display_base = resample(&self.source, canvas);
        log::debug!(
            "Canvas resized to {}x{} (scale {:.4})",
            canvas.width,
            canvas.height,
            transform.scale()
        );
        true
    }

    /// Append the default region, fitted to the canvas, and select it.
    pub fn add_region(&mut self) -> usize {
        let index = self.regions.len();
        let mut region = Region::default_numbered(index + 1);
        region.clamp_to(self.canvas_size());
        self.bases
            .push(ScaleBasis::new(region.rect(), self.transform.scale()));
        self.regions.push(region);
        self.selected = Some(index);
        self.mark_modified();
        index
    }

    /// Delete a region. Later regions shift down by one index.
    pub fn remove(&mut self, index: usize) -> Result<Region, EditError> {
        if index >= self.regions.len() {
            return Err(EditError::NoSuchRegion(index));
        }
        let removed = self.regions.remove(index);
        self.bases.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        self.mark_modified();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.bases.clear();
        self.selected = None;
        self.mark_modified();
    }

    /// Set one attribute of one region.
    pub fn update_attribute(
        &mut self,
        index: usize,
        attribute: RegionAttribute,
    ) -> Result<(), EditError> {
        let region = self
            .regions
            .get_mut(index)
            .ok_or(EditError::NoSuchRegion(index))?;
        attribute.apply(region);
        self.mark_modified();
        Ok(())
    }

    /// Replace every region with the five-region preset layout.
    pub fn generate_template(&mut self) {
        self.regions = template_regions(self.canvas_size());
        self.rebase_all();
        self.selected = None;
        self.mark_modified();
    }

    /// Replace every region with ones read from a project file.
    ///
    /// The regions are not validated here; the interaction engine re-clamps a
    /// region the first time it is grabbed. Returns how many were out of bounds.
    pub fn replace_regions(&mut self, regions: Vec<Region>) -> usize {
        let canvas = self.canvas_size();
        let out_of_bounds = regions.iter().filter(|r| !r.is_within(canvas)).count();
        self.regions = regions;
        self.rebase_all();
        self.selected = None;
        self.mark_modified();
        out_of_bounds
    }

    fn rebase_all(&mut self) {
        let scale = self.transform.scale();
        self.bases = self
            .regions
            .iter()
            .map(|r| ScaleBasis::new(r.rect(), scale))
            .collect();
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|&i| i < self.regions.len());
    }

    pub(crate) fn region_mut(&mut self, index: usize) -> Option<&mut Region> {
        self.regions.get_mut(index)
    }

    pub fn mark_modified(&mut self) {
        self.revision += 1;
    }

    /// Current revision; pass it back to `mark_saved` once a write succeeds.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record that everything up to `revision` is on disk.
    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = self.saved_revision.max(revision);
    }

    pub fn is_modified(&self) -> bool {
        self.revision != self.saved_revision
    }
}

/// The preset layout, computed as fixed percentages of the canvas size.
pub fn template_regions(canvas: Size) -> Vec<Region> {
    let w = canvas.width as i32;
    let h = canvas.height as i32;
    let pct_w = |p: i32| w * p / 100;
    let pct_h = |p: i32| h * p / 100;

    let left = Rect::new(pct_w(5), pct_h(10), pct_w(15), pct_h(80));
    let top = Rect::new(left.right() + pct_w(2), pct_h(10), pct_w(30), pct_h(15));
    let main = Rect::new(top.x, top.bottom() + pct_h(2), pct_w(40), pct_h(60));
    let right = Rect::new(main.right() + pct_w(2), pct_h(10), pct_w(25), pct_h(80));
    let bottom = Rect::new(main.x, main.bottom() + pct_h(2), pct_w(30), pct_h(15));

    [
        (left, "Pending", Rgb::new(0xFF, 0xD7, 0x00)),
        (top, "On Hold", Rgb::new(0x90, 0xEE, 0x90)),
        (main, "In Progress", Rgb::new(0xCD, 0x85, 0x3F)),
        (right, "Reference", Rgb::new(0xD3, 0xD3, 0xD3)),
        (bottom, "Iteration", Rgb::new(0xD3, 0xD3, 0xD3)),
    ]
    .into_iter()
    .map(|(rect, name, fill_color)| Region {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        name: name.to_string(),
        label_text: name.to_string(),
        fill_color,
        alpha: TEMPLATE_ALPHA,
    })
    .collect()
}

fn resample(source: &RgbaImage, size: Size) -> RgbaImage {
    if source.dimensions() == (size.width, size.height) {
        return source.clone();
    }
    imageops::resize(
        source,
        size.width,
        size.height,
        imageops::FilterType::Lanczos3,
    )
}

fn scale_floor(value: i32, ratio: f64) -> i32 {
    (value as f64 * ratio + 1e-6).floor() as i32
}
