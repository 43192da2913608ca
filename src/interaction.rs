// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven region editing.
//!
//! Pointer events arrive in display space. A press selects the first region
//! (in stored order) containing the point and starts either a move or a
//! corner resize; moves mutate the selected region; a release ends the
//! gesture. Every mutation keeps the region inside the canvas and above the
//! minimum size.

use crate::models::document::Document;
use crate::models::region::{MIN_HEIGHT, MIN_WIDTH};
use crate::util::geometry::{Point, Rect, Size};

/// Side length of the square grab zone at each region corner.
pub const HANDLE_SIZE: i32 = 8;

/// A resize handle at one corner of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Handle {
    /// Order in which handles are tested when their grab zones overlap.
    pub const PRECEDENCE: [Handle; 4] = [
        Handle::SouthEast,
        Handle::NorthWest,
        Handle::NorthEast,
        Handle::SouthWest,
    ];

    /// The corner point this handle sits on.
    pub fn corner(self, rect: Rect) -> Point {
        match self {
            Handle::NorthWest => Point::new(rect.x, rect.y),
            Handle::NorthEast => Point::new(rect.right(), rect.y),
            Handle::SouthWest => Point::new(rect.x, rect.bottom()),
            Handle::SouthEast => Point::new(rect.right(), rect.bottom()),
        }
    }

    /// Grab zone: the handle-sized square inside `rect` at this corner.
    fn grab_zone(self, rect: Rect) -> Rect {
        let left = rect.right() - HANDLE_SIZE;
        let top = rect.bottom() - HANDLE_SIZE;
        let (x, y) = match self {
            Handle::NorthWest => (rect.x, rect.y),
            Handle::NorthEast => (left, rect.y),
            Handle::SouthWest => (rect.x, top),
            Handle::SouthEast => (left, top),
        };
        Rect::new(x, y, HANDLE_SIZE, HANDLE_SIZE)
    }

    /// First handle of `rect` under `p`, in precedence order.
    pub fn hit(rect: Rect, p: Point) -> Option<Handle> {
        Self::PRECEDENCE
            .into_iter()
            .find(|h| h.grab_zone(rect).contains(p))
    }

    /// Geometry for a resize from `anchor` with the pointer at `p`.
    ///
    /// `None` means the candidate would leave the canvas; the caller keeps
    /// the previous geometry for this event.
    fn resize(self, anchor: Rect, current: Rect, p: Point, canvas: Size) -> Option<Rect> {
        let canvas_w = canvas.width as i32;
        let canvas_h = canvas.height as i32;
        let grow_right = || (p.x - anchor.x).max(MIN_WIDTH);
        let grow_down = || (p.y - anchor.y).max(MIN_HEIGHT);
        let grow_left = || (anchor.right() - p.x).max(MIN_WIDTH);
        let grow_up = || (anchor.bottom() - p.y).max(MIN_HEIGHT);

        let candidate = match self {
            Handle::SouthEast => {
                return Some(Rect::new(
                    current.x,
                    current.y,
                    grow_right().min(canvas_w - current.x),
                    grow_down().min(canvas_h - current.y),
                ));
            }
            Handle::NorthWest => Rect::new(p.x, p.y, grow_left(), grow_up()),
            Handle::NorthEast => Rect::new(current.x, p.y, grow_right(), grow_up()),
            Handle::SouthWest => Rect::new(p.x, current.y, grow_left(), grow_down()),
        };

        let inside = candidate.x >= 0
            && candidate.y >= 0
            && candidate.right() <= canvas_w
            && candidate.bottom() <= canvas_h;
        inside.then_some(candidate)
    }
}

/// What the pointer is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        region: usize,
        grab_offset: Point,
        start: Rect,
    },
    Resizing {
        region: usize,
        handle: Handle,
        anchor: Rect,
    },
}

/// Cursor shape to show while hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Crosshair,
    Move,
    Resize(Handle),
}

/// Result of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureOutcome {
    pub geometry_changed: bool,
}

/// The region-editing state machine.
#[derive(Debug, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != InteractionState::Idle
    }

    /// Drop any gesture in progress.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Select the first region under `p` and start a drag or resize.
    ///
    /// Clears the selection when no region contains the point.
    pub fn pointer_down(&mut self, doc: &mut Document, p: Point) {
        let canvas = doc.canvas_size();
        let Some(index) = doc.regions().iter().position(|r| r.rect().contains(p)) else {
            doc.select(None);
            self.state = InteractionState::Idle;
            return;
        };

        doc.select(Some(index));
        let Some(region) = doc.region_mut(index) else {
            return;
        };
        // Regions read from a project file may be out of bounds.
        let before = region.rect();
        region.clamp_to(canvas);
        let rect = region.rect();
        if rect != before {
            log::debug!("Re-clamped region {index} from {before:?} to {rect:?}");
            doc.mark_modified();
        }

        self.state = match Handle::hit(rect, p) {
            Some(handle) => InteractionState::Resizing {
                region: index,
                handle,
                anchor: rect,
            },
            None => InteractionState::Dragging {
                region: index,
                grab_offset: Point::new(p.x - rect.x, p.y - rect.y),
                start: rect,
            },
        };
    }

    /// Advance the active gesture. Without one this is only a hover.
    pub fn pointer_move(&mut self, doc: &mut Document, p: Point) -> CursorHint {
        let canvas = doc.canvas_size();
        match self.state {
            InteractionState::Idle => self.hover(doc, p),
            InteractionState::Dragging {
                region, grab_offset, ..
            } => {
                if let Some(r) = doc.region_mut(region) {
                    let x = (p.x - grab_offset.x).min(canvas.width as i32 - r.width).max(0);
                    let y = (p.y - grab_offset.y).min(canvas.height as i32 - r.height).max(0);
                    r.x = x;
                    r.y = y;
                }
                CursorHint::Move
            }
            InteractionState::Resizing {
                region,
                handle,
                anchor,
            } => {
                if let Some(r) = doc.region_mut(region) {
                    if let Some(rect) = handle.resize(anchor, r.rect(), p, canvas) {
                        r.set_rect(rect);
                    }
                }
                CursorHint::Resize(handle)
            }
        }
    }

    /// End the gesture, marking the document modified if geometry moved.
    pub fn pointer_up(&mut self, doc: &mut Document) -> GestureOutcome {
        let (region, start) = match std::mem::take(&mut self.state) {
            InteractionState::Idle => {
                return GestureOutcome {
                    geometry_changed: false,
                }
            }
            InteractionState::Dragging { region, start, .. } => (region, start),
            InteractionState::Resizing { region, anchor, .. } => (region, anchor),
        };

        let geometry_changed = doc
            .regions()
            .get(region)
            .is_some_and(|r| r.rect() != start);
        if geometry_changed {
            doc.mark_modified();
        }
        GestureOutcome { geometry_changed }
    }

    /// Cursor feedback for the selected region; never changes state.
    pub fn hover(&self, doc: &Document, p: Point) -> CursorHint {
        let Some(rect) = doc.selected_region().map(|r| r.rect()) else {
            return CursorHint::Crosshair;
        };
        if !rect.contains(p) {
            return CursorHint::Crosshair;
        }
        match Handle::hit(rect, p) {
            Some(handle) => CursorHint::Resize(handle),
            None => CursorHint::Move,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::Region;
    use crate::util::geometry::DEFAULT_VIEWPORT;
    use image::RgbaImage;
    use std::path::PathBuf;

    /// An 800x600 canvas at scale 1 with the given regions.
    fn document_with(rects: &[Rect]) -> Document {
        let mut doc = Document::new(
            PathBuf::from("wall.png"),
            RgbaImage::new(800, 600),
            Size::new(800, 600),
            DEFAULT_VIEWPORT,
        );
        let regions = rects
            .iter()
            .enumerate()
            .map(|(i, rect)| {
                let mut region = Region::default_numbered(i + 1);
                region.set_rect(*rect);
                region
            })
            .collect();
        doc.replace_regions(regions);
        doc
    }

    fn assert_invariants(doc: &Document) {
        let canvas = doc.canvas_size();
        for region in doc.regions() {
            assert!(region.is_within(canvas), "{:?} escaped {canvas:?}", region.rect());
        }
    }

    #[test]
    fn test_first_region_in_stored_order_wins() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100), Rect::new(150, 120, 200, 100)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(200, 150));
        assert_eq!(doc.selected(), Some(0));
        assert!(matches!(
            interaction.state(),
            InteractionState::Dragging { region: 0, grab_offset: Point { x: 100, y: 50 }, .. }
        ));
    }

    #[test]
    fn test_press_on_empty_canvas_clears_selection() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        doc.select(Some(0));
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(700, 500));
        assert_eq!(doc.selected(), None);
        assert_eq!(interaction.state(), InteractionState::Idle);
    }

    #[test]
    fn test_handle_precedence_on_tiny_region() {
        // Every grab zone covers the whole 8x8 region, so SE must win.
        let rect = Rect::new(10, 10, 8, 8);
        assert_eq!(Handle::hit(rect, Point::new(14, 14)), Some(Handle::SouthEast));

        // On a 10x10 region the top-left pixel is outside SE and NE/SW overlap NW.
        let rect = Rect::new(10, 10, 10, 10);
        assert_eq!(Handle::hit(rect, Point::new(10, 10)), Some(Handle::NorthWest));
        assert_eq!(Handle::hit(rect, Point::new(15, 10)), Some(Handle::NorthWest));
        assert_eq!(Handle::hit(rect, Point::new(20, 10)), Some(Handle::NorthEast));
        assert_eq!(Handle::hit(rect, Point::new(10, 20)), Some(Handle::SouthWest));
    }

    #[test]
    fn test_press_on_corner_starts_resize_with_frozen_anchor() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(298, 198));
        assert_eq!(
            interaction.state(),
            InteractionState::Resizing {
                region: 0,
                handle: Handle::SouthEast,
                anchor: Rect::new(100, 100, 200, 100),
            }
        );
    }

    #[test]
    fn test_se_resize_clamps_to_minimum_size() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(300, 200));
        interaction.pointer_move(&mut doc, Point::new(50, 50));
        assert_eq!(doc.regions()[0].rect(), Rect::new(100, 100, 50, 30));
    }

    #[test]
    fn test_se_resize_stops_at_canvas_edge() {
        let mut doc = document_with(&[Rect::new(600, 500, 100, 50)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(700, 550));
        interaction.pointer_move(&mut doc, Point::new(1000, 900));
        assert_eq!(doc.regions()[0].rect(), Rect::new(600, 500, 200, 100));
    }

    #[test]
    fn test_nw_resize_out_of_bounds_is_a_no_op() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(101, 101));
        assert!(matches!(
            interaction.state(),
            InteractionState::Resizing { handle: Handle::NorthWest, .. }
        ));

        interaction.pointer_move(&mut doc, Point::new(80, 90));
        assert_eq!(doc.regions()[0].rect(), Rect::new(80, 90, 220, 110));

        interaction.pointer_move(&mut doc, Point::new(-5, 40));
        assert_eq!(doc.regions()[0].rect(), Rect::new(80, 90, 220, 110));
    }

    #[test]
    fn test_ne_and_sw_flip_one_axis() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(299, 101));
        interaction.pointer_move(&mut doc, Point::new(350, 60));
        assert_eq!(doc.regions()[0].rect(), Rect::new(100, 60, 250, 140));
        interaction.pointer_up(&mut doc);

        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        interaction.pointer_down(&mut doc, Point::new(101, 199));
        interaction.pointer_move(&mut doc, Point::new(40, 260));
        assert_eq!(doc.regions()[0].rect(), Rect::new(40, 100, 260, 160));
    }

    #[test]
    fn test_drag_clamps_each_axis_independently() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(150, 150));
        interaction.pointer_move(&mut doc, Point::new(10, 300));
        assert_eq!(doc.regions()[0].rect(), Rect::new(0, 250, 200, 100));
        interaction.pointer_move(&mut doc, Point::new(900, 900));
        assert_eq!(doc.regions()[0].rect(), Rect::new(600, 500, 200, 100));
    }

    #[test]
    fn test_release_marks_modified_only_when_geometry_changed() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        doc.mark_saved(doc.revision());
        let mut interaction = Interaction::new();

        interaction.pointer_down(&mut doc, Point::new(150, 150));
        let outcome = interaction.pointer_up(&mut doc);
        assert!(!outcome.geometry_changed);
        assert!(!doc.is_modified());

        interaction.pointer_down(&mut doc, Point::new(150, 150));
        interaction.pointer_move(&mut doc, Point::new(160, 150));
        assert!(interaction.pointer_up(&mut doc).geometry_changed);
        assert!(doc.is_modified());
        assert_eq!(interaction.state(), InteractionState::Idle);
    }

    #[test]
    fn test_hover_reports_cursor_without_state_change() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100)]);
        let mut interaction = Interaction::new();
        assert_eq!(
            interaction.pointer_move(&mut doc, Point::new(150, 150)),
            CursorHint::Crosshair
        );

        doc.select(Some(0));
        assert_eq!(
            interaction.pointer_move(&mut doc, Point::new(299, 199)),
            CursorHint::Resize(Handle::SouthEast)
        );
        assert_eq!(
            interaction.pointer_move(&mut doc, Point::new(150, 150)),
            CursorHint::Move
        );
        assert_eq!(interaction.state(), InteractionState::Idle);
        assert_eq!(doc.regions()[0].rect(), Rect::new(100, 100, 200, 100));
    }

    #[test]
    fn test_out_of_bounds_region_is_reclamped_when_grabbed() {
        let mut doc = document_with(&[Rect::new(700, 550, 200, 100)]);
        let mut interaction = Interaction::new();
        interaction.pointer_down(&mut doc, Point::new(750, 580));
        assert_eq!(doc.regions()[0].rect(), Rect::new(600, 500, 200, 100));
    }

    #[test]
    fn test_invariants_hold_through_gesture_sequences() {
        let mut doc = document_with(&[Rect::new(100, 100, 200, 100), Rect::new(500, 300, 120, 80)]);
        let mut interaction = Interaction::new();
        let presses = [
            Point::new(101, 101),
            Point::new(299, 101),
            Point::new(101, 199),
            Point::new(299, 199),
            Point::new(550, 340),
        ];
        let path = [
            Point::new(-40, -40),
            Point::new(900, 700),
            Point::new(799, 0),
            Point::new(0, 599),
            Point::new(400, 300),
            Point::new(790, 590),
            Point::new(-500, 900),
        ];

        for press in presses {
            interaction.pointer_down(&mut doc, press);
            for p in path {
                interaction.pointer_move(&mut doc, p);
                assert_invariants(&doc);
            }
            interaction.pointer_up(&mut doc);
            // Put the region back somewhere grabbable for the next press.
            if let Some(i) = doc.selected() {
                let mut rect = Rect::new(100, 100, 200, 100);
                if i == 1 {
                    rect = Rect::new(500, 300, 120, 80);
                }
                doc.region_mut(i).unwrap().set_rect(rect);
            }
        }
    }
}
