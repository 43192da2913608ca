// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the wallpaper preview.
//!
//! The preview bitmap is already composited at display size, so it is painted
//! 1:1 at the canvas top-left. Pointer input anywhere on the canvas is
//! reported in image pixels, which may lie outside the image.

use crate::util::geometry::{Point, Size};

/// Pointer input on the canvas, in canvas pixel coordinates.
pub enum CanvasAction {
    None,
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    Hover(Point),
}

/// What the canvas reports back each frame.
pub struct CanvasOutput {
    /// Space available for the image
    pub viewport: Size,
    pub action: CanvasAction,
}

/// Display the canvas area and translate raw pointer input.
pub fn show(ui: &mut egui::Ui, texture: Option<&egui::TextureHandle>) -> CanvasOutput {
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available = ui.available_size();
    let viewport = Size::new(available.x.max(0.0) as u32, available.y.max(0.0) as u32);
    let mut action = CanvasAction::None;

    egui::Frame::canvas(ui.style())
        .inner_margin(0.0)
        .show(ui, |ui| {
            ui.set_min_size(available);

            let Some(texture) = texture else {
                show_welcome(ui);
                return;
            };

            // Presses beside the image still count; they clear the selection.
            let canvas_rect = egui::Rect::from_min_size(ui.min_rect().min, available);
            let image_rect = egui::Rect::from_min_size(canvas_rect.min, texture.size_vec2());
            let response = ui.allocate_rect(canvas_rect, egui::Sense::click_and_drag());
            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let to_canvas = |pos: egui::Pos2| {
                let rel = pos - image_rect.min;
                Point::new(rel.x.floor() as i32, rel.y.floor() as i32)
            };

            let (pressed, released, down, pos) = ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_released(),
                    i.pointer.primary_down(),
                    i.pointer.latest_pos(),
                )
            });
            let Some(pos) = pos else {
                return;
            };

            action = if pressed && response.hovered() {
                CanvasAction::PointerDown(to_canvas(pos))
            } else if released {
                CanvasAction::PointerUp(to_canvas(pos))
            } else if down {
                CanvasAction::PointerMove(to_canvas(pos))
            } else if response.hovered() {
                CanvasAction::Hover(to_canvas(pos))
            } else {
                CanvasAction::None
            };
        });

    CanvasOutput { viewport, action }
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Wallpaper Regions")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a wallpaper to start laying out regions")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File > Open Wallpaper...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
