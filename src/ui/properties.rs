// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region properties panel.
//!
//! Lists the regions in stacking order and edits the selected one's name,
//! label text, fill color and opacity.

use crate::models::document::Document;
use crate::models::region::{RegionAttribute, Rgb};

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    Select(usize),
    Update(RegionAttribute),
}

/// Display the properties panel.
pub fn show(ui: &mut egui::Ui, document: Option<&Document>) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Regions");
    ui.separator();

    let Some(doc) = document else {
        ui.label(egui::RichText::new("No wallpaper loaded").weak());
        return action;
    };

    if doc.regions().is_empty() {
        ui.label(egui::RichText::new("No regions yet").weak());
    }

    egui::ScrollArea::vertical()
        .id_source("region_list")
        .max_height(220.0)
        .show(ui, |ui| {
            for (i, region) in doc.regions().iter().enumerate() {
                let [r, g, b] = region.fill_color.to_array();
                ui.horizontal(|ui| {
                    let (swatch, _) =
                        ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter()
                        .rect_filled(swatch, 2.0, egui::Color32::from_rgb(r, g, b));
                    if ui
                        .selectable_label(doc.selected() == Some(i), &region.name)
                        .clicked()
                    {
                        action = PropertiesAction::Select(i);
                    }
                });
            }
        });

    let Some(region) = doc.selected_region() else {
        return action;
    };

    ui.separator();
    ui.heading("Selected Region");

    egui::Grid::new("region_properties")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Name:");
            let mut name = region.name.clone();
            if ui.text_edit_singleline(&mut name).changed() {
                action = PropertiesAction::Update(RegionAttribute::Name(name));
            }
            ui.end_row();

            ui.label("Color:");
            let mut color = region.fill_color.to_array();
            if ui.color_edit_button_srgb(&mut color).changed() {
                action = PropertiesAction::Update(RegionAttribute::FillColor(Rgb::from_array(color)));
            }
            ui.end_row();

            ui.label("Opacity:");
            let mut alpha = region.alpha;
            if ui.add(egui::Slider::new(&mut alpha, 0..=255)).changed() {
                action = PropertiesAction::Update(RegionAttribute::Alpha(alpha));
            }
            ui.end_row();

            let rect = region.rect();
            ui.label("Bounds:");
            ui.label(
                egui::RichText::new(format!(
                    "{}, {}  {}x{}",
                    rect.x, rect.y, rect.width, rect.height
                ))
                .monospace(),
            );
            ui.end_row();
        });

    ui.add_space(6.0);
    ui.label("Label text:");
    let mut text = region.label_text.clone();
    if ui
        .add(
            egui::TextEdit::multiline(&mut text)
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        )
        .changed()
    {
        action = PropertiesAction::Update(RegionAttribute::LabelText(text));
    }

    action
}
