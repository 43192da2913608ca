// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the common region operations.

/// Toolbar button that was clicked this frame.
pub enum ToolbarAction {
    None,
    OpenImage,
    AddRegion,
    GenerateTemplate,
    DeleteSelected,
    ClearRegions,
    Export,
    SetAutosave(bool),
}

/// Display the toolbar. Editing buttons are disabled until a wallpaper is open.
pub fn show(
    ui: &mut egui::Ui,
    has_document: bool,
    has_selection: bool,
    autosave_enabled: &mut bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("🖼 Open").clicked() {
            action = ToolbarAction::OpenImage;
        }

        ui.separator();

        if ui.add_enabled(has_document, egui::Button::new("➕ Add Region")).clicked() {
            action = ToolbarAction::AddRegion;
        }
        if ui.add_enabled(has_document, egui::Button::new("▦ Template")).clicked() {
            action = ToolbarAction::GenerateTemplate;
        }
        if ui.add_enabled(has_selection, egui::Button::new("🗑 Delete")).clicked() {
            action = ToolbarAction::DeleteSelected;
        }
        if ui.add_enabled(has_document, egui::Button::new("Clear")).clicked() {
            action = ToolbarAction::ClearRegions;
        }

        ui.separator();

        if ui.add_enabled(has_document, egui::Button::new("💾 Export")).clicked() {
            action = ToolbarAction::Export;
        }

        ui.separator();

        if ui.checkbox(autosave_enabled, "Autosave").changed() {
            action = ToolbarAction::SetAutosave(*autosave_enabled);
        }

        ui.label(
            egui::RichText::new("Drag a region to move it, drag a corner to resize")
                .italics()
                .weak(),
        );
    });

    action
}
