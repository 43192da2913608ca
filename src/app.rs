// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app is a thin shell: it turns menu clicks, panel edits and raw pointer
//! input into calls on the `EditorSession`, and keeps the canvas texture in
//! step with the session's preview bitmap.

use crate::config::AppConfig;
use crate::error::LoadError;
use crate::interaction::{CursorHint, Handle};
use crate::io::media::{self, LoadedImage};
use crate::render::fonts::FontProvider;
use crate::session::EditorSession;
use crate::ui::{canvas, properties, toolbar};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// How often the UI wakes to drive the autosave timer while idle.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Main application state.
pub struct WallpaperEditorApp {
    session: EditorSession,

    /// Preview bitmap uploaded to the GPU
    canvas_texture: Option<egui::TextureHandle>,

    /// Set whenever the preview needs re-rendering
    canvas_dirty: bool,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedImage, LoadError>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last result shown in the status bar
    status: String,
}

impl WallpaperEditorApp {
    pub fn new(config: AppConfig, fonts: FontProvider) -> Self {
        Self {
            session: EditorSession::new(config, fonts, Instant::now()),
            canvas_texture: None,
            canvas_dirty: true,
            image_loader: None,
            loading_message: None,
            status: "Open a wallpaper to begin".to_string(),
        }
    }

    /// Decode an image on a worker thread; `poll_image_loader` installs it.
    fn load_image_file(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some(format!("Loading {}...", path.display()));

        std::thread::spawn(move || {
            let _ = sender.send(media::load_image(&path));
        });
    }

    fn poll_image_loader(&mut self) {
        let Some(ref receiver) = self.image_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.image_loader = None;
        self.loading_message = None;

        match result {
            Ok(image) => {
                self.status = format!(
                    "Loaded {} ({}x{})",
                    image.path.display(),
                    image.width(),
                    image.height()
                );
                self.session.install_document(image);
                self.canvas_dirty = true;
            }
            Err(e) => self.report_error("Could not load image", e),
        }
    }

    fn report_error(&mut self, what: &str, error: impl Display) {
        log::error!("{}: {}", what, error);
        self.status = format!("{}: {}", what, error);
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(what)
            .set_description(error.to_string())
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn confirm(title: &str, question: &str) -> bool {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title(title)
            .set_description(question)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            == rfd::MessageDialogResult::Yes
    }

    fn open_image_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &media::IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.load_image_file(path);
        }
    }

    fn save_project_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Project", &["json"])
            .set_file_name("project.json")
            .save_file()
        else {
            return;
        };
        match self.session.save_project(&path) {
            Ok(()) => self.status = format!("Project saved to {}", path.display()),
            Err(e) => self.report_error("Could not save project", e),
        }
    }

    fn load_project_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Project", &["json"])
            .pick_file()
        else {
            return;
        };
        match self.session.load_project(&path) {
            Ok(()) => {
                self.status = format!("Project loaded from {}", path.display());
                self.canvas_dirty = true;
            }
            Err(e) => self.report_error("Could not load project", e),
        }
    }

    fn export_image(&mut self) {
        match self.session.export_image() {
            Ok(path) => self.status = format!("Wallpaper saved to {}", path.display()),
            Err(e) => self.report_error("Could not export wallpaper", e),
        }
    }

    fn add_region(&mut self) {
        match self.session.add_region() {
            Ok(_) => self.canvas_dirty = true,
            Err(e) => self.report_error("Could not add region", e),
        }
    }

    fn generate_template(&mut self) {
        let has_regions = self
            .session
            .document()
            .is_some_and(|doc| !doc.regions().is_empty());
        if has_regions && !Self::confirm("Generate template", "Replace all regions with the template?") {
            return;
        }
        match self.session.generate_template() {
            Ok(()) => self.canvas_dirty = true,
            Err(e) => self.report_error("Could not generate template", e),
        }
    }

    fn delete_selected(&mut self) {
        match self.session.delete_selected() {
            Ok(()) => self.canvas_dirty = true,
            Err(e) => log::warn!("Delete ignored: {}", e),
        }
    }

    fn clear_regions(&mut self) {
        if !Self::confirm("Clear regions", "Delete every region?") {
            return;
        }
        match self.session.clear_regions() {
            Ok(()) => self.canvas_dirty = true,
            Err(e) => log::warn!("Clear ignored: {}", e),
        }
    }

    fn apply_canvas(&mut self, ctx: &egui::Context, output: canvas::CanvasOutput) {
        if self.session.resize_viewport(output.viewport) {
            self.canvas_dirty = true;
        }

        let hint = match output.action {
            canvas::CanvasAction::PointerDown(p) => {
                self.session.pointer_down(p);
                self.canvas_dirty = true;
                self.session.hover(p)
            }
            canvas::CanvasAction::PointerMove(p) => {
                self.canvas_dirty = true;
                self.session.pointer_move(p)
            }
            canvas::CanvasAction::PointerUp(p) => {
                let outcome = self.session.pointer_up();
                if outcome.geometry_changed {
                    log::debug!("Region geometry changed");
                }
                self.canvas_dirty = true;
                self.session.hover(p)
            }
            canvas::CanvasAction::Hover(p) => self.session.hover(p),
            canvas::CanvasAction::None => return,
        };
        ctx.set_cursor_icon(cursor_icon(hint));
    }

    fn refresh_canvas(&mut self, ctx: &egui::Context) {
        if !self.canvas_dirty {
            return;
        }
        self.canvas_dirty = false;

        let Some(preview) = self.session.render_preview() else {
            self.canvas_texture = None;
            return;
        };
        let size = [preview.width() as usize, preview.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, preview.as_raw());
        match self.canvas_texture {
            Some(ref mut texture) => texture.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.canvas_texture =
                    Some(ctx.load_texture("canvas", color_image, egui::TextureOptions::NEAREST));
            }
        }
    }

    fn status_line(&self) -> String {
        let Some(doc) = self.session.document() else {
            return self.status.clone();
        };
        let canvas = doc.canvas_size();
        let mut line = format!(
            "{}  |  {} regions  |  {}x{} @ {:.0}%",
            self.status,
            doc.regions().len(),
            canvas.width,
            canvas.height,
            doc.transform().scale() * 100.0
        );
        if doc.is_modified() {
            line.push_str("  |  modified");
        }
        if let Some(deadline) = self.session.autosave().deadline() {
            let secs = deadline.saturating_duration_since(Instant::now()).as_secs();
            line.push_str(&format!("  |  autosave in {}s", secs));
        }
        line
    }
}

fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Crosshair => egui::CursorIcon::Crosshair,
        CursorHint::Move => egui::CursorIcon::Move,
        CursorHint::Resize(Handle::NorthWest | Handle::SouthEast) => egui::CursorIcon::ResizeNwSe,
        CursorHint::Resize(Handle::NorthEast | Handle::SouthWest) => egui::CursorIcon::ResizeNeSw,
    }
}

impl eframe::App for WallpaperEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_image_loader();
        self.session.tick(Instant::now());

        if self.loading_message.is_some() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(TICK_INTERVAL);
        }

        let has_document = self.session.document().is_some();
        let has_selection = self
            .session
            .document()
            .is_some_and(|doc| doc.selected().is_some());

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Wallpaper...").clicked() {
                        ui.close_menu();
                        self.open_image_dialog();
                    }
                    if ui.button("Load Project...").clicked() {
                        ui.close_menu();
                        self.load_project_dialog();
                    }
                    if ui
                        .add_enabled(has_document, egui::Button::new("Save Project..."))
                        .clicked()
                    {
                        ui.close_menu();
                        self.save_project_dialog();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(has_document, egui::Button::new("Export Wallpaper"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.export_image();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(has_document, egui::Button::new("Add Region"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.add_region();
                    }
                    if ui
                        .add_enabled(has_document, egui::Button::new("Generate Template"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.generate_template();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete Selected (Del)"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.delete_selected();
                    }
                    if ui
                        .add_enabled(has_document, egui::Button::new("Clear All"))
                        .clicked()
                    {
                        ui.close_menu();
                        self.clear_regions();
                    }
                });
            });
        });

        // Toolbar
        let mut autosave_enabled = self.session.autosave().is_enabled();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(ui, has_document, has_selection, &mut autosave_enabled)
            })
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::OpenImage => self.open_image_dialog(),
            toolbar::ToolbarAction::AddRegion => self.add_region(),
            toolbar::ToolbarAction::GenerateTemplate => self.generate_template(),
            toolbar::ToolbarAction::DeleteSelected => self.delete_selected(),
            toolbar::ToolbarAction::ClearRegions => self.clear_regions(),
            toolbar::ToolbarAction::Export => self.export_image(),
            toolbar::ToolbarAction::SetAutosave(enabled) => {
                self.session.set_autosave_enabled(enabled, Instant::now());
            }
            toolbar::ToolbarAction::None => {}
        }

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| properties::show(ui, self.session.document()))
            .inner;

        match properties_action {
            properties::PropertiesAction::Select(index) => {
                self.session.select(Some(index));
                self.canvas_dirty = true;
            }
            properties::PropertiesAction::Update(attribute) => {
                match self.session.update_selected(attribute) {
                    Ok(()) => self.canvas_dirty = true,
                    Err(e) => log::warn!("Edit ignored: {}", e),
                }
            }
            properties::PropertiesAction::None => {}
        }

        // Delete key removes the selected region unless a text field has focus
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.delete_selected();
        }

        // Status bar
        let status = self.status_line();
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(status);
        });

        // Main canvas (center)
        let canvas_output = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    None
                } else {
                    Some(canvas::show(ui, self.canvas_texture.as_ref()))
                }
            })
            .inner;

        if let Some(output) = canvas_output {
            self.apply_canvas(ctx, output);
        }
        self.refresh_canvas(ctx);
    }
}
