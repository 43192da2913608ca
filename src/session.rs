// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The editing session.
//!
//! `EditorSession` is the single owner of editor state: the open document,
//! the pointer state machine, the autosave timer, the label fonts and the
//! config. Every UI handler goes through it.

use crate::config::AppConfig;
use crate::error::{EditError, LoadError, SaveError};
use crate::interaction::{CursorHint, GestureOutcome, Interaction};
use crate::io::autosave::Autosave;
use crate::io::media::{self, LoadedImage};
use crate::io::serialization::{self, AutosaveData, ProjectData};
use crate::models::document::Document;
use crate::models::region::RegionAttribute;
use crate::render::compositor;
use crate::render::fonts::FontProvider;
use crate::util::geometry::{Point, Size};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct EditorSession {
    config: AppConfig,
    document: Option<Document>,
    interaction: Interaction,
    autosave: Autosave,
    fonts: FontProvider,
    viewport: Size,
}

impl EditorSession {
    pub fn new(config: AppConfig, fonts: FontProvider, now: Instant) -> Self {
        let autosave = Autosave::new(&config.autosave, now);
        Self {
            viewport: config.default_viewport,
            config,
            document: None,
            interaction: Interaction::new(),
            autosave,
            fonts,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn autosave(&self) -> &Autosave {
        &self.autosave
    }

    /// Replace the current document with a freshly loaded image.
    ///
    /// Any gesture in progress is dropped and autosave forgets the old
    /// document's file.
    pub fn install_document(&mut self, image: LoadedImage) {
        log::info!(
            "Loaded image: {} ({}x{})",
            image.path.display(),
            image.width(),
            image.height()
        );
        self.interaction.reset();
        self.autosave.forget_document();
        self.document = Some(Document::new(
            image.path,
            image.pixels,
            self.viewport,
            self.config.default_viewport,
        ));
    }

    /// Load and install an image synchronously. On failure the current
    /// document is kept.
    pub fn open_image(&mut self, path: &Path) -> Result<(), LoadError> {
        let image = media::load_image(path)?;
        self.install_document(image);
        Ok(())
    }

    /// Track the canvas area; returns `true` when the canvas was rescaled.
    pub fn resize_viewport(&mut self, viewport: Size) -> bool {
        // Rescaling mid-gesture would invalidate the frozen anchor; the next
        // call after release applies it.
        if viewport == self.viewport || self.interaction.is_active() {
            return false;
        }
        self.viewport = viewport;
        self.document
            .as_mut()
            .is_some_and(|doc| doc.resize_viewport(viewport))
    }

    fn document_mut(&mut self) -> Result<&mut Document, EditError> {
        self.document.as_mut().ok_or(EditError::NoDocument)
    }

    pub fn add_region(&mut self) -> Result<usize, EditError> {
        let index = self.document_mut()?.add_region();
        log::info!("Added region {}", index + 1);
        Ok(index)
    }

    pub fn delete_selected(&mut self) -> Result<(), EditError> {
        let doc = self.document_mut()?;
        let Some(index) = doc.selected() else {
            return Ok(());
        };
        let removed = doc.remove(index)?;
        let remaining = doc.regions().len();
        self.interaction.reset();
        log::info!("Deleted region {:?}, total: {}", removed.name, remaining);
        Ok(())
    }

    pub fn clear_regions(&mut self) -> Result<(), EditError> {
        self.document_mut()?.clear();
        self.interaction.reset();
        log::info!("Cleared all regions");
        Ok(())
    }

    pub fn generate_template(&mut self) -> Result<(), EditError> {
        let doc = self.document_mut()?;
        doc.generate_template();
        let canvas = doc.canvas_size();
        self.interaction.reset();
        log::info!(
            "Generated template regions for {}x{} canvas",
            canvas.width,
            canvas.height
        );
        Ok(())
    }

    pub fn select(&mut self, index: Option<usize>) {
        if let Some(doc) = self.document.as_mut() {
            doc.select(index);
        }
    }

    /// Edit an attribute of the selected region.
    pub fn update_selected(&mut self, attribute: RegionAttribute) -> Result<(), EditError> {
        let doc = self.document_mut()?;
        let index = doc.selected().ok_or(EditError::NoSelection)?;
        doc.update_attribute(index, attribute)
    }

    pub fn pointer_down(&mut self, p: Point) {
        if let Some(doc) = self.document.as_mut() {
            self.interaction.pointer_down(doc, p);
        }
    }

    pub fn pointer_move(&mut self, p: Point) -> CursorHint {
        match self.document.as_mut() {
            Some(doc) => self.interaction.pointer_move(doc, p),
            None => CursorHint::Crosshair,
        }
    }

    /// Cursor for a pointer hovering with no button held.
    pub fn hover(&self, p: Point) -> CursorHint {
        match self.document.as_ref() {
            Some(doc) => self.interaction.hover(doc, p),
            None => CursorHint::Crosshair,
        }
    }

    pub fn pointer_up(&mut self) -> GestureOutcome {
        match self.document.as_mut() {
            Some(doc) => self.interaction.pointer_up(doc),
            None => {
                self.interaction.reset();
                GestureOutcome {
                    geometry_changed: false,
                }
            }
        }
    }

    /// The canvas bitmap for the current state.
    pub fn render_preview(&self) -> Option<RgbaImage> {
        self.document
            .as_ref()
            .map(|doc| compositor::render_preview(doc, &self.fonts))
    }

    /// Flatten the regions onto the native image and write it beside the
    /// source as `<stem>_edit<ext>`.
    pub fn export_image(&self) -> Result<PathBuf, SaveError> {
        let doc = self.document.as_ref().ok_or(SaveError::NoImage)?;
        if doc.regions().is_empty() {
            return Err(SaveError::NothingToSave("no regions to draw"));
        }
        let output = compositor::render_export(doc, &self.fonts);
        let path = media::export_path(doc.source_path());
        media::save_export(&output, &path, self.config.export.jpeg_quality)?;
        log::info!("Exported image to {}", path.display());
        Ok(path)
    }

    pub fn save_project(&mut self, path: &Path) -> Result<(), SaveError> {
        let doc = self.document.as_mut().ok_or(SaveError::NoImage)?;
        if doc.regions().is_empty() {
            return Err(SaveError::NothingToSave("no regions to save"));
        }
        let revision = doc.revision();
        let data = ProjectData::new(doc.regions().to_vec(), doc.source_path());
        serialization::export_json(&data, path)?;
        doc.mark_saved(revision);
        log::info!("Saved project to {}", path.display());
        Ok(())
    }

    /// Load a project file, opening its image first when it names a
    /// different one that exists.
    pub fn load_project(&mut self, path: &Path) -> Result<(), LoadError> {
        let project = serialization::import_json(path)?;
        let image_path = PathBuf::from(&project.image_path);
        let current = self.document.as_ref().map(|d| d.source_path().to_path_buf());

        let wants_image = !project.image_path.is_empty()
            && current.as_deref() != Some(image_path.as_path())
            && image_path.exists();
        if wants_image {
            self.open_image(&image_path)?;
        }

        let doc = self.document.as_mut().ok_or(LoadError::MissingImage)?;
        let count = project.regions.len();
        let out_of_bounds = doc.replace_regions(project.regions);
        self.interaction.reset();
        if out_of_bounds > 0 {
            log::debug!("{out_of_bounds} loaded region(s) are out of bounds; they will be re-clamped when grabbed");
        }
        log::info!("Loaded {} regions from {}", count, path.display());
        Ok(())
    }

    pub fn set_autosave_enabled(&mut self, enabled: bool, now: Instant) {
        self.autosave.set_enabled(enabled, now);
        log::info!("Autosave {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Drive the autosave timer. Failures are logged and retried next tick.
    pub fn tick(&mut self, now: Instant) {
        if let Some(outcome) = self.autosave.poll_finished() {
            match outcome.result {
                Ok(path) => {
                    if let Some(doc) = self.document.as_mut() {
                        doc.mark_saved(outcome.revision);
                    }
                    log::info!("Autosaved to {}", path.display());
                }
                Err(e) => log::warn!("Autosave failed: {}", e),
            }
        }

        if !self.autosave.is_due(now) || self.autosave.is_writing() {
            return;
        }
        let Some(doc) = self.document.as_ref() else {
            return;
        };
        if doc.is_modified() {
            let data = AutosaveData::new(doc.regions().to_vec(), doc.source_path());
            let revision = doc.revision();
            self.autosave.start_write(data, revision);
        }
    }
}
