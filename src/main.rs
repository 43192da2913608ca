// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wallpaper Regions
//!
//! A desktop editor for laying out labeled, semi-transparent rectangles over
//! a wallpaper image and exporting the flattened result.

mod app;
mod config;
mod error;
mod interaction;
mod io;
mod models;
mod render;
mod session;
mod ui;
mod util;

use anyhow::Result;
use app::WallpaperEditorApp;
use config::AppConfig;
use render::fonts::FontProvider;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Ignoring config: {}", e);
        AppConfig::default()
    });
    let fonts = FontProvider::new(&config.fonts);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Wallpaper Regions"),
        ..Default::default()
    };

    eframe::run_native(
        "Wallpaper Regions",
        options,
        Box::new(move |_cc| Ok(Box::new(WallpaperEditorApp::new(config, fonts)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
