// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! egui panels for the editor window.

pub mod canvas;
pub mod properties;
pub mod toolbar;
