// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rasterizing regions and labels onto images.

pub mod compositor;
pub mod fonts;
