// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for regions and the open document.

pub mod document;
pub mod region;
