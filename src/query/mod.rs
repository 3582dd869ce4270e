// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over a chart.
//!
//! Queries provide the derived views (what to draw on a page, and how) that the rendering layer
//! consumes.

pub mod draw;

pub use draw::{elements_to_draw, BoundingBox, DrawSnapshot, DrawnClass, DrawnEdge, ElementsToDraw};
