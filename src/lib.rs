// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! sseq-chart: client-side model of a spectral sequence chart.
//!
//! - [`model`]: page-indexed properties, classes, edges and the chart aggregate.
//! - [`query`]: selection of what to draw for a page range and bounding box.
//! - [`protocol`]: tagged JSON revival and the create/update/delete message stream.
//! - [`history`]: the undoable command log sent to the computing backend.
//! - [`store`]: chart documents on disk.

pub mod history;
pub mod model;
pub mod protocol;
pub mod query;
pub mod store;
