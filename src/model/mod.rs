// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Charts contain classes (points at an integer degree) and edges between them; every visual
//! attribute is a page-indexed step function.

pub mod chart;
pub mod class;
pub mod edge;
pub mod ids;
pub mod keyed_index;
pub mod page;
pub mod page_property;
pub mod registry;
pub mod style;

pub use chart::{ChartError, ChartEvent, ChartSettings, ChartSettingsPatch, SseqChart, CHART_TAG};
pub use class::{ChartClass, ClassFields, ConstructError, CLASS_TAG};
pub use edge::{ChartEdge, EdgeFields, EdgeKind, EdgeStyle, EdgeType, StructlineStyle};
pub use ids::{ChartId, ClassId, EdgeId, Id, IdError};
pub use keyed_index::{CanonicalKey, Degree, KeyedIndex};
pub use page::{Page, PageRange, WIRE_INFINITY};
pub use page_property::{PageProperty, PagePropertyError, PAGE_PROPERTY_TAG};
pub use registry::ChartRegistry;
pub use style::{ArrowTip, Color, DashPattern, Shape};
