// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use serde::Serialize;
use tracing::trace;

use crate::model::{
    ChartClass, ChartEdge, ClassId, EdgeId, EdgeStyle, Page, PageRange, SseqChart,
};

/// Inclusive box in projected chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl BoundingBox {
    pub fn new(x: [i64; 2], y: [i64; 2]) -> Self {
        Self {
            x_min: x[0],
            x_max: x[1],
            y_min: y[0],
            y_max: y[1],
        }
    }

    /// The chart's current `x_range`/`y_range`.
    pub fn of_chart(chart: &SseqChart) -> Self {
        let settings = chart.settings();
        Self::new(
            settings.x_range.map(i64::from),
            settings.y_range.map(i64::from),
        )
    }

    pub fn contains(&self, class: &ChartClass) -> bool {
        class.in_range(self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElementsToDraw<'a> {
    pub classes: Vec<&'a ChartClass>,
    pub edges: Vec<&'a ChartEdge>,
}

/// Selects what the rendering layer should draw on `pages` inside `bbox`.
///
/// Classes are drawn when they lie in the box and are visible on the first page of the range.
/// Edges are drawn when their page predicate holds, both endpoints are visible, and at least one
/// endpoint lies in the box. An endpoint of a drawn edge is always drawn, even outside the box.
pub fn elements_to_draw(
    chart: &SseqChart,
    pages: impl Into<PageRange>,
    bbox: BoundingBox,
) -> ElementsToDraw<'_> {
    let pages = pages.into();
    let page = pages.start;

    let mut displayed: HashSet<&ClassId> = HashSet::new();
    let mut classes = Vec::new();
    for class in chart.classes() {
        if bbox.contains(class) && class.visible_on(page) {
            displayed.insert(class.uuid());
            classes.push(class);
        }
    }

    let mut edges = Vec::new();
    for edge in chart.edges() {
        if !edge.draw_on_page(pages) {
            continue;
        }
        let (Some(source), Some(target)) = (
            chart.class(edge.source_uuid().as_str()),
            chart.class(edge.target_uuid().as_str()),
        ) else {
            continue;
        };
        if !(source.visible_on(page) && target.visible_on(page)) {
            continue;
        }
        if !(bbox.contains(source) || bbox.contains(target)) {
            continue;
        }
        edges.push(edge);
        for endpoint in [source, target] {
            if displayed.insert(endpoint.uuid()) {
                classes.push(endpoint);
            }
        }
    }

    trace!(
        page = %page,
        classes = classes.len(),
        edges = edges.len(),
        "elements to draw"
    );
    ElementsToDraw { classes, edges }
}

impl SseqChart {
    pub fn get_elements_to_draw(
        &self,
        pages: impl Into<PageRange>,
        bbox: BoundingBox,
    ) -> ElementsToDraw<'_> {
        elements_to_draw(self, pages, bbox)
    }
}

/// A class as handed to a renderer: position, offsets and hover text resolved for one page.
#[derive(Debug, Clone, Serialize)]
pub struct DrawnClass<'a> {
    pub uuid: &'a ClassId,
    pub x: i64,
    pub y: i64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub tooltip: String,
    pub class: &'a ChartClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawnEdge<'a> {
    pub uuid: &'a EdgeId,
    #[serde(rename = "type")]
    pub edge_type: &'static str,
    pub source_uuid: &'a ClassId,
    pub target_uuid: &'a ClassId,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawSnapshot<'a> {
    pub page: Page,
    pub classes: Vec<DrawnClass<'a>>,
    pub edges: Vec<DrawnEdge<'a>>,
}

impl<'a> DrawSnapshot<'a> {
    pub fn resolve(chart: &'a SseqChart, page: Page, elements: &ElementsToDraw<'a>) -> Self {
        let classes = elements
            .classes
            .iter()
            .map(|&class| DrawnClass {
                uuid: class.uuid(),
                x: class.x(),
                y: class.y(),
                x_offset: chart.x_offset(class, page),
                y_offset: class.y_offset(page),
                tooltip: class.tooltip(page),
                class,
            })
            .collect();
        let edges = elements
            .edges
            .iter()
            .map(|&edge| DrawnEdge {
                uuid: edge.uuid(),
                edge_type: edge.edge_type().tag(),
                source_uuid: edge.source_uuid(),
                target_uuid: edge.target_uuid(),
                style: edge.edge_style(page),
            })
            .collect();
        Self {
            page,
            classes,
            edges,
        }
    }
}
