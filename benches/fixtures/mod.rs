// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sseq_chart::model::{
    ChartId, ClassFields, ClassId, EdgeFields, Page, PageProperty, SseqChart,
};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("sseq_chart_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    /// 20x20 grid, one class per degree.
    ChartSmall,
    /// 60x40 grid, three classes per degree.
    ChartMedium,
}

impl Case {
    fn dims(self) -> (i32, i32, usize) {
        match self {
            Self::ChartSmall => (20, 20, 1),
            Self::ChartMedium => (60, 40, 3),
        }
    }
}

fn class_id(x: i32, y: i32, k: usize) -> ClassId {
    ClassId::new(format!("c-{x}-{y}-{k}")).expect("class id")
}

/// A grid chart: structlines from every class to the first class one step up and right,
/// differentials of length 2 from every third degree, and a page-dependent name on each class.
pub fn chart(case: Case) -> SseqChart {
    let (width, height, per_degree) = case.dims();
    let mut chart = SseqChart::with_uuid(ChartId::new("bench").expect("id"), "bench", 2)
        .expect("chart");

    for x in 0..width {
        for y in 0..height {
            for k in 0..per_degree {
                let mut name = PageProperty::constant(format!("x_{{{x},{y}}}"));
                name.set_range(Page::Finite(2 + (x % 5)), Page::Infinity, String::new())
                    .expect("name range");
                let fields = ClassFields {
                    uuid: Some(class_id(x, y, k)),
                    name: Some(name),
                    ..ClassFields::at([x, y])
                };
                chart.add_class(fields).expect("class");
            }
        }
    }

    for x in 0..width - 1 {
        for y in 0..height - 1 {
            for k in 0..per_degree {
                chart
                    .add_structline(EdgeFields::between(&class_id(x, y, k), &class_id(x + 1, y + 1, 0)))
                    .expect("structline");
            }
        }
    }

    for x in 1..width {
        for y in (0..height - 2).step_by(3) {
            chart
                .add_differential(
                    EdgeFields::between(&class_id(x, y, 0), &class_id(x - 1, y + 2, 0)).on_page(2),
                )
                .expect("differential");
        }
    }

    chart.drain_events();
    chart
}

/// A property with `n` breakpoints alternating between two values.
pub fn stepped_property(n: i32) -> PageProperty<i64> {
    let mut property = PageProperty::constant(0);
    for page in 0..n {
        property.set_point(Page::Finite(page * 2), i64::from(page % 7));
    }
    property
}

pub fn checksum_chart(chart: &SseqChart) -> u64 {
    let mut acc = 0u64;
    acc = acc.wrapping_mul(131).wrapping_add(chart.num_classes() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(chart.num_edges() as u64);
    for class in chart.classes() {
        acc = acc.wrapping_mul(131).wrapping_add(class.x() as u64);
        acc = acc.wrapping_mul(131).wrapping_add(class.idx().unwrap_or(0) as u64);
    }
    acc
}
