// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use crate::model::page::{Page, PageRange};

pub const MIN_GRADINGS: usize = 2;
pub const DEFAULT_OFFSET_SIZE: f64 = 45.0;

/// Chart-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSettings {
    pub name: String,
    pub num_gradings: usize,
    pub x_projection: Vec<i32>,
    pub y_projection: Vec<i32>,
    pub page_list: Vec<PageRange>,
    pub initial_x_range: [i32; 2],
    pub initial_y_range: [i32; 2],
    pub x_range: [i32; 2],
    pub y_range: [i32; 2],
    pub offset_size: f64,
}

impl ChartSettings {
    pub fn new(name: impl Into<String>, num_gradings: usize) -> Self {
        let mut x_projection = vec![0; num_gradings];
        let mut y_projection = vec![0; num_gradings];
        if num_gradings >= MIN_GRADINGS {
            x_projection[0] = 1;
            y_projection[1] = 1;
        }
        Self {
            name: name.into(),
            num_gradings,
            x_projection,
            y_projection,
            page_list: vec![
                PageRange::new(Page::Finite(2), Page::Infinity),
                PageRange::single(Page::Infinity),
            ],
            initial_x_range: [0, 10],
            initial_y_range: [0, 10],
            x_range: [0, 10],
            y_range: [0, 10],
            offset_size: DEFAULT_OFFSET_SIZE,
        }
    }
}

/// Patch for [`ChartSettings`], as carried by `target_fields` of a chart update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChartSettingsPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub num_gradings: Option<usize>,
    #[serde(default)]
    pub x_projection: Option<Vec<i32>>,
    #[serde(default)]
    pub y_projection: Option<Vec<i32>>,
    #[serde(default)]
    pub page_list: Option<Vec<PageRange>>,
    #[serde(default)]
    pub initial_x_range: Option<[i32; 2]>,
    #[serde(default)]
    pub initial_y_range: Option<[i32; 2]>,
    #[serde(default)]
    pub x_range: Option<[i32; 2]>,
    #[serde(default)]
    pub y_range: Option<[i32; 2]>,
    #[serde(default)]
    pub offset_size: Option<f64>,
}

impl ChartSettingsPatch {
    pub fn touches_projection(&self) -> bool {
        self.x_projection.is_some() || self.y_projection.is_some()
    }
}
