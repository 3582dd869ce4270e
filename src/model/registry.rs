// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::chart::SseqChart;
use super::ids::ChartId;

/// The live charts of one embedding process, keyed by chart uuid.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<ChartId, SseqChart>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `chart`, returning the chart it replaced (if any).
    pub fn insert(&mut self, chart: SseqChart) -> Option<SseqChart> {
        self.charts.insert(chart.uuid().clone(), chart)
    }

    pub fn get(&self, id: &str) -> Option<&SseqChart> {
        self.charts.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SseqChart> {
        self.charts.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<SseqChart> {
        self.charts.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.charts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChartId, &SseqChart)> {
        self.charts.iter()
    }
}
