// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The chart aggregate.
//!
//! An [`SseqChart`] owns every class and edge by id and keeps a degree index whose buckets list
//! class ids in `idx` order. Locally created entities and entities replayed from the remote
//! source go through the same commit path, so both end up with identical bookkeeping.

pub mod settings;


use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use super::class::{ChartClass, ClassFields, ConstructError};
use super::edge::{ChartEdge, EdgeFields, EdgeType};
use super::ids::{ChartId, ClassId, EdgeId};
use super::keyed_index::{Degree, KeyedIndex};
use super::page::Page;
pub use settings::{ChartSettings, ChartSettingsPatch, MIN_GRADINGS};

pub const CHART_TAG: &str = "SseqChart";

/// Change notifications for the rendering layer, drained with [`SseqChart::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartEvent {
    ClassAdded(ClassId),
    EdgeAdded { id: EdgeId, edge_type: EdgeType },
    ClassRemoved(ClassId),
    EdgeRemoved(EdgeId),
    Update,
}

#[derive(Debug, Clone)]
pub struct SseqChart {
    uuid: ChartId,
    settings: ChartSettings,
    classes: IndexMap<ClassId, ChartClass>,
    edges: IndexMap<EdgeId, ChartEdge>,
    classes_by_degree: KeyedIndex<Degree, Vec<ClassId>>,
    events: Vec<ChartEvent>,
    refresh_blocked: bool,
}

impl SseqChart {
    pub fn new(name: impl Into<String>, num_gradings: usize) -> Result<Self, ChartError> {
        Self::with_uuid(ChartId::generate(), name, num_gradings)
    }

    pub fn with_uuid(
        uuid: ChartId,
        name: impl Into<String>,
        num_gradings: usize,
    ) -> Result<Self, ChartError> {
        if num_gradings < MIN_GRADINGS {
            return Err(ChartError::TooFewGradings(num_gradings));
        }
        Ok(Self {
            uuid,
            settings: ChartSettings::new(name, num_gradings),
            classes: IndexMap::new(),
            edges: IndexMap::new(),
            classes_by_degree: KeyedIndex::new(),
            events: Vec::new(),
            refresh_blocked: false,
        })
    }

    pub fn uuid(&self) -> &ChartId {
        &self.uuid
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn num_gradings(&self) -> usize {
        self.settings.num_gradings
    }

    pub fn classes(&self) -> impl Iterator<Item = &ChartClass> {
        self.classes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &ChartEdge> {
        self.edges.values()
    }

    pub fn class(&self, id: &str) -> Option<&ChartClass> {
        self.classes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&ChartEdge> {
        self.edges.get(id)
    }

    /// Mutable access for local style edits through the public style fields. Identity, degree
    /// and `idx` have no public setter; [`SseqChart::update_class`] moves a class.
    pub fn class_mut(&mut self, id: &str) -> Option<&mut ChartClass> {
        self.classes.get_mut(id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut ChartEdge> {
        self.edges.get_mut(id)
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn add_class(&mut self, fields: ClassFields) -> Result<ClassId, ChartError> {
        let class = ChartClass::from_fields(fields)?;
        let id = self.commit_class(class)?;
        self.events.push(ChartEvent::ClassAdded(id.clone()));
        self.notify_update();
        Ok(id)
    }

    pub fn add_structline(&mut self, fields: EdgeFields) -> Result<EdgeId, ChartError> {
        self.add_edge(EdgeType::Structline, fields)
    }

    pub fn add_differential(&mut self, fields: EdgeFields) -> Result<EdgeId, ChartError> {
        self.add_edge(EdgeType::Differential, fields)
    }

    pub fn add_extension(&mut self, fields: EdgeFields) -> Result<EdgeId, ChartError> {
        self.add_edge(EdgeType::Extension, fields)
    }

    fn add_edge(&mut self, edge_type: EdgeType, fields: EdgeFields) -> Result<EdgeId, ChartError> {
        let edge = ChartEdge::from_fields(edge_type, fields)?;
        let id = self.commit_edge(edge)?;
        self.events.push(ChartEvent::EdgeAdded {
            id: id.clone(),
            edge_type,
        });
        self.notify_update();
        Ok(id)
    }

    /// Registers a constructed class: checks its degree, slots it into the degree bucket at its
    /// `idx` (appending when it has none) and projects its position.
    pub fn commit_class(&mut self, mut class: ChartClass) -> Result<ClassId, ChartError> {
        if class.degree().len() != self.settings.num_gradings {
            return Err(ChartError::DegreeLength {
                expected: self.settings.num_gradings,
                found: class.degree().len(),
            });
        }
        let id = class.uuid().clone();
        if self.classes.contains_key(&id) || self.edges.contains_key(id.as_str()) {
            return Err(ChartError::DuplicateId(id.into_string()));
        }

        let degree = Degree::from_slice(class.degree());
        let bucket = self
            .classes_by_degree
            .get_or_insert_with(degree.clone(), Vec::new);
        let position = class.idx().unwrap_or(bucket.len()).min(bucket.len());
        bucket.insert(position, id.clone());

        class.project(&self.settings.x_projection, &self.settings.y_projection);
        debug!(class = %id, degree = ?class.degree(), idx = position, "commit class");
        self.classes.insert(id.clone(), class);
        self.renumber(&degree);
        Ok(id)
    }

    /// Registers a constructed edge. Both endpoints must already be committed; on a dangling
    /// reference nothing is registered.
    pub fn commit_edge(&mut self, edge: ChartEdge) -> Result<EdgeId, ChartError> {
        let id = edge.uuid().clone();
        if self.edges.contains_key(&id) || self.classes.contains_key(id.as_str()) {
            return Err(ChartError::DuplicateId(id.into_string()));
        }
        for endpoint in [edge.source_uuid(), edge.target_uuid()] {
            if !self.classes.contains_key(endpoint) {
                return Err(ChartError::DanglingEdge {
                    edge: id,
                    missing: endpoint.clone(),
                });
            }
        }
        for endpoint in [edge.source_uuid(), edge.target_uuid()] {
            if let Some(class) = self.classes.get_mut(endpoint) {
                class.attach_edge(id.clone());
            }
        }
        debug!(
            edge = %id,
            edge_type = %edge.edge_type(),
            source = %edge.source_uuid(),
            target = %edge.target_uuid(),
            "commit edge"
        );
        self.edges.insert(id.clone(), edge);
        Ok(id)
    }

    /// Classes at `degree`, in `idx` order.
    pub fn classes_in_degree(&self, degree: &[i32]) -> Result<Vec<&ChartClass>, ChartError> {
        self.check_degree(degree)?;
        Ok(self
            .classes_by_degree
            .get(degree)
            .map(|bucket| bucket.iter().filter_map(|id| self.classes.get(id)).collect())
            .unwrap_or_default())
    }

    pub fn class_by_index(&self, degree: &[i32], idx: usize) -> Result<&ChartClass, ChartError> {
        let classes = self.classes_in_degree(degree)?;
        let len = classes.len();
        classes
            .get(idx)
            .copied()
            .ok_or_else(|| ChartError::IndexOutOfRange {
                degree: degree.to_vec(),
                idx,
                len,
            })
    }

    fn check_degree(&self, degree: &[i32]) -> Result<(), ChartError> {
        if degree.len() != self.settings.num_gradings {
            return Err(ChartError::DegreeLength {
                expected: self.settings.num_gradings,
                found: degree.len(),
            });
        }
        Ok(())
    }

    pub fn update_class(&mut self, id: &str, fields: ClassFields) -> Result<(), ChartError> {
        let class = self
            .classes
            .get_mut(id)
            .ok_or_else(|| ChartError::UnknownClass(id.to_owned()))?;
        if class.update(fields)? {
            let id = class.uuid().clone();
            let degree = Degree::from_slice(class.degree());
            let target = class.idx().unwrap_or(0);
            if let Some(bucket) = self.classes_by_degree.get_mut(&degree) {
                bucket.retain(|other| *other != id);
                let position = target.min(bucket.len());
                bucket.insert(position, id);
            }
            self.renumber(&degree);
        }
        self.notify_update();
        Ok(())
    }

    pub fn update_edge(&mut self, id: &str, fields: EdgeFields) -> Result<(), ChartError> {
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| ChartError::UnknownEdge(id.to_owned()))?;
        edge.update(fields)?;
        self.notify_update();
        Ok(())
    }

    /// Removes a class together with every edge incident to it.
    pub fn delete_class(&mut self, id: &str) -> Result<ChartClass, ChartError> {
        let class = self
            .classes
            .shift_remove(id)
            .ok_or_else(|| ChartError::UnknownClass(id.to_owned()))?;
        for edge_id in class.edges() {
            if let Some(edge) = self.edges.shift_remove(edge_id) {
                for endpoint in [edge.source_uuid(), edge.target_uuid()] {
                    if let Some(other) = self.classes.get_mut(endpoint) {
                        other.detach_edge(edge_id);
                    }
                }
                self.events.push(ChartEvent::EdgeRemoved(edge_id.clone()));
            }
        }

        let degree = Degree::from_slice(class.degree());
        let now_empty = match self.classes_by_degree.get_mut(&degree) {
            Some(bucket) => {
                bucket.retain(|other| other != class.uuid());
                bucket.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.classes_by_degree.delete(&degree);
        } else {
            self.renumber(&degree);
        }

        debug!(class = %class.uuid(), "delete class");
        self.events.push(ChartEvent::ClassRemoved(class.uuid().clone()));
        self.notify_update();
        Ok(class)
    }

    pub fn delete_edge(&mut self, id: &str) -> Result<ChartEdge, ChartError> {
        let edge = self
            .edges
            .shift_remove(id)
            .ok_or_else(|| ChartError::UnknownEdge(id.to_owned()))?;
        for endpoint in [edge.source_uuid(), edge.target_uuid()] {
            if let Some(class) = self.classes.get_mut(endpoint) {
                class.detach_edge(edge.uuid());
            }
        }
        debug!(edge = %edge.uuid(), "delete edge");
        self.events.push(ChartEvent::EdgeRemoved(edge.uuid().clone()));
        self.notify_update();
        Ok(edge)
    }

    /// Applies a chart-wide settings patch. Projection changes move every class.
    pub fn update_settings(&mut self, patch: ChartSettingsPatch) -> Result<(), ChartError> {
        let num_gradings = self.settings.num_gradings;
        if patch.num_gradings.is_some_and(|n| n != num_gradings) {
            return Err(ChartError::ImmutableSetting("num_gradings"));
        }
        for (field, projection) in [
            ("x_projection", &patch.x_projection),
            ("y_projection", &patch.y_projection),
        ] {
            if let Some(projection) = projection {
                if projection.len() != num_gradings {
                    return Err(ChartError::ProjectionLength {
                        field,
                        expected: num_gradings,
                        found: projection.len(),
                    });
                }
            }
        }

        let reproject = patch.touches_projection();
        let settings = &mut self.settings;
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    settings.$field = value;
                })*
            };
        }
        take!(
            name,
            x_projection,
            y_projection,
            page_list,
            initial_x_range,
            initial_y_range,
            x_range,
            y_range,
            offset_size,
        );

        if reproject {
            for class in self.classes.values_mut() {
                class.project(&self.settings.x_projection, &self.settings.y_projection);
            }
        }
        self.notify_update();
        Ok(())
    }

    /// Drops every class and edge. Settings are kept.
    pub fn clear(&mut self) {
        self.classes.clear();
        self.edges.clear();
        self.classes_by_degree.clear();
        debug!(chart = %self.uuid, "clear chart");
        self.notify_update();
    }

    /// While blocked, `Update` notifications are suppressed; releasing the block emits one.
    pub fn block_refresh(&mut self, block: bool) {
        let was_blocked = std::mem::replace(&mut self.refresh_blocked, block);
        if was_blocked && !block {
            self.events.push(ChartEvent::Update);
        }
    }

    pub fn is_refresh_blocked(&self) -> bool {
        self.refresh_blocked
    }

    pub fn notify_update(&mut self) {
        if !self.refresh_blocked && self.events.last() != Some(&ChartEvent::Update) {
            self.events.push(ChartEvent::Update);
        }
    }

    pub fn drain_events(&mut self) -> Vec<ChartEvent> {
        std::mem::take(&mut self.events)
    }

    /// Horizontal screen offset of `class` on `page`: classes sharing a degree are spread
    /// symmetrically around the degree's position, then nudged.
    pub fn x_offset(&self, class: &ChartClass, page: Page) -> f64 {
        let count = self
            .classes_by_degree
            .get(class.degree())
            .map_or(1, Vec::len);
        let idx = class.idx().unwrap_or(0) as f64;
        let spread = (idx - (count as f64 - 1.0) / 2.0) * self.settings.offset_size;
        spread + *class.x_nudge.value_on_page(page)
    }

    fn renumber(&mut self, degree: &[i32]) {
        if let Some(bucket) = self.classes_by_degree.get(degree) {
            for (idx, id) in bucket.iter().enumerate() {
                if let Some(class) = self.classes.get_mut(id) {
                    class.set_idx(idx);
                }
            }
        }
    }
}

impl Serialize for SseqChart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(tag = "type", rename = "SseqChart")]
        struct Repr<'a> {
            uuid: &'a ChartId,
            #[serde(flatten)]
            settings: &'a ChartSettings,
            classes: Vec<&'a ChartClass>,
            edges: Vec<&'a ChartEdge>,
        }

        Repr {
            uuid: &self.uuid,
            settings: &self.settings,
            classes: self.classes.values().collect(),
            edges: self.edges.values().collect(),
        }
        .serialize(serializer)
    }
}

impl PartialEq for SseqChart {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.settings == other.settings
            && self.classes == other.classes
            && self.edges == other.edges
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    TooFewGradings(usize),
    DegreeLength {
        expected: usize,
        found: usize,
    },
    DuplicateId(String),
    DanglingEdge {
        edge: EdgeId,
        missing: ClassId,
    },
    UnknownClass(String),
    UnknownEdge(String),
    IndexOutOfRange {
        degree: Vec<i32>,
        idx: usize,
        len: usize,
    },
    ImmutableSetting(&'static str),
    ProjectionLength {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    Construct(ConstructError),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewGradings(n) => {
                write!(f, "a chart needs at least {MIN_GRADINGS} gradings, got {n}")
            }
            Self::DegreeLength { expected, found } => write!(
                f,
                "wrong number of gradings: degree has length {found} but num_gradings is {expected}"
            ),
            Self::DuplicateId(id) => write!(f, "an object with uuid {id} already exists"),
            Self::DanglingEdge { edge, missing } => {
                write!(f, "edge {edge} refers to unknown class {missing}")
            }
            Self::UnknownClass(id) => write!(f, "no class with uuid {id}"),
            Self::UnknownEdge(id) => write!(f, "no edge with uuid {id}"),
            Self::IndexOutOfRange { degree, idx, len } => write!(
                f,
                "index {idx} requested but only {len} classes exist in degree {degree:?}"
            ),
            Self::ImmutableSetting(field) => write!(f, "chart setting \"{field}\" cannot change"),
            Self::ProjectionLength {
                field,
                expected,
                found,
            } => write!(f, "{field} has length {found}, expected {expected}"),
            Self::Construct(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ChartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Construct(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConstructError> for ChartError {
    fn from(err: ConstructError) -> Self {
        Self::Construct(err)
    }
}
