// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{ClassId, EdgeId};
use super::keyed_index::Degree;
use super::page::Page;
use super::page_property::PageProperty;
use super::style::{empty_shape, Color, Shape};

pub const CLASS_TAG: &str = "ChartClass";

/// A point of the chart.
///
/// `uuid` and `degree` never change after construction. `idx` and the projected `x`/`y` are owned
/// by the chart that commits the class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct ChartClass {
    uuid: ClassId,
    degree: Degree,
    idx: Option<usize>,
    pub name: PageProperty<String>,
    pub max_page: Page,
    pub shape: PageProperty<Shape>,
    pub background_color: PageProperty<Color>,
    pub border_color: PageProperty<Color>,
    pub border_width: PageProperty<f64>,
    pub foreground_color: PageProperty<Color>,
    pub scale: PageProperty<f64>,
    pub visible: PageProperty<bool>,
    pub x_nudge: PageProperty<f64>,
    pub y_nudge: PageProperty<f64>,
    pub user_data: Map<String, Value>,
    #[serde(skip)]
    x: i64,
    #[serde(skip)]
    y: i64,
    #[serde(skip)]
    edges: BTreeSet<EdgeId>,
}

/// Partial field set for a class, as found in `create` targets and `update` patches.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassFields {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub uuid: Option<ClassId>,
    #[serde(default)]
    pub degree: Option<Degree>,
    #[serde(default)]
    pub idx: Option<usize>,
    #[serde(default)]
    pub name: Option<PageProperty<String>>,
    #[serde(default)]
    pub max_page: Option<Page>,
    #[serde(default)]
    pub shape: Option<PageProperty<Shape>>,
    #[serde(default)]
    pub background_color: Option<PageProperty<Color>>,
    #[serde(default)]
    pub border_color: Option<PageProperty<Color>>,
    #[serde(default)]
    pub border_width: Option<PageProperty<f64>>,
    #[serde(default)]
    pub foreground_color: Option<PageProperty<Color>>,
    #[serde(default)]
    pub scale: Option<PageProperty<f64>>,
    #[serde(default)]
    pub visible: Option<PageProperty<bool>>,
    #[serde(default)]
    pub x_nudge: Option<PageProperty<f64>>,
    #[serde(default)]
    pub y_nudge: Option<PageProperty<f64>>,
    #[serde(default)]
    pub user_data: Option<Map<String, Value>>,
}

impl ClassFields {
    pub fn at(degree: impl IntoIterator<Item = i32>) -> Self {
        Self {
            degree: Some(degree.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(PageProperty::constant(name.into()));
        self
    }
}

impl ChartClass {
    pub fn from_fields(fields: ClassFields) -> Result<Self, ConstructError> {
        check_tag(fields.kind.as_deref(), CLASS_TAG)?;
        let degree = fields
            .degree
            .ok_or(ConstructError::MissingField("degree"))?;
        let mut class = Self {
            uuid: fields.uuid.unwrap_or_else(ClassId::generate),
            degree,
            idx: fields.idx,
            name: PageProperty::constant(String::new()),
            max_page: Page::Infinity,
            shape: PageProperty::constant(empty_shape()),
            background_color: PageProperty::constant(Color::BLACK),
            border_color: PageProperty::constant(Color::BLACK),
            border_width: PageProperty::constant(3.0),
            foreground_color: PageProperty::constant(Color::BLACK),
            scale: PageProperty::constant(1.0),
            visible: PageProperty::constant(true),
            x_nudge: PageProperty::constant(0.0),
            y_nudge: PageProperty::constant(0.0),
            user_data: Map::new(),
            x: 0,
            y: 0,
            edges: BTreeSet::new(),
        };
        class.apply_styles(ClassFields {
            kind: None,
            uuid: None,
            degree: None,
            idx: None,
            ..fields
        });
        Ok(class)
    }

    /// Merges a partial patch. Page-dependent fields are replaced wholesale.
    ///
    /// Returns `true` when the patch moved the class to a different `idx`; the owning chart has
    /// to reorder the degree bucket in that case. Outside the crate go through
    /// [`SseqChart::update_class`](crate::model::SseqChart::update_class).
    pub(crate) fn update(&mut self, fields: ClassFields) -> Result<bool, ConstructError> {
        check_tag(fields.kind.as_deref(), CLASS_TAG)?;
        if fields.uuid.as_ref().is_some_and(|uuid| *uuid != self.uuid) {
            return Err(ConstructError::ImmutableField("uuid"));
        }
        if fields.degree.as_ref().is_some_and(|degree| *degree != self.degree) {
            return Err(ConstructError::ImmutableField("degree"));
        }
        let moved = fields.idx.is_some_and(|idx| Some(idx) != self.idx);
        if moved {
            self.idx = fields.idx;
        }
        self.apply_styles(fields);
        Ok(moved)
    }

    fn apply_styles(&mut self, fields: ClassFields) {
        macro_rules! take {
            ($target:ident; $($field:ident),* $(,)?) => {
                $(if let Some(value) = fields.$field {
                    $target.$field = value;
                })*
            };
        }
        take!(
            self;
            name,
            max_page,
            shape,
            background_color,
            border_color,
            border_width,
            foreground_color,
            scale,
            visible,
            x_nudge,
            y_nudge,
            user_data,
        );
    }

    pub fn uuid(&self) -> &ClassId {
        &self.uuid
    }

    pub fn degree(&self) -> &[i32] {
        &self.degree
    }

    pub fn idx(&self) -> Option<usize> {
        self.idx
    }

    pub(crate) fn set_idx(&mut self, idx: usize) {
        self.idx = Some(idx);
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub(crate) fn project(&mut self, x_projection: &[i32], y_projection: &[i32]) {
        let dot = |projection: &[i32]| {
            projection
                .iter()
                .zip(self.degree.iter())
                .map(|(p, d)| i64::from(*p) * i64::from(*d))
                .sum::<i64>()
        };
        self.x = dot(x_projection);
        self.y = dot(y_projection);
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeId> {
        self.edges.iter()
    }

    pub(crate) fn attach_edge(&mut self, edge: EdgeId) {
        self.edges.insert(edge);
    }

    pub(crate) fn detach_edge(&mut self, edge: &EdgeId) {
        self.edges.remove(edge);
    }

    pub fn visible_on(&self, page: Page) -> bool {
        page <= self.max_page && *self.visible.value_on_page(page)
    }

    pub fn in_range(&self, x_min: i64, x_max: i64, y_min: i64, y_max: i64) -> bool {
        (x_min..=x_max).contains(&self.x) && (y_min..=y_max).contains(&self.y)
    }

    pub fn y_offset(&self, page: Page) -> f64 {
        *self.y_nudge.value_on_page(page)
    }

    /// Hover text: the class name on `page` (if any) followed by its projected position.
    pub fn tooltip(&self, page: Page) -> String {
        let name = self.name.value_on_page(page);
        if name.is_empty() {
            format!("({}, {})", self.x, self.y)
        } else {
            format!("{name} - ({}, {})", self.x, self.y)
        }
    }
}

pub(crate) fn check_tag(found: Option<&str>, expected: &'static str) -> Result<(), ConstructError> {
    match found {
        Some(found) if found != expected => Err(ConstructError::WrongType {
            expected,
            found: found.to_owned(),
        }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructError {
    MissingField(&'static str),
    WrongType {
        expected: &'static str,
        found: String,
    },
    ImmutableField(&'static str),
    /// A single-page edge was given a page-dependent value.
    NotConstant(&'static str),
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing mandatory field \"{field}\""),
            Self::WrongType { expected, found } => {
                write!(f, "expected type \"{expected}\", got \"{found}\"")
            }
            Self::ImmutableField(field) => write!(f, "inconsistent values for \"{field}\""),
            Self::NotConstant(field) => {
                write!(f, "field \"{field}\" must not vary by page on this edge type")
            }
        }
    }
}

impl std::error::Error for ConstructError {}
