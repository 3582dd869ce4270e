// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::class::{check_tag, ConstructError};
use super::ids::{ClassId, EdgeId};
use super::page::{Page, PageRange};
use super::page_property::PageProperty;
use super::style::{ArrowTip, Color, DashPattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Structline,
    Differential,
    Extension,
}

impl EdgeType {
    pub const ALL: [Self; 3] = [Self::Structline, Self::Differential, Self::Extension];

    pub fn tag(self) -> &'static str {
        match self {
            Self::Structline => "ChartStructline",
            Self::Differential => "ChartDifferential",
            Self::Extension => "ChartExtension",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fully resolved edge style on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub start_tip: Option<ArrowTip>,
    pub end_tip: Option<ArrowTip>,
    pub bend: f64,
    pub color: Color,
    pub dash_pattern: DashPattern,
    pub line_width: f64,
    pub visible: bool,
    pub action: String,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            start_tip: None,
            end_tip: None,
            bend: 0.0,
            color: Color::BLACK,
            dash_pattern: Vec::new(),
            line_width: 3.0,
            visible: true,
            action: String::new(),
        }
    }
}

/// Structline styling: every attribute may change from page to page.
#[derive(Debug, Clone, PartialEq)]
pub struct StructlineStyle {
    pub start_tip: PageProperty<Option<ArrowTip>>,
    pub end_tip: PageProperty<Option<ArrowTip>>,
    pub bend: PageProperty<f64>,
    pub color: PageProperty<Color>,
    pub dash_pattern: PageProperty<DashPattern>,
    pub line_width: PageProperty<f64>,
    pub visible: PageProperty<bool>,
    pub action: PageProperty<String>,
}

impl Default for StructlineStyle {
    fn default() -> Self {
        let style = EdgeStyle::default();
        Self {
            start_tip: PageProperty::constant(style.start_tip),
            end_tip: PageProperty::constant(style.end_tip),
            bend: PageProperty::constant(style.bend),
            color: PageProperty::constant(style.color),
            dash_pattern: PageProperty::constant(style.dash_pattern),
            line_width: PageProperty::constant(style.line_width),
            visible: PageProperty::constant(style.visible),
            action: PageProperty::constant(style.action),
        }
    }
}

impl StructlineStyle {
    pub fn on_page(&self, page: Page) -> EdgeStyle {
        EdgeStyle {
            start_tip: self.start_tip.value_on_page(page).clone(),
            end_tip: self.end_tip.value_on_page(page).clone(),
            bend: *self.bend.value_on_page(page),
            color: *self.color.value_on_page(page),
            dash_pattern: self.dash_pattern.value_on_page(page).clone(),
            line_width: *self.line_width.value_on_page(page),
            visible: *self.visible.value_on_page(page),
            action: self.action.value_on_page(page).clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    Structline(StructlineStyle),
    Differential { page: Page, style: EdgeStyle },
    Extension { style: EdgeStyle },
}

impl EdgeKind {
    pub fn edge_type(&self) -> EdgeType {
        match self {
            Self::Structline(_) => EdgeType::Structline,
            Self::Differential { .. } => EdgeType::Differential,
            Self::Extension { .. } => EdgeType::Extension,
        }
    }
}

/// Partial field set for an edge of any variant.
///
/// Style fields accept page-dependent values; single-page variants only take constants.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EdgeFields {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub uuid: Option<EdgeId>,
    #[serde(default)]
    pub source_uuid: Option<ClassId>,
    #[serde(default)]
    pub target_uuid: Option<ClassId>,
    #[serde(default)]
    pub page: Option<Page>,
    /// A present `null` clears the tip; an absent key leaves it alone.
    #[serde(default, deserialize_with = "present_tip")]
    pub start_tip: Option<PageProperty<Option<ArrowTip>>>,
    #[serde(default, deserialize_with = "present_tip")]
    pub end_tip: Option<PageProperty<Option<ArrowTip>>>,
    #[serde(default)]
    pub bend: Option<PageProperty<f64>>,
    #[serde(default)]
    pub color: Option<PageProperty<Color>>,
    #[serde(default)]
    pub dash_pattern: Option<PageProperty<DashPattern>>,
    #[serde(default)]
    pub line_width: Option<PageProperty<f64>>,
    #[serde(default)]
    pub visible: Option<PageProperty<bool>>,
    #[serde(default)]
    pub action: Option<PageProperty<String>>,
    #[serde(default)]
    pub user_data: Option<Map<String, Value>>,
}

fn present_tip<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PageProperty<Option<ArrowTip>>>, D::Error> {
    PageProperty::deserialize(deserializer).map(Some)
}

impl EdgeFields {
    pub fn between(source: &ClassId, target: &ClassId) -> Self {
        Self {
            source_uuid: Some(source.clone()),
            target_uuid: Some(target.clone()),
            ..Self::default()
        }
    }

    pub fn on_page(mut self, page: impl Into<Page>) -> Self {
        self.page = Some(page.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartEdge {
    uuid: EdgeId,
    source_uuid: ClassId,
    target_uuid: ClassId,
    pub user_data: Map<String, Value>,
    kind: EdgeKind,
}

impl ChartEdge {
    /// Builds an edge of `edge_type`. A `type` field in `fields`, if present, must agree.
    pub fn from_fields(edge_type: EdgeType, fields: EdgeFields) -> Result<Self, ConstructError> {
        check_tag(fields.kind.as_deref(), edge_type.tag())?;
        let source_uuid = fields
            .source_uuid
            .clone()
            .ok_or(ConstructError::MissingField("source_uuid"))?;
        let target_uuid = fields
            .target_uuid
            .clone()
            .ok_or(ConstructError::MissingField("target_uuid"))?;
        let kind = match edge_type {
            EdgeType::Structline => EdgeKind::Structline(StructlineStyle::default()),
            EdgeType::Differential => EdgeKind::Differential {
                page: fields.page.ok_or(ConstructError::MissingField("page"))?,
                style: EdgeStyle::default(),
            },
            EdgeType::Extension => EdgeKind::Extension {
                style: EdgeStyle::default(),
            },
        };
        let mut edge = Self {
            uuid: fields.uuid.clone().unwrap_or_else(EdgeId::generate),
            source_uuid,
            target_uuid,
            user_data: Map::new(),
            kind,
        };
        edge.apply_styles(fields)?;
        Ok(edge)
    }

    /// Merges a partial patch. Endpoints, uuid, variant and differential page are fixed.
    pub fn update(&mut self, fields: EdgeFields) -> Result<(), ConstructError> {
        check_tag(fields.kind.as_deref(), self.edge_type().tag())?;
        if fields.uuid.as_ref().is_some_and(|uuid| *uuid != self.uuid) {
            return Err(ConstructError::ImmutableField("uuid"));
        }
        if fields
            .source_uuid
            .as_ref()
            .is_some_and(|source| *source != self.source_uuid)
        {
            return Err(ConstructError::ImmutableField("source_uuid"));
        }
        if fields
            .target_uuid
            .as_ref()
            .is_some_and(|target| *target != self.target_uuid)
        {
            return Err(ConstructError::ImmutableField("target_uuid"));
        }
        if let (Some(new_page), EdgeKind::Differential { page, .. }) = (fields.page, &self.kind) {
            if new_page != *page {
                return Err(ConstructError::ImmutableField("page"));
            }
        }
        // Validate the whole patch before touching anything.
        let mut patched = self.clone();
        patched.apply_styles(fields)?;
        *self = patched;
        Ok(())
    }

    fn apply_styles(&mut self, fields: EdgeFields) -> Result<(), ConstructError> {
        if let Some(user_data) = fields.user_data {
            self.user_data = user_data;
        }
        match &mut self.kind {
            EdgeKind::Structline(style) => {
                macro_rules! take {
                    ($($field:ident),* $(,)?) => {
                        $(if let Some(value) = fields.$field {
                            style.$field = value;
                        })*
                    };
                }
                take!(start_tip, end_tip, bend, color, dash_pattern, line_width, visible, action);
            }
            EdgeKind::Differential { style, .. } | EdgeKind::Extension { style } => {
                macro_rules! take_constant {
                    ($($field:ident),* $(,)?) => {
                        $(if let Some(value) = fields.$field {
                            style.$field = value
                                .constant_value()
                                .cloned()
                                .ok_or(ConstructError::NotConstant(stringify!($field)))?;
                        })*
                    };
                }
                take_constant!(
                    start_tip,
                    end_tip,
                    bend,
                    color,
                    dash_pattern,
                    line_width,
                    visible,
                    action,
                );
            }
        }
        Ok(())
    }

    pub fn uuid(&self) -> &EdgeId {
        &self.uuid
    }

    pub fn source_uuid(&self) -> &ClassId {
        &self.source_uuid
    }

    pub fn target_uuid(&self) -> &ClassId {
        &self.target_uuid
    }

    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    pub fn edge_type(&self) -> EdgeType {
        self.kind.edge_type()
    }

    pub fn edge_style(&self, page: Page) -> EdgeStyle {
        match &self.kind {
            EdgeKind::Structline(style) => style.on_page(page),
            EdgeKind::Differential { style, .. } | EdgeKind::Extension { style } => style.clone(),
        }
    }

    /// Whether the edge belongs on the page range `pages`, ignoring its endpoints.
    pub fn draw_on_page(&self, pages: PageRange) -> bool {
        match &self.kind {
            EdgeKind::Structline(style) => *style.visible.value_on_page(pages.start),
            EdgeKind::Differential { page, .. } => {
                pages.start == Page::Finite(0) || pages.contains(*page)
            }
            EdgeKind::Extension { .. } => pages.start == Page::Infinity,
        }
    }
}

impl Serialize for ChartEdge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.edge_type().tag())?;
        map.serialize_entry("uuid", &self.uuid)?;
        map.serialize_entry("source_uuid", &self.source_uuid)?;
        map.serialize_entry("target_uuid", &self.target_uuid)?;
        match &self.kind {
            EdgeKind::Structline(style) => {
                map.serialize_entry("start_tip", &style.start_tip)?;
                map.serialize_entry("end_tip", &style.end_tip)?;
                map.serialize_entry("bend", &style.bend)?;
                map.serialize_entry("color", &style.color)?;
                map.serialize_entry("dash_pattern", &style.dash_pattern)?;
                map.serialize_entry("line_width", &style.line_width)?;
                map.serialize_entry("visible", &style.visible)?;
                map.serialize_entry("action", &style.action)?;
            }
            EdgeKind::Differential { page, style } => {
                map.serialize_entry("page", page)?;
                serialize_style(&mut map, style)?;
            }
            EdgeKind::Extension { style } => serialize_style(&mut map, style)?,
        }
        map.serialize_entry("user_data", &self.user_data)?;
        map.end()
    }
}

fn serialize_style<M: SerializeMap>(map: &mut M, style: &EdgeStyle) -> Result<(), M::Error> {
    map.serialize_entry("start_tip", &style.start_tip)?;
    map.serialize_entry("end_tip", &style.end_tip)?;
    map.serialize_entry("bend", &style.bend)?;
    map.serialize_entry("color", &style.color)?;
    map.serialize_entry("dash_pattern", &style.dash_pattern)?;
    map.serialize_entry("line_width", &style.line_width)?;
    map.serialize_entry("visible", &style.visible)?;
    map.serialize_entry("action", &style.action)
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::{ChartEdge, EdgeFields, EdgeKind, EdgeType};
    use crate::model::{ArrowTip, ClassId, ConstructError, Page, PageProperty, PageRange};

    #[fixture]
    fn endpoints() -> (ClassId, ClassId) {
        (
            ClassId::new("a").expect("id"),
            ClassId::new("b").expect("id"),
        )
    }

    fn range(start: Page, end: Page) -> PageRange {
        PageRange::new(start, end)
    }

    #[rstest]
    fn endpoints_are_mandatory() {
        let err = ChartEdge::from_fields(EdgeType::Structline, EdgeFields::default()).unwrap_err();
        assert_eq!(err, ConstructError::MissingField("source_uuid"));
    }

    #[rstest]
    fn differential_requires_page(endpoints: (ClassId, ClassId)) {
        let fields = EdgeFields::between(&endpoints.0, &endpoints.1);
        let err = ChartEdge::from_fields(EdgeType::Differential, fields).unwrap_err();
        assert_eq!(err, ConstructError::MissingField("page"));
    }

    #[rstest]
    #[case(Page::Finite(0), Page::Finite(0), true)]
    #[case(Page::Finite(2), Page::Finite(2), false)]
    #[case(Page::Finite(3), Page::Finite(3), true)]
    #[case(Page::Finite(2), Page::Finite(5), true)]
    #[case(Page::Finite(4), Page::Infinity, false)]
    fn differential_page_predicate(
        endpoints: (ClassId, ClassId),
        #[case] start: Page,
        #[case] end: Page,
        #[case] expected: bool,
    ) {
        let fields = EdgeFields::between(&endpoints.0, &endpoints.1).on_page(3);
        let edge = ChartEdge::from_fields(EdgeType::Differential, fields).expect("edge");
        assert_eq!(edge.draw_on_page(range(start, end)), expected);
    }

    #[rstest]
    fn extension_only_on_infinite_page(endpoints: (ClassId, ClassId)) {
        let fields = EdgeFields::between(&endpoints.0, &endpoints.1);
        let edge = ChartEdge::from_fields(EdgeType::Extension, fields).expect("edge");
        assert!(edge.draw_on_page(PageRange::single(Page::Infinity)));
        assert!(!edge.draw_on_page(range(Page::Finite(2), Page::Infinity)));
    }

    #[rstest]
    fn structline_visibility_follows_first_page() {
        let fields: EdgeFields = serde_json::from_value(json!({
            "source_uuid": "a",
            "target_uuid": "b",
            "visible": { "type": "PageProperty", "values": [[-65535, true], [4, false]] },
            "color": { "type": "PageProperty", "values": [[-65535, [0, 0, 0, 1]], [3, [1, 0, 0, 1]]] },
        }))
        .expect("fields");
        let edge = ChartEdge::from_fields(EdgeType::Structline, fields).expect("edge");
        assert!(edge.draw_on_page(range(Page::Finite(3), Page::Finite(9))));
        assert!(!edge.draw_on_page(range(Page::Finite(4), Page::Finite(4))));
        assert_eq!(edge.edge_style(Page::Finite(3)).color.0, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(edge.edge_style(Page::Finite(2)).color.0, [0.0, 0.0, 0.0, 1.0]);
    }

    #[rstest]
    fn single_page_edges_reject_page_dependent_style(endpoints: (ClassId, ClassId)) {
        let mut fields = EdgeFields::between(&endpoints.0, &endpoints.1).on_page(2);
        fields.bend = Some(
            serde_json::from_value(json!({ "type": "PageProperty", "values": [[0, 0.0], [3, 1.0]] }))
                .expect("bend"),
        );
        let err = ChartEdge::from_fields(EdgeType::Differential, fields).unwrap_err();
        assert_eq!(err, ConstructError::NotConstant("bend"));
    }

    #[rstest]
    fn update_keeps_endpoints_fixed(endpoints: (ClassId, ClassId)) {
        let fields = EdgeFields::between(&endpoints.0, &endpoints.1).on_page(2);
        let mut edge = ChartEdge::from_fields(EdgeType::Differential, fields).expect("edge");

        let patch: EdgeFields = serde_json::from_value(json!({ "target_uuid": "c" })).unwrap();
        assert_eq!(
            edge.update(patch),
            Err(ConstructError::ImmutableField("target_uuid"))
        );

        let patch: EdgeFields =
            serde_json::from_value(json!({ "line_width": 5, "type": "ChartDifferential" }))
                .unwrap();
        edge.update(patch).expect("update");
        let EdgeKind::Differential { style, .. } = edge.kind() else {
            panic!("expected differential");
        };
        assert_eq!(style.line_width, 5.0);
    }

    #[rstest]
    #[case(EdgeType::Structline)]
    #[case(EdgeType::Extension)]
    fn null_tip_in_patch_clears_it(#[case] edge_type: EdgeType) {
        let fields: EdgeFields = serde_json::from_value(json!({
            "source_uuid": "a",
            "target_uuid": "b",
            "end_tip": { "type": "ArrowTip", "tip": "standard" },
        }))
        .expect("fields");
        let mut edge = ChartEdge::from_fields(edge_type, fields).expect("edge");
        assert_eq!(edge.edge_style(Page::Finite(2)).end_tip, Some(ArrowTip::standard()));

        let untouched: EdgeFields = serde_json::from_value(json!({ "bend": 1.0 })).unwrap();
        assert_eq!(untouched.end_tip, None);
        edge.update(untouched).expect("update");
        assert_eq!(edge.edge_style(Page::Finite(2)).end_tip, Some(ArrowTip::standard()));

        let clear: EdgeFields = serde_json::from_value(json!({ "end_tip": null })).unwrap();
        assert_eq!(clear.end_tip, Some(PageProperty::constant(None)));
        edge.update(clear).expect("update");
        assert_eq!(edge.edge_style(Page::Finite(2)).end_tip, None);
    }

    #[rstest]
    fn serialises_flat_with_tag(endpoints: (ClassId, ClassId)) {
        let fields = EdgeFields::between(&endpoints.0, &endpoints.1).on_page(Page::Infinity);
        let edge = ChartEdge::from_fields(EdgeType::Differential, fields).expect("edge");
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["type"], "ChartDifferential");
        assert_eq!(json["page"], 65535);
        assert_eq!(json["source_uuid"], "a");
        assert_eq!(json["start_tip"], serde_json::Value::Null);
        assert_eq!(json["line_width"], 3.0);
    }
}
