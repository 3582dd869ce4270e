// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tag-driven JSON revival.
//!
//! Every wire object carries a `type` tag. A [`DecoderRegistry`] maps each tag to a decoder that
//! produces the matching [`Entity`]; tags without a decoder are rejected.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Value;

use crate::model::chart::MIN_GRADINGS;
use crate::model::{
    ChartClass, ChartEdge, ChartError, ChartId, ChartSettingsPatch, ClassFields, ConstructError,
    EdgeFields, EdgeType, PageProperty, PagePropertyError, SseqChart, CHART_TAG, CLASS_TAG,
    PAGE_PROPERTY_TAG,
};

#[derive(Debug, Clone)]
pub enum Entity {
    Chart(Box<SseqChart>),
    Class(ChartClass),
    Edge(ChartEdge),
    PageProperty(PageProperty<Value>),
}

impl Entity {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Chart(_) => CHART_TAG,
            Self::Class(_) => CLASS_TAG,
            Self::Edge(edge) => edge.edge_type().tag(),
            Self::PageProperty(_) => PAGE_PROPERTY_TAG,
        }
    }
}

pub type DecodeFn = fn(&DecoderRegistry, Value) -> Result<Entity, DecodeError>;

#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<String, DecodeFn>,
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("DecoderRegistry").field("tags", &tags).finish()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl DecoderRegistry {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Decoders for the chart, its classes, the three edge variants and page properties.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(CHART_TAG, decode_chart);
        registry.register(CLASS_TAG, decode_class);
        registry.register(EdgeType::Structline.tag(), decode_structline);
        registry.register(EdgeType::Differential.tag(), decode_differential);
        registry.register(EdgeType::Extension.tag(), decode_extension);
        registry.register(PAGE_PROPERTY_TAG, decode_page_property);
        registry
    }

    /// A process-wide instance of [`DecoderRegistry::standard`].
    pub fn shared() -> &'static Self {
        static SHARED: OnceLock<DecoderRegistry> = OnceLock::new();
        SHARED.get_or_init(Self::standard)
    }

    pub fn register(&mut self, tag: impl Into<String>, decoder: DecodeFn) -> Option<DecodeFn> {
        self.decoders.insert(tag.into(), decoder)
    }

    pub fn knows(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decodes `value` by its own `type` field.
    pub fn decode(&self, value: Value) -> Result<Entity, DecodeError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingTag)?
            .to_owned();
        self.dispatch(&tag, value)
    }

    /// Decodes `value` as `tag`. A `type` field inside `value`, if present, must agree.
    pub fn decode_as(&self, tag: &str, value: Value) -> Result<Entity, DecodeError> {
        if let Some(found) = value.get("type").and_then(Value::as_str) {
            if found != tag {
                return Err(DecodeError::TagMismatch {
                    declared: tag.to_owned(),
                    found: found.to_owned(),
                });
            }
        }
        self.dispatch(tag, value)
    }

    fn dispatch(&self, tag: &str, value: Value) -> Result<Entity, DecodeError> {
        let decoder = self
            .decoders
            .get(tag)
            .ok_or_else(|| DecodeError::UnknownTag(tag.to_owned()))?;
        decoder(self, value)
    }
}

fn decode_class(_: &DecoderRegistry, value: Value) -> Result<Entity, DecodeError> {
    let fields: ClassFields = serde_json::from_value(value)?;
    Ok(Entity::Class(ChartClass::from_fields(fields)?))
}

fn decode_edge(edge_type: EdgeType, value: Value) -> Result<Entity, DecodeError> {
    let fields: EdgeFields = serde_json::from_value(value)?;
    Ok(Entity::Edge(ChartEdge::from_fields(edge_type, fields)?))
}

fn decode_structline(_: &DecoderRegistry, value: Value) -> Result<Entity, DecodeError> {
    decode_edge(EdgeType::Structline, value)
}

fn decode_differential(_: &DecoderRegistry, value: Value) -> Result<Entity, DecodeError> {
    decode_edge(EdgeType::Differential, value)
}

fn decode_extension(_: &DecoderRegistry, value: Value) -> Result<Entity, DecodeError> {
    decode_edge(EdgeType::Extension, value)
}

fn decode_page_property(_: &DecoderRegistry, value: Value) -> Result<Entity, DecodeError> {
    Ok(Entity::PageProperty(PageProperty::from_json(value)?))
}

#[derive(Debug, Deserialize)]
struct ChartRepr {
    #[serde(default)]
    uuid: Option<ChartId>,
    #[serde(flatten)]
    settings: ChartSettingsPatch,
    #[serde(default)]
    classes: Vec<Value>,
    #[serde(default)]
    edges: Vec<Value>,
}

fn decode_chart(registry: &DecoderRegistry, value: Value) -> Result<Entity, DecodeError> {
    let repr: ChartRepr = serde_json::from_value(value)?;
    let name = repr.settings.name.clone().unwrap_or_default();
    let num_gradings = repr.settings.num_gradings.unwrap_or(MIN_GRADINGS);
    let uuid = repr.uuid.unwrap_or_else(ChartId::generate);

    let mut chart = SseqChart::with_uuid(uuid, name, num_gradings)?;
    chart.update_settings(repr.settings)?;
    for class in repr.classes {
        match registry.decode_as(CLASS_TAG, class)? {
            Entity::Class(class) => {
                chart.commit_class(class)?;
            }
            other => return Err(DecodeError::unexpected(CLASS_TAG, &other)),
        }
    }
    for edge in repr.edges {
        match registry.decode(edge)? {
            Entity::Edge(edge) => {
                chart.commit_edge(edge)?;
            }
            other => return Err(DecodeError::unexpected("edge", &other)),
        }
    }
    // A freshly decoded chart has no history to report.
    chart.drain_events();
    Ok(Entity::Chart(Box::new(chart)))
}

/// Decodes a full chart document.
pub fn decode_chart_json(registry: &DecoderRegistry, value: Value) -> Result<SseqChart, DecodeError> {
    match registry.decode_as(CHART_TAG, value)? {
        Entity::Chart(chart) => Ok(*chart),
        other => Err(DecodeError::unexpected(CHART_TAG, &other)),
    }
}

#[derive(Debug)]
pub enum DecodeError {
    MissingTag,
    UnknownTag(String),
    TagMismatch { declared: String, found: String },
    UnexpectedEntity {
        expected: &'static str,
        found: &'static str,
    },
    Json(serde_json::Error),
    Construct(ConstructError),
    PageProperty(PagePropertyError),
    Chart(ChartError),
}

impl DecodeError {
    fn unexpected(expected: &'static str, found: &Entity) -> Self {
        Self::UnexpectedEntity {
            expected,
            found: found.tag(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTag => f.write_str("object has no \"type\" tag"),
            Self::UnknownTag(tag) => write!(f, "unknown type tag \"{tag}\""),
            Self::TagMismatch { declared, found } => {
                write!(f, "object declared as \"{declared}\" carries type \"{found}\"")
            }
            Self::UnexpectedEntity { expected, found } => {
                write!(f, "expected {expected}, decoded {found}")
            }
            Self::Json(err) => write!(f, "invalid json: {err}"),
            Self::Construct(err) => write!(f, "{err}"),
            Self::PageProperty(err) => write!(f, "{err}"),
            Self::Chart(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Construct(err) => Some(err),
            Self::PageProperty(err) => Some(err),
            Self::Chart(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<ConstructError> for DecodeError {
    fn from(err: ConstructError) -> Self {
        Self::Construct(err)
    }
}

impl From<PagePropertyError> for DecodeError {
    fn from(err: PagePropertyError) -> Self {
        Self::PageProperty(err)
    }
}

impl From<ChartError> for DecodeError {
    fn from(err: ChartError) -> Self {
        Self::Chart(err)
    }
}
