// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The remote message stream.
//!
//! The computing side streams `create`/`update`/`delete` messages that mirror its own chart into
//! the local one. Messages are applied in arrival order.

pub mod decode;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug_span, warn};

use crate::model::{
    ChartError, ChartId, ChartRegistry, ChartSettingsPatch, ClassFields, EdgeFields, SseqChart,
    CHART_TAG, CLASS_TAG,
};
pub use decode::{decode_chart_json, DecodeError, DecodeFn, DecoderRegistry, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ChartMessage {
    Create {
        #[serde(alias = "type")]
        target_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chart_id: Option<ChartId>,
        target: Value,
    },
    Update {
        #[serde(alias = "type")]
        target_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chart_id: Option<ChartId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_uuid: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        update_fields: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_fields: Option<Value>,
    },
    Delete {
        #[serde(alias = "type")]
        target_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chart_id: Option<ChartId>,
        target_uuid: String,
    },
}

impl ChartMessage {
    pub fn from_json_str(raw: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn command(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn target_type(&self) -> &str {
        match self {
            Self::Create { target_type, .. }
            | Self::Update { target_type, .. }
            | Self::Delete { target_type, .. } => target_type,
        }
    }

    pub fn chart_id(&self) -> Option<&ChartId> {
        match self {
            Self::Create { chart_id, .. }
            | Self::Update { chart_id, .. }
            | Self::Delete { chart_id, .. } => chart_id.as_ref(),
        }
    }
}

/// Applies one remote message to `chart`. On error the chart is left as it was.
pub fn apply_message(
    chart: &mut SseqChart,
    registry: &DecoderRegistry,
    message: ChartMessage,
) -> Result<(), MessageError> {
    let span = debug_span!(
        "apply_message",
        chart = %chart.uuid(),
        command = message.command(),
        target_type = message.target_type(),
    );
    let _entered = span.enter();

    let result = match message {
        ChartMessage::Create {
            target_type,
            target,
            ..
        } => apply_create(chart, registry, &target_type, target),
        ChartMessage::Update {
            target_type,
            target_uuid,
            update_fields,
            target_fields,
            ..
        } => apply_update(chart, &target_type, target_uuid, update_fields, target_fields),
        ChartMessage::Delete {
            target_type,
            target_uuid,
            ..
        } => apply_delete(chart, &target_type, &target_uuid),
    };
    match &result {
        Ok(()) => chart.notify_update(),
        Err(err) => warn!(error = %err, "rejected chart message"),
    }
    result
}

fn apply_create(
    chart: &mut SseqChart,
    registry: &DecoderRegistry,
    target_type: &str,
    target: Value,
) -> Result<(), MessageError> {
    match registry.decode_as(target_type, target)? {
        Entity::Class(class) => {
            chart.commit_class(class)?;
        }
        Entity::Edge(edge) => {
            chart.commit_edge(edge)?;
        }
        other => {
            return Err(MessageError::UnsupportedTarget {
                command: "create",
                target_type: other.tag().to_owned(),
            })
        }
    }
    Ok(())
}

fn apply_update(
    chart: &mut SseqChart,
    target_type: &str,
    target_uuid: Option<String>,
    update_fields: Option<Value>,
    target_fields: Option<Value>,
) -> Result<(), MessageError> {
    if target_type == CHART_TAG {
        let fields = target_fields
            .or(update_fields)
            .unwrap_or_else(|| Value::Object(Map::new()));
        let patch: ChartSettingsPatch = serde_json::from_value(fields)?;
        chart.update_settings(patch)?;
        return Ok(());
    }

    let uuid = target_uuid
        .or_else(|| {
            update_fields
                .as_ref()
                .and_then(|fields| fields.get("uuid"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .ok_or(MessageError::MissingUuid)?;
    let fields = update_fields.unwrap_or_else(|| Value::Object(Map::new()));

    match locate(chart, "update", &uuid, target_type)? {
        Located::Class => {
            let fields: ClassFields = serde_json::from_value(fields)?;
            chart.update_class(&uuid, fields)?;
        }
        Located::Edge => {
            let fields: EdgeFields = serde_json::from_value(fields)?;
            chart.update_edge(&uuid, fields)?;
        }
    }
    Ok(())
}

fn apply_delete(
    chart: &mut SseqChart,
    target_type: &str,
    target_uuid: &str,
) -> Result<(), MessageError> {
    match locate(chart, "delete", target_uuid, target_type)? {
        Located::Class => {
            chart.delete_class(target_uuid)?;
        }
        Located::Edge => {
            chart.delete_edge(target_uuid)?;
        }
    }
    Ok(())
}

enum Located {
    Class,
    Edge,
}

/// Finds the object a message targets and checks the declared type against it.
fn locate(
    chart: &SseqChart,
    command: &'static str,
    uuid: &str,
    claimed: &str,
) -> Result<Located, MessageError> {
    let (located, actual) = if chart.class(uuid).is_some() {
        (Located::Class, CLASS_TAG)
    } else if let Some(edge) = chart.edge(uuid) {
        (Located::Edge, edge.edge_type().tag())
    } else {
        return Err(MessageError::UnknownTarget {
            command,
            uuid: uuid.to_owned(),
        });
    };
    if claimed != actual {
        return Err(MessageError::TypeMismatch {
            uuid: uuid.to_owned(),
            claimed: claimed.to_owned(),
            actual,
        });
    }
    Ok(located)
}

impl SseqChart {
    /// [`apply_message`] with the standard decoders.
    pub fn apply_message(&mut self, message: ChartMessage) -> Result<(), MessageError> {
        apply_message(self, DecoderRegistry::shared(), message)
    }
}

impl ChartRegistry {
    /// Routes `message` to the chart named by its `chart_id`. Creating an `SseqChart` registers a
    /// new chart.
    pub fn apply_message(
        &mut self,
        registry: &DecoderRegistry,
        message: ChartMessage,
    ) -> Result<(), MessageError> {
        if let ChartMessage::Create {
            target_type,
            target,
            ..
        } = &message
        {
            if target_type == CHART_TAG {
                let chart = decode_chart_json(registry, target.clone())?;
                if self.contains(chart.uuid().as_str()) {
                    return Err(MessageError::Chart(ChartError::DuplicateId(
                        chart.uuid().to_string(),
                    )));
                }
                self.insert(chart);
                return Ok(());
            }
        }

        let id = message.chart_id().ok_or(MessageError::MissingChartId)?;
        let chart = self
            .get_mut(id.as_str())
            .ok_or_else(|| MessageError::UnknownChart(id.to_string()))?;
        apply_message(chart, registry, message)
    }
}

#[derive(Debug)]
pub enum MessageError {
    Json(serde_json::Error),
    Decode(DecodeError),
    Chart(ChartError),
    MissingUuid,
    MissingChartId,
    UnknownChart(String),
    UnknownTarget {
        command: &'static str,
        uuid: String,
    },
    TypeMismatch {
        uuid: String,
        claimed: String,
        actual: &'static str,
    },
    UnsupportedTarget {
        command: &'static str,
        target_type: String,
    },
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid message: {err}"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::Chart(err) => write!(f, "{err}"),
            Self::MissingUuid => f.write_str("update names no target uuid"),
            Self::MissingChartId => f.write_str("message names no chart_id"),
            Self::UnknownChart(id) => write!(f, "no chart with uuid {id}"),
            Self::UnknownTarget { command, uuid } => {
                write!(f, "cannot {command} unknown object {uuid}")
            }
            Self::TypeMismatch {
                uuid,
                claimed,
                actual,
            } => write!(f, "object {uuid} is a {actual}, not a {claimed}"),
            Self::UnsupportedTarget {
                command,
                target_type,
            } => write!(f, "cannot {command} an object of type {target_type}"),
        }
    }
}

impl std::error::Error for MessageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Chart(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MessageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<DecodeError> for MessageError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<ChartError> for MessageError {
    fn from(err: ChartError) -> Self {
        Self::Chart(err)
    }
}
