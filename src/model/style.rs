// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Visual value types carried by page properties.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// RGBA, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub [f64; 4]);

impl Color {
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

pub type DashPattern = Vec<f64>;

/// Node shapes are drawn by the rendering layer; the model keeps them as opaque JSON.
pub type Shape = Value;

pub fn empty_shape() -> Shape {
    serde_json::json!({ "ty": "empty" })
}

pub const ARROW_TIP_TAG: &str = "ArrowTip";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ArrowTipRepr", into = "ArrowTipRepr")]
pub struct ArrowTip {
    pub tip: String,
}

impl ArrowTip {
    pub fn standard() -> Self {
        Self {
            tip: "standard".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArrowTipRepr {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    tip: String,
}

impl TryFrom<ArrowTipRepr> for ArrowTip {
    type Error = ArrowTipTagError;

    fn try_from(repr: ArrowTipRepr) -> Result<Self, Self::Error> {
        match repr.kind {
            Some(kind) if kind != ARROW_TIP_TAG => Err(ArrowTipTagError(kind)),
            _ => Ok(Self { tip: repr.tip }),
        }
    }
}

impl From<ArrowTip> for ArrowTipRepr {
    fn from(tip: ArrowTip) -> Self {
        Self {
            kind: Some(ARROW_TIP_TAG.to_owned()),
            tip: tip.tip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowTipTagError(String);

impl fmt::Display for ArrowTipTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected type \"{ARROW_TIP_TAG}\", got \"{}\"", self.0)
    }
}

impl std::error::Error for ArrowTipTagError {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ArrowTip, Color};

    #[test]
    fn arrow_tip_carries_its_tag() {
        let json = serde_json::to_value(ArrowTip::standard()).unwrap();
        assert_eq!(json, json!({ "type": "ArrowTip", "tip": "standard" }));

        let untagged: ArrowTip = serde_json::from_value(json!({ "tip": "hook" })).unwrap();
        assert_eq!(untagged.tip, "hook");
        assert!(serde_json::from_value::<ArrowTip>(json!({ "type": "Color", "tip": "x" })).is_err());
    }

    #[test]
    fn missing_tip_is_null() {
        let none: Option<ArrowTip> = None;
        assert_eq!(serde_json::to_value(none).unwrap(), json!(null));
    }

    #[test]
    fn color_is_a_plain_array() {
        assert_eq!(serde_json::to_value(Color::BLACK).unwrap(), json!([0.0, 0.0, 0.0, 1.0]));
    }
}
