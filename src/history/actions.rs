// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Where a command is delivered on the computing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    Sseq,
    Resolver,
    Server,
}

/// The chart stream a command belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SseqChoice {
    #[default]
    Main,
    Unit,
}

/// A product generator named at a bidegree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub x: i32,
    pub y: i32,
    pub class: Vec<u32>,
    pub name: String,
    pub permanent: bool,
}

/// The action payload, encoded as `{ "<Name>": { ... } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    AddDifferential {
        x: i32,
        y: i32,
        r: i32,
        source: Vec<u32>,
        target: Vec<u32>,
    },
    AddProductType(ProductType),
    AddProductDifferential {
        source: ProductType,
        target: ProductType,
    },
    AddPermanentClass {
        x: i32,
        y: i32,
        class: Vec<u32>,
    },
    SetClassName {
        x: i32,
        y: i32,
        idx: usize,
        name: String,
    },
    Clear {},
    BlockRefresh {
        block: bool,
    },
    Resolve {
        max_degree: i32,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddDifferential { .. } => "AddDifferential",
            Self::AddProductType(_) => "AddProductType",
            Self::AddProductDifferential { .. } => "AddProductDifferential",
            Self::AddPermanentClass { .. } => "AddPermanentClass",
            Self::SetClassName { .. } => "SetClassName",
            Self::Clear {} => "Clear",
            Self::BlockRefresh { .. } => "BlockRefresh",
            Self::Resolve { .. } => "Resolve",
        }
    }

    /// Whether the action mutates the chart and belongs in the undo history.
    pub fn is_logged(&self) -> bool {
        matches!(
            self,
            Self::AddDifferential { .. }
                | Self::AddProductType(_)
                | Self::AddProductDifferential { .. }
                | Self::AddPermanentClass { .. }
                | Self::SetClassName { .. }
        )
    }
}

/// One outbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub sseq: SseqChoice,
    pub action: Action,
}

impl Command {
    pub fn new(recipients: impl IntoIterator<Item = Recipient>, action: Action) -> Self {
        Self {
            recipients: recipients.into_iter().collect(),
            sseq: SseqChoice::default(),
            action,
        }
    }

    /// A command addressed to the chart process only.
    pub fn to_sseq(action: Action) -> Self {
        Self::new([Recipient::Sseq], action)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
