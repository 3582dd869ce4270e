// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire encoding of the infinite page. Any magnitude at or beyond this decodes to a sentinel.
pub const WIRE_INFINITY: i64 = 65535;

/// A page on the filtration axis.
///
/// Variant order matters: the derived `Ord` puts `NegInfinity` below every finite page and
/// `Infinity` above every finite page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Page {
    NegInfinity,
    Finite(i32),
    Infinity,
}

impl Page {
    pub fn is_finite(self) -> bool {
        matches!(self, Self::Finite(_))
    }

    pub fn finite(self) -> Option<i32> {
        match self {
            Self::Finite(page) => Some(page),
            _ => None,
        }
    }

    pub fn from_wire(raw: i64) -> Self {
        if raw >= WIRE_INFINITY {
            Self::Infinity
        } else if raw <= -WIRE_INFINITY {
            Self::NegInfinity
        } else {
            // |raw| < 65535 always fits.
            Self::Finite(raw as i32)
        }
    }

    /// The next page in memory order, or `None` for `+inf`. The wire cutoff does not apply here.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::NegInfinity => Some(Self::Finite(i32::MIN)),
            Self::Finite(page) => Some(page.checked_add(1).map_or(Self::Infinity, Self::Finite)),
            Self::Infinity => None,
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            Self::NegInfinity => -WIRE_INFINITY,
            Self::Finite(page) => i64::from(page),
            Self::Infinity => WIRE_INFINITY,
        }
    }
}

impl From<i32> for Page {
    fn from(page: i32) -> Self {
        Self::from_wire(i64::from(page))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegInfinity => f.write_str("-inf"),
            Self::Finite(page) => write!(f, "{page}"),
            Self::Infinity => f.write_str("inf"),
        }
    }
}

impl Serialize for Page {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_wire())
    }
}

struct PageVisitor;

impl<'de> Visitor<'de> for PageVisitor {
    type Value = Page;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integral page number")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Page, E> {
        Ok(Page::from_wire(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Page, E> {
        Ok(Page::from_wire(i64::try_from(v).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Page, E> {
        if v.is_nan() || v.fract() != 0.0 {
            return Err(E::custom(format!("page {v} is not an integer")));
        }
        if v >= WIRE_INFINITY as f64 {
            return Ok(Page::Infinity);
        }
        if v <= -(WIRE_INFINITY as f64) {
            return Ok(Page::NegInfinity);
        }
        Ok(Page::from_wire(v as i64))
    }
}

impl<'de> Deserialize<'de> for Page {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PageVisitor)
    }
}

/// An inclusive page interval, as stored in a chart's `page_list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRange {
    pub start: Page,
    pub end: Page,
}

impl PageRange {
    pub fn new(start: Page, end: Page) -> Self {
        Self { start, end }
    }

    pub fn single(page: Page) -> Self {
        Self {
            start: page,
            end: page,
        }
    }

    pub fn contains(&self, page: Page) -> bool {
        self.start <= page && page <= self.end
    }
}

impl From<Page> for PageRange {
    fn from(page: Page) -> Self {
        Self::single(page)
    }
}

impl Serialize for PageRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.start, self.end).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PageRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (start, end) = <(Page, Page)>::deserialize(deserializer)?;
        Ok(Self { start, end })
    }
}
