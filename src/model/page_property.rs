// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Page-indexed step functions.
//!
//! A [`PageProperty`] stores a value that changes at integer page boundaries as a run-length
//! compressed list of breakpoints. The first breakpoint always sits at [`Page::NegInfinity`], so
//! every page resolves to a value, and no two adjacent breakpoints carry equal values.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::page::Page;

pub const PAGE_PROPERTY_TAG: &str = "PageProperty";

#[derive(Debug, Clone, PartialEq)]
pub struct PageProperty<V> {
    values: Vec<(Page, V)>,
}

impl<V> PageProperty<V> {
    pub fn constant(value: V) -> Self {
        Self {
            values: vec![(Page::NegInfinity, value)],
        }
    }

    pub fn breakpoints(&self) -> &[(Page, V)] {
        &self.values
    }

    pub fn is_constant(&self) -> bool {
        self.values.len() == 1
    }

    pub fn constant_value(&self) -> Option<&V> {
        match self.values.as_slice() {
            [(_, value)] => Some(value),
            _ => None,
        }
    }

    pub fn value_on_page(&self, page: Page) -> &V {
        &self.values[self.find_index(page).0].1
    }

    /// Applies `f` to every breakpoint value. Breakpoints that `f` makes equal are merged.
    pub fn map<U: PartialEq, F: FnMut(&V) -> U>(&self, mut f: F) -> PageProperty<U> {
        let mut values: Vec<(Page, U)> =
            self.values.iter().map(|(page, v)| (*page, f(v))).collect();
        values.dedup_by(|next, prev| next.1 == prev.1);
        PageProperty { values }
    }

    /// Index of the last breakpoint at or below `page`, and whether it sits exactly on `page`.
    fn find_index(&self, page: Page) -> (usize, bool) {
        // The first breakpoint is at -inf, so the partition point is always >= 1.
        let idx = self
            .values
            .partition_point(|(p, _)| *p <= page)
            .saturating_sub(1);
        (idx, self.values[idx].0 == page)
    }

    fn set_single(&mut self, page: Page, value: V) -> usize {
        let (idx, hit) = self.find_index(page);
        if hit {
            self.values[idx].1 = value;
            idx
        } else {
            self.values.insert(idx + 1, (page, value));
            idx + 1
        }
    }
}

impl<V: Clone + PartialEq> PageProperty<V> {
    /// Builds a property from an explicit breakpoint list.
    ///
    /// The first breakpoint is pinned to `-inf` whatever page it was given with.
    pub fn from_breakpoints(mut values: Vec<(Page, V)>) -> Result<Self, PagePropertyError> {
        if values.is_empty() {
            return Err(PagePropertyError::Empty);
        }
        for pair in values.windows(2) {
            if pair[0].0 >= pair[1].0 {
                return Err(PagePropertyError::NotIncreasing {
                    previous: pair[0].0,
                    next: pair[1].0,
                });
            }
        }
        values[0].0 = Page::NegInfinity;
        let mut property = Self { values };
        property.merge_redundant();
        Ok(property)
    }

    /// Sets `value` on exactly one page. Neighbouring pages keep their values.
    pub fn set_point(&mut self, page: Page, value: V) {
        match page.successor() {
            Some(next) => {
                let tail = self.value_on_page(next).clone();
                let idx = self.set_single(page, value);
                if self.values.get(idx + 1).map(|(p, _)| *p) != Some(next) {
                    self.values.insert(idx + 1, (next, tail));
                }
            }
            None => {
                self.set_single(page, value);
            }
        }
        self.merge_redundant();
    }

    /// Sets `value` on the half-open range `[start, stop)`, leaving every other page unchanged.
    ///
    /// When `stop` is `+inf` the breakpoint at `+inf` (if any) is overwritten as well.
    pub fn set_range(&mut self, start: Page, stop: Page, value: V) -> Result<(), PagePropertyError> {
        if start >= stop {
            return Err(PagePropertyError::EmptyRange { start, stop });
        }
        let tail = (stop != Page::Infinity).then(|| self.value_on_page(stop).clone());

        let start_idx = self.set_single(start, value);
        let keep_from = if stop == Page::Infinity {
            self.values.len()
        } else {
            self.values.partition_point(|(p, _)| *p < stop)
        };
        self.values.drain(start_idx + 1..keep_from);

        if let Some(tail) = tail {
            if self.values.get(start_idx + 1).map(|(p, _)| *p) != Some(stop) {
                self.values.insert(start_idx + 1, (stop, tail));
            }
        }

        self.merge_redundant();
        Ok(())
    }

    pub fn merge_redundant(&mut self) {
        self.values.dedup_by(|next, prev| next.1 == prev.1);
    }
}

impl<V: Default> Default for PageProperty<V> {
    fn default() -> Self {
        Self::constant(V::default())
    }
}

impl<V> From<V> for PageProperty<V> {
    fn from(value: V) -> Self {
        Self::constant(value)
    }
}

impl<V: fmt::Debug> fmt::Display for PageProperty<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PageProperty(")?;
        for (i, (page, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{page}: {value:?}")?;
        }
        f.write_str(")")
    }
}

impl<V: Serialize> Serialize for PageProperty<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let [(_, value)] = self.values.as_slice() {
            return value.serialize(serializer);
        }
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", PAGE_PROPERTY_TAG)?;
        map.serialize_entry("values", &self.values)?;
        map.end()
    }
}

impl<V: DeserializeOwned + Clone + PartialEq> PageProperty<V> {
    /// Decodes either a tagged breakpoint list or a bare value (which becomes a constant).
    pub fn from_json(raw: Value) -> Result<Self, PagePropertyError> {
        match raw {
            Value::Object(mut map)
                if map.get("type").and_then(Value::as_str) == Some(PAGE_PROPERTY_TAG) =>
            {
                let values = map.remove("values").ok_or(PagePropertyError::Empty)?;
                let values: Vec<(Page, V)> = serde_json::from_value(values)
                    .map_err(|err| PagePropertyError::Json(err.to_string()))?;
                Self::from_breakpoints(values)
            }
            raw => serde_json::from_value(raw)
                .map(Self::constant)
                .map_err(|err| PagePropertyError::Json(err.to_string())),
        }
    }
}

impl<'de, V: DeserializeOwned + Clone + PartialEq> Deserialize<'de> for PageProperty<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_json(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagePropertyError {
    Empty,
    NotIncreasing { previous: Page, next: Page },
    EmptyRange { start: Page, stop: Page },
    Json(String),
}

impl fmt::Display for PagePropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("page property must have at least one breakpoint"),
            Self::NotIncreasing { previous, next } => write!(
                f,
                "page property breakpoints must be strictly increasing (page {next} follows {previous})"
            ),
            Self::EmptyRange { start, stop } => {
                write!(f, "empty page range (start={start}, stop={stop})")
            }
            Self::Json(message) => write!(f, "invalid page property json: {message}"),
        }
    }
}

impl std::error::Error for PagePropertyError {}
