//! The collection of tracked items.
//!
//! A [`Registry`] is a plain owned value handed to whatever needs it (display,
//! persistence, the CLI). It keeps items in insertion order, enforces name
//! uniqueness and produces sorted views without touching the items.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{ItemError, TrackedItem};
use crate::perception::PerceptionKind;
use crate::types::{ItemName, ValidationError};

/// Registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("an item named {name:?} already exists")]
    DuplicateName { name: String },

    #[error("no item named {name:?}")]
    NotFound { name: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{name}: {source}")]
    Item {
        name: String,
        #[source]
        source: ItemError,
    },
}

/// Field a sorted view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SortKey {
    Name,
    AverageDuration,
    #[default]
    NextDueDate,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::AverageDuration => "average",
            Self::NextDueDate => "due",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "average" | "average_duration" => Ok(Self::AverageDuration),
            "due" | "next_due_date" => Ok(Self::NextDueDate),
            _ => Err(ValidationError::UnknownSortKey {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SortKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_str().to_string()
    }
}

/// Direction of a sorted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Owns every tracked item, keyed by unique name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    items: Vec<TrackedItem>,
}

impl Registry {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds an item, rejecting a name that is already taken.
    pub fn insert(&mut self, item: TrackedItem) -> Result<(), RegistryError> {
        if self.contains(item.name().as_str()) {
            return Err(RegistryError::DuplicateName {
                name: item.name().to_string(),
            });
        }
        tracing::debug!(item = %item.name(), "item registered");
        self.items.push(item);
        Ok(())
    }

    /// Creates and registers an empty item.
    pub fn create(&mut self, name: impl Into<String>) -> Result<&mut TrackedItem, RegistryError> {
        let name = ItemName::new(name)?;
        self.insert(TrackedItem::with_name(name))?;
        let idx = self.items.len() - 1;
        Ok(&mut self.items[idx])
    }

    /// Records a perception on the named item.
    pub fn record(
        &mut self,
        name: &str,
        kind: PerceptionKind,
        timestamp: i64,
    ) -> Result<&TrackedItem, RegistryError> {
        let item = self.get_mut(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        if let Err(source) = item.record_perception(kind, timestamp) {
            return Err(RegistryError::Item {
                name: name.to_string(),
                source,
            });
        }
        Ok(item)
    }

    pub fn get(&self, name: &str) -> Option<&TrackedItem> {
        let name = name.trim();
        self.items.iter().find(|item| item.name().as_str() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TrackedItem> {
        let name = name.trim();
        self.items
            .iter_mut()
            .find(|item| item.name().as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes the named item, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<TrackedItem> {
        let name = name.trim();
        let idx = self
            .items
            .iter()
            .position(|item| item.name().as_str() == name)?;
        tracing::debug!(item = name, "item removed");
        Some(self.items.remove(idx))
    }

    /// Items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, TrackedItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total perceptions recorded across all items.
    pub fn event_count(&self) -> usize {
        self.items.iter().map(TrackedItem::event_count).sum()
    }

    /// A sorted view over the items. Ties keep insertion order.
    pub fn sorted(&self, key: SortKey, order: SortOrder) -> Vec<&TrackedItem> {
        let mut view: Vec<&TrackedItem> = self.items.iter().collect();
        view.sort_by(|a, b| {
            let ord = compare_by(key, a, b);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        view
    }

    /// Items whose next due date has been reached at `now`, soonest first.
    pub fn overdue(&self, now: i64) -> Vec<&TrackedItem> {
        let mut view: Vec<&TrackedItem> = self
            .items
            .iter()
            .filter(|item| item.is_overdue(now))
            .collect();
        view.sort_by_key(|item| item.next_due_date());
        view
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a TrackedItem;
    type IntoIter = std::slice::Iter<'a, TrackedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn compare_by(key: SortKey, a: &TrackedItem, b: &TrackedItem) -> Ordering {
    match key {
        SortKey::Name => a.name().cmp(b.name()),
        SortKey::AverageDuration => a.average_duration().cmp(&b.average_duration()),
        SortKey::NextDueDate => a.next_due_date().cmp(&b.next_due_date()),
    }
}
