// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AttributeKind, SelectionEntry};

/// What a selection transition did to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// The attribute's entry was removed. Entries made after it are left
    /// alone; only modification cascades, not removal.
    Cleared { attribute: AttributeKind },
    /// An existing entry was re-valued and every later entry discarded,
    /// because their validity depended on the old value.
    Replaced {
        attribute: AttributeKind,
        discarded: Vec<SelectionEntry>,
    },
    /// A first-time choice for this attribute, appended to the log.
    Appended { attribute: AttributeKind },
    /// Clearing an attribute that had no entry.
    NoChange,
}

/// Pure transition over an ordered selection log.
///
/// Rules, in priority order: an empty `value` removes the attribute's entry
/// and nothing else; a value for an already-selected attribute replaces it
/// and truncates everything after it; otherwise the choice is appended.
pub fn apply_selection(
    current: &[SelectionEntry],
    attribute: AttributeKind,
    value: &str,
) -> Vec<SelectionEntry> {
    if value.is_empty() {
        return current
            .iter()
            .filter(|entry| entry.attribute != attribute)
            .cloned()
            .collect();
    }

    if let Some(index) = current.iter().position(|entry| entry.attribute == attribute) {
        let mut next = current[..=index].to_vec();
        next[index].value = value.to_owned();
        return next;
    }

    let mut next = current.to_vec();
    next.push(SelectionEntry::new(attribute, value));
    next
}

/// Ordered log of the user's attribute choices. At most one entry per
/// attribute; order reflects when each choice was made.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionLog {
    entries: Vec<SelectionEntry>,
}

impl SelectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn selected_value(&self, attribute: AttributeKind) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.attribute == attribute)
            .map(|entry| entry.value.as_str())
    }

    pub fn apply(&mut self, attribute: AttributeKind, value: &str) -> SelectionEvent {
        if value.is_empty() {
            let before = self.entries.len();
            self.entries.retain(|entry| entry.attribute != attribute);
            if self.entries.len() == before {
                return SelectionEvent::NoChange;
            }
            return SelectionEvent::Cleared { attribute };
        }

        if let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.attribute == attribute)
        {
            let discarded = self.entries.split_off(index + 1);
            self.entries[index].value = value.to_owned();
            return SelectionEvent::Replaced {
                attribute,
                discarded,
            };
        }

        self.entries.push(SelectionEntry::new(attribute, value));
        SelectionEvent::Appended { attribute }
    }
}
