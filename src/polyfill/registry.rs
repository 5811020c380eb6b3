// SPDX-License-Identifier: MIT

use super::condition::{self, Predicate};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Separator used to join a condition's base selectors into one query
pub const SELECTOR_LIST_SEPARATOR: &str = ", ";

/// A compiled condition class and the base selectors it applies to
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Condition {
    class_name: String,
    predicate: Predicate,
    selectors: Vec<String>,
}

impl Condition {
    pub fn new(class_name: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            class_name: class_name.into(),
            predicate,
            selectors: Vec::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Base selectors in registration order
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// All base selectors as a single selector list. Empty bases (a condition
    /// class that opens a compound) are left out, since `", .b"` is not a
    /// valid selector list.
    pub fn union_selector(&self) -> String {
        self.selectors
            .iter()
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(SELECTOR_LIST_SEPARATOR)
    }
}

/// Condition class name -> compiled condition
#[derive(Debug, Clone, Default)]
pub struct ConditionRegistry {
    conditions: HashMap<String, Condition>,
}

impl ConditionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `base_selector` to `class_name`, compiling `condition` the first
    /// time the class is seen.
    pub fn register(&mut self, class_name: &str, condition: &str, base_selector: String) {
        let entry = self
            .conditions
            .entry(class_name.to_string())
            .or_insert_with(|| {
                log::debug!("Compiling condition class: {}", class_name);
                Condition::new(class_name, condition::compile(condition))
            });
        entry.selectors.push(base_selector);
    }

    pub fn get(&self, class_name: &str) -> Option<&Condition> {
        self.conditions.get(class_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.values()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Class names in sorted order
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.conditions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Serialize for ConditionRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.conditions.len()))?;
        for name in self.class_names() {
            map.serialize_entry(name, &self.conditions[name])?;
        }
        map.end()
    }
}
