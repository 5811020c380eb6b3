// SPDX-License-Identifier: MIT

//! Selector splitter
//!
//! Finds every synthetic condition class (`.where-` followed by a run of
//! non-whitespace) in a selector, left to right. Each occurrence records
//! its base selector: the selector text to the left of the occurrence with
//! the earlier occurrences already removed. Text to the right of an
//! occurrence never appears in its base selector.
//!
//! The token runs to the next whitespace, so anything written after a
//! condition class in the same compound (`.where-x-eq-1:hover`,
//! `.where-a-eq-1.where-b-eq-2`) becomes part of its condition.

use super::registry::ConditionRegistry;
use serde::Serialize;
use std::ops::Range;

/// One condition class found in a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionOccurrence {
    /// Full class name, e.g. `where-width-lt-500px`
    pub condition_class: String,
    /// Class name without the prefix, e.g. `width-lt-500px`
    pub condition: String,
    /// Selector text preceding the occurrence, earlier occurrences removed
    pub base_selector: String,
    /// Byte range of the `.where-...` token in the input
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitSelector {
    /// Input with every condition token removed
    pub selector: String,
    pub occurrences: Vec<ConditionOccurrence>,
}

#[derive(Debug, Clone)]
pub struct SelectorSplitter {
    prefix: String,
    marker: String,
}

impl SelectorSplitter {
    /// `prefix` is the class prefix without the leading dot, e.g. `where-`
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            marker: format!(".{}", prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn split(&self, selector: &str) -> SplitSelector {
        let mut stripped = String::with_capacity(selector.len());
        let mut occurrences = Vec::new();
        let mut cursor = 0;

        while let Some(offset) = selector[cursor..].find(&self.marker) {
            let start = cursor + offset;
            let condition_start = start + self.marker.len();
            let end = selector[condition_start..]
                .find(char::is_whitespace)
                .map_or(selector.len(), |i| condition_start + i);

            stripped.push_str(&selector[cursor..start]);

            let condition = &selector[condition_start..end];
            occurrences.push(ConditionOccurrence {
                condition_class: format!("{}{}", self.prefix, condition),
                condition: condition.to_string(),
                base_selector: stripped.clone(),
                span: start..end,
            });

            cursor = end;
        }
        stripped.push_str(&selector[cursor..]);

        SplitSelector {
            selector: stripped,
            occurrences,
        }
    }

    /// Split `selector` and register every occurrence in `registry`.
    /// Returns the selector with all condition tokens removed.
    pub fn split_into(&self, selector: &str, registry: &mut ConditionRegistry) -> String {
        let split = self.split(selector);
        for occurrence in split.occurrences {
            registry.register(
                &occurrence.condition_class,
                &occurrence.condition,
                occurrence.base_selector,
            );
        }
        split.selector
    }
}

impl Default for SelectorSplitter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CLASS_PREFIX)
    }
}
