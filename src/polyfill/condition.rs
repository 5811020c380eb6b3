// SPDX-License-Identifier: MIT

//! Condition compiler
//!
//! Turns the condition part of a class name (`width-lt-500px`) into a
//! predicate over an element's computed style.

use super::comparator::Comparator;
use crate::host::Element;
use serde::Serialize;

/// Separator between the segments of a condition token
pub const TOKEN_DELIMITER: char = '-';

/// A parsed `<property>-<comparator>-<value>` triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionToken {
    pub property: String,
    pub comparator: Comparator,
    pub value: String,
}

impl ConditionToken {
    /// Returns `None` unless `token` has exactly three segments and the
    /// middle one names a known comparator.
    pub fn parse(token: &str) -> Option<Self> {
        let segments: Vec<&str> = token.split(TOKEN_DELIMITER).collect();
        let [property, comparator, value] = segments.as_slice() else {
            return None;
        };
        let comparator = Comparator::from_name(comparator)?;
        Some(Self {
            property: property.to_string(),
            comparator,
            value: value.to_string(),
        })
    }
}

/// A compiled condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Malformed condition; matches no element
    Never,
    /// Compare the live computed style against a literal
    Compare(ConditionToken),
}

impl Predicate {
    /// Evaluate against the element's current computed style
    pub fn matches<E: Element + ?Sized>(&self, element: &E) -> bool {
        match self {
            Predicate::Never => false,
            Predicate::Compare(token) => match element.computed_style(&token.property) {
                Some(actual) => token.comparator.compare(&actual, &token.value),
                None => false,
            },
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Predicate::Never)
    }
}

/// Compile a condition token. Malformed tokens compile to [`Predicate::Never`].
pub fn compile(condition: &str) -> Predicate {
    match ConditionToken::parse(condition) {
        Some(token) => Predicate::Compare(token),
        None => {
            log::warn!(
                "Condition '{}' is not of the form <property>-<comparator>-<value>; it will never match",
                condition
            );
            Predicate::Never
        }
    }
}
