// SPDX-License-Identifier: MIT

//! Host document contract
//!
//! The polyfill only needs four things from its host:
//! - the loaded stylesheets and their rules' selector text
//! - a selector query returning matching elements
//! - computed style reads keyed by property name
//! - read/write access to an element's class string

pub mod memory;

use crate::error::HostError;
use serde::{Deserialize, Serialize};

/// A single rule of a stylesheet.
///
/// Rules that carry no selector (`@media`, `@font-face`, ...) have
/// `selector_text == None` and are skipped by the scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssRule {
    #[serde(default, alias = "selector")]
    pub selector_text: Option<String>,
}

impl CssRule {
    pub fn style(selector_text: impl Into<String>) -> Self {
        Self {
            selector_text: Some(selector_text.into()),
        }
    }

    pub fn at_rule() -> Self {
        Self {
            selector_text: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSheet {
    #[serde(default)]
    pub rules: Vec<CssRule>,
}

impl StyleSheet {
    pub fn new(rules: Vec<CssRule>) -> Self {
        Self { rules }
    }
}

/// Handle to a live element of the host document
pub trait Element {
    /// Resolved value of `property`, e.g. `"500px"` for `width`
    fn computed_style(&self, property: &str) -> Option<String>;

    fn class_name(&self) -> String;

    fn set_class_name(&self, value: &str);
}

/// The host document
pub trait Document: Send + Sync {
    type Element: Element;

    fn style_sheets(&self) -> Vec<StyleSheet>;

    /// All elements matching `selector`, in document order.
    ///
    /// An empty selector matches nothing and is not an error.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, HostError>;
}

/// Set membership of `class` in the element's class string to `on`.
///
/// Every whole-word occurrence of `class` is removed and, when `on`, a
/// single occurrence is appended. The class string is written only when the
/// resulting class list differs from the current one. Returns whether a
/// write happened.
pub fn toggle_class<E: Element + ?Sized>(element: &E, class: &str, on: bool) -> bool {
    let current = element.class_name();
    let mut next: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
    if on {
        next.push(class);
    }

    if next.iter().copied().eq(current.split_whitespace()) {
        return false;
    }

    element.set_class_name(&next.join(" "));
    true
}

/// Whether `class` is present in the element's class string
pub fn has_class<E: Element + ?Sized>(element: &E, class: &str) -> bool {
    element.class_name().split_whitespace().any(|c| c == class)
}
