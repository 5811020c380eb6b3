// SPDX-License-Identifier: MIT

//! Stylesheet scanner - builds the condition registry from the document

use super::registry::ConditionRegistry;
use super::splitter::SelectorSplitter;
use crate::host::{CssRule, Document, StyleSheet};

/// Separator between the selectors of a rule's selector text
pub const RULE_SELECTOR_SEPARATOR: &str = ", ";

pub struct StylesheetScanner {
    splitter: SelectorSplitter,
}

impl StylesheetScanner {
    pub fn new(splitter: SelectorSplitter) -> Self {
        Self { splitter }
    }

    /// Scan every rule of every stylesheet of `document`
    pub fn scan<D: Document + ?Sized>(&self, document: &D) -> ConditionRegistry {
        let sheets = document.style_sheets();
        let registry = self.scan_sheets(&sheets);
        log::info!(
            "Scanned {} stylesheet(s), found {} condition class(es)",
            sheets.len(),
            registry.len()
        );
        registry
    }

    pub fn scan_sheets(&self, sheets: &[StyleSheet]) -> ConditionRegistry {
        let mut registry = ConditionRegistry::new();
        for rule in sheets.iter().flat_map(|sheet| &sheet.rules) {
            self.scan_rule(rule, &mut registry);
        }
        registry
    }

    fn scan_rule(&self, rule: &CssRule, registry: &mut ConditionRegistry) {
        let Some(selector_text) = &rule.selector_text else {
            return;
        };
        for selector in selector_text.split(RULE_SELECTOR_SEPARATOR) {
            self.splitter.split_into(selector, registry);
        }
    }
}

impl Default for StylesheetScanner {
    fn default() -> Self {
        Self::new(SelectorSplitter::default())
    }
}
