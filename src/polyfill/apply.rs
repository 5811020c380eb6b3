// SPDX-License-Identifier: MIT

//! Apply cycle - toggles condition classes on the live document

use super::registry::ConditionRegistry;
use crate::host::{self, Document};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one apply cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub conditions: usize,
    pub elements_matched: usize,
    /// Class string writes that set a condition class
    pub classes_added: usize,
    /// Class string writes that cleared a condition class
    pub classes_removed: usize,
    pub failed_queries: usize,
}

impl CycleReport {
    pub fn mutations(&self) -> usize {
        self.classes_added + self.classes_removed
    }
}

pub struct ApplyCycle {
    registry: Arc<ConditionRegistry>,
}

impl ApplyCycle {
    pub fn new(registry: Arc<ConditionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConditionRegistry {
        &self.registry
    }

    /// Evaluate every condition against the elements selected by its base
    /// selectors. Elements outside the current match set keep their classes.
    pub fn run<D: Document + ?Sized>(&self, document: &D) -> CycleReport {
        let mut report = CycleReport {
            conditions: self.registry.len(),
            ..CycleReport::default()
        };

        for condition in self.registry.iter() {
            let selector = condition.union_selector();
            let elements = match document.query_selector_all(&selector) {
                Ok(elements) => elements,
                Err(e) => {
                    log::warn!("Skipping condition '{}': {}", condition.class_name(), e);
                    report.failed_queries += 1;
                    continue;
                }
            };

            report.elements_matched += elements.len();
            for element in &elements {
                let on = condition.predicate().matches(element);
                if host::toggle_class(element, condition.class_name(), on) {
                    if on {
                        report.classes_added += 1;
                    } else {
                        report.classes_removed += 1;
                    }
                }
            }
        }

        report
    }

    /// Bind the cycle to a document, yielding the zero-argument callable the
    /// scheduler invokes.
    pub fn bind<D>(
        self: Arc<Self>,
        document: Arc<D>,
    ) -> impl Fn() -> CycleReport + Send + Sync + 'static
    where
        D: Document + 'static,
    {
        move || self.run(document.as_ref())
    }
}
