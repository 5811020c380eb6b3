// SPDX-License-Identifier: MIT

//! Polyfill engine
//!
//! Owns the compiled registry for one document and exposes one-shot and
//! scheduled application.

use super::apply::{ApplyCycle, CycleReport};
use super::registry::ConditionRegistry;
use super::scanner::StylesheetScanner;
use super::scheduler::{IntervalTrigger, Scheduler, Trigger};
use super::splitter::SelectorSplitter;
use crate::config::EngineConfig;
use crate::error::WhereError;
use crate::host::Document;
use std::sync::Arc;

pub use super::scheduler::SchedulerHandle;

pub struct Engine<D: Document + 'static> {
    document: Arc<D>,
    config: EngineConfig,
    scanner: StylesheetScanner,
    cycle: Arc<ApplyCycle>,
}

impl<D: Document + 'static> Engine<D> {
    /// Validate `config` and scan the document's stylesheets once
    pub fn new(document: Arc<D>, config: EngineConfig) -> Result<Self, WhereError> {
        config.validate()?;
        let scanner = StylesheetScanner::new(SelectorSplitter::new(&config.class_prefix));
        let registry = scanner.scan(document.as_ref());
        Ok(Self {
            document,
            config,
            scanner,
            cycle: Arc::new(ApplyCycle::new(Arc::new(registry))),
        })
    }

    pub fn registry(&self) -> &ConditionRegistry {
        self.cycle.registry()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &Arc<D> {
        &self.document
    }

    /// Rebuild the registry from the document's current stylesheets.
    ///
    /// Schedulers already running keep the registry they were started with.
    pub fn rescan(&mut self) -> &ConditionRegistry {
        let registry = self.scanner.scan(self.document.as_ref());
        self.cycle = Arc::new(ApplyCycle::new(Arc::new(registry)));
        self.cycle.registry()
    }

    pub fn apply_once(&self) -> CycleReport {
        self.cycle.run(self.document.as_ref())
    }

    /// Poll every `poll_interval_ms` until the handle is stopped or dropped
    pub fn start(&self) -> SchedulerHandle {
        self.start_with(Scheduler::new(IntervalTrigger::new(
            self.config.poll_interval(),
        )))
    }

    pub fn start_with<T: Trigger + 'static>(&self, scheduler: Scheduler<T>) -> SchedulerHandle {
        log::info!(
            "Starting scheduler for {} condition class(es)",
            self.registry().len()
        );
        scheduler.spawn(Arc::clone(&self.cycle).bind(Arc::clone(&self.document)))
    }
}
