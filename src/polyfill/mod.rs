// SPDX-License-Identifier: MIT

//! Condition-class polyfill core
//!
//! - `comparator` - named integer-prefix comparisons
//! - `condition` - compiles `width-lt-500px` into a predicate
//! - `splitter` - extracts condition classes and base selectors
//! - `scanner` - builds the registry from every stylesheet rule
//! - `apply` - one pass toggling classes on matched elements
//! - `scheduler` - repeats the pass on a trigger
//! - `engine` - ties the above to one document

pub mod apply;
pub mod comparator;
pub mod condition;
pub mod engine;
pub mod registry;
pub mod scanner;
pub mod scheduler;
pub mod splitter;

pub use apply::{ApplyCycle, CycleReport};
pub use comparator::Comparator;
pub use condition::{compile, ConditionToken, Predicate};
pub use registry::{Condition, ConditionRegistry};
pub use scanner::StylesheetScanner;
pub use scheduler::{IntervalTrigger, Scheduler, Trigger};
pub use splitter::{ConditionOccurrence, SelectorSplitter, SplitSelector};
