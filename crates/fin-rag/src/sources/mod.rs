//! Source gathering: KB search, live quotes and news under failure isolation

pub mod aggregator;
pub mod fanout;

pub use aggregator::{AggregatorSettings, SourceAggregator};
pub use fanout::{best_effort, best_effort_all, time_boxed};
