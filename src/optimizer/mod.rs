//! Cost estimation for query planning.
//!
//! # Components
//! - [`IntHistogram`] / [`StringHistogram`] - equal-width selectivity histograms
//! - [`TableStats`] - per-table scan cost, cardinality, and selectivity estimates

mod int_histogram;
mod string_histogram;
mod table_stats;

pub use int_histogram::IntHistogram;
pub use string_histogram::StringHistogram;
pub use table_stats::TableStats;
