//! Knowledge search adapters.

mod duckduckgo;

pub use duckduckgo::DuckDuckGoSearch;
