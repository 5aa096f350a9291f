//! Prompt domain
//!
//! Templates for every oracle request the council makes.

mod template;

pub use template::PromptTemplate;
