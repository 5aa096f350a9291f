//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelDescriptor`]: a model offered by the oracle catalog
//! - [`error::DomainError`]: domain-level errors
//! - [`json`]: structured-data extraction from model responses
//! - [`output_format::OutputFormat`]: how a finished discussion is rendered
//! - [`validation`]: configuration issue reporting

pub mod error;
pub mod json;
pub mod model;
pub mod output_format;
pub mod string;
pub mod time;
pub mod validation;
