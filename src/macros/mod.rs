//! Declarative macros for building dimension tables with less boilerplate.

pub mod dim_macros;

// Re-export all macros
pub use dim_macros::*;
