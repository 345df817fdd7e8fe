//! CLI library components for the endpoint derivation tool.

pub mod logging;
pub mod pipeline;
