//! Aspirate Helm - Helm chart output
//!
//! Generated objects are post-processed into templates, their configuration
//! and images extracted into a values tree that is deduplicated into
//! per-resource and `global` sections, and the result written as a chart.

pub mod chart;
pub mod error;
pub mod naming;
pub mod postprocess;
pub mod values;

pub use chart::{ChartMetadata, ChartOutput, HelmChartCreator};
pub use error::{HelmError, Result};
pub use naming::kebab_to_camel;
pub use postprocess::{ImageReference, PostProcessor};
pub use values::{ChartValues, GlobalValues, ImageValues, ResourceValues, ValuesTree};
