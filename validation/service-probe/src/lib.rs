//! Keyword-style checks against OGC WFS/WMS services.
//!
//! This crate provides:
//! - `ServiceProbe`: connectivity, WFS layer counts and lookups, WMS layer
//!   lookups, GetMap smoke tests and image size measurement
//! - A keyword vocabulary so steps can be named in plain text
//! - A YAML suite runner with table and JSON reports

pub mod config;
pub mod error;
pub mod keywords;
pub mod probe;
pub mod report;
pub mod suite;

pub use config::{KilobyteRounding, ProbeConfig};
pub use error::{ErrorKind, ProbeError, ProbeResult};
pub use keywords::{Keyword, StepValue};
pub use probe::{ServiceProbe, MAP_SIZE, PNG_FORMAT};
pub use report::{CaseReport, FailedStep, ResultsReport, SuiteReport};
pub use suite::{Step, Suite, SuiteRunner, TestCase};
