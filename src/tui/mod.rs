//! TUI module: Terminal User Interface using Ratatui.
//!
//! Screens:
//! - Home with session status and stroke education
//! - Risk assessment intake form
//! - Results with risk gauge and contribution chart
//! - Band-specific recommendations

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
pub use worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};
