//! Read-side analysis of the ledger.
//!
//! Produces two series for charting: response time per round, and mean
//! response time per blur level. Drawing is left to a [`Renderer`].

mod render;
mod report;

pub use render::{JsonReportWriter, RenderError, Renderer};
pub use report::{BlurLevelTiming, TimingPoint, TimingReport};
