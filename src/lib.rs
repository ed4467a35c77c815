pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, layout::LayoutConfig};
pub use core::renderer::{render, ReportRenderer};
pub use domain::model::{ClinicPeriodMetrics, ProviderMetric};
pub use utils::error::{RenderError, ReportError, Result};
