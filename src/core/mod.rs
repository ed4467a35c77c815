pub mod encoding;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod pdf;
pub mod renderer;

pub use crate::domain::model::{ClinicPeriodMetrics, ProviderMetric};
pub use crate::domain::ports::{PageDecorator, PageHooks, Storage};
pub use crate::utils::error::{RenderError, Result};
