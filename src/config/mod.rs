pub mod cli;
pub mod layout;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "clinic-report")]
#[command(about = "Render a monthly clinical productivity report as PDF")]
pub struct CliConfig {
    /// Aggregated metrics for one clinic and period, as JSON
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "performance_report.pdf")]
    pub file_name: String,

    /// Optional TOML file overriding the page layout
    #[arg(long)]
    pub layout: Option<String>,

    #[arg(long, help = "Order providers by descending wRVU before rendering")]
    pub sort_by_volume: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_path("file_name", &self.file_name)?;
        validate_file_extension("file_name", &self.file_name, &["pdf"])?;
        if let Some(layout) = &self.layout {
            validate_path("layout", layout)?;
            validate_file_extension("layout", layout, &["toml"])?;
        }
        Ok(())
    }
}
