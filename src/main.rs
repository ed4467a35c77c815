use anyhow::Context;
use clap::Parser;
use clinic_report::core::Storage;
use clinic_report::utils::error::{ErrorSeverity, ReportError};
use clinic_report::utils::{logger, validation::Validate};
use clinic_report::{ClinicPeriodMetrics, CliConfig, LayoutConfig, LocalStorage, ReportRenderer};

fn load_metrics(storage: &LocalStorage, path: &str) -> anyhow::Result<ClinicPeriodMetrics> {
    let raw = storage
        .read_file(path)
        .with_context(|| format!("reading metrics from {}", path))?;
    let metrics = serde_json::from_slice(&raw)
        .map_err(ReportError::from)
        .with_context(|| format!("parsing metrics JSON in {}", path))?;
    Ok(metrics)
}

fn load_layout(path: Option<&str>) -> clinic_report::Result<LayoutConfig> {
    let config = match path {
        Some(path) => {
            tracing::info!("Loading layout from: {}", path);
            LayoutConfig::from_file(path)?
        }
        None => LayoutConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(err: &ReportError) -> ! {
    tracing::error!(
        "Report generation failed: {} (Category: {:?}, Severity: {:?})",
        err,
        err.category(),
        err.severity()
    );
    tracing::error!("Recovery suggestion: {}", err.recovery_suggestion());
    eprintln!("{}", err.user_friendly_message());
    eprintln!("Suggestion: {}", err.recovery_suggestion());
    std::process::exit(exit_code(err.severity()));
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting clinic-report CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let layout = match load_layout(config.layout.as_deref()) {
        Ok(layout) => layout,
        Err(e) => fail(&e),
    };

    let input_storage = LocalStorage::new(String::new());
    let mut metrics = match load_metrics(&input_storage, &config.input) {
        Ok(metrics) => metrics,
        Err(e) => match e.downcast_ref::<ReportError>() {
            Some(report_error) => {
                tracing::error!("{:#}", e);
                fail(report_error)
            }
            None => return Err(e),
        },
    };
    if config.sort_by_volume {
        metrics = metrics.sorted_by_volume();
    }

    let renderer = ReportRenderer::new(layout);
    let bytes = match renderer.render(&metrics) {
        Ok(bytes) => bytes,
        Err(e) => fail(&ReportError::from(e)),
    };

    let output = LocalStorage::new(config.output_path.clone());
    if let Err(e) = output.write_file(&config.file_name, &bytes) {
        fail(&e);
    }

    let output_file = std::path::Path::new(output.base_path()).join(&config.file_name);
    tracing::info!(
        "Report written to {} ({} bytes)",
        output_file.display(),
        bytes.len()
    );
    println!("Report written to {}", output_file.display());

    Ok(())
}
