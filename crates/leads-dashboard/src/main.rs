mod bootstrap;
mod report;

use anyhow::Result;
use leads_core::settings::Settings;
use leads_runtime::pipeline::LeadPipeline;
use leads_runtime::sources::FileSource;

use report::{OutputFormat, View};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Leads Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    if settings.clear {
        tracing::info!("Saved parameters cleared");
    }

    // Reject bad selectors before touching any file.
    let view: View = settings.view.parse()?;
    let format: OutputFormat = settings.format.parse()?;
    let metrics = report::parse_metrics(settings.metric.as_deref())?;

    let pipeline = LeadPipeline::load(
        &FileSource::new(&settings.master_data),
        &FileSource::new(&settings.contracts),
    )
    .await;

    for load in pipeline.load_reports() {
        if load.is_unavailable() {
            continue;
        }
        tracing::info!(
            "{}: {} of {} rows loaded, {} rejected",
            load.source,
            load.decoded,
            load.data_lines,
            load.rejected.len()
        );
        if load.prefix_cells + load.fallback_cells > 0 {
            tracing::warn!(
                "{}: {} numeric cells read from a leading number, {} read as 0",
                load.source,
                load.prefix_cells,
                load.fallback_cells
            );
        }
    }

    if settings.start.is_some() != settings.end.is_some() {
        tracing::warn!("Both --start and --end are needed to filter; showing all dates");
    }
    let dashboard = pipeline.view(settings.start.as_deref(), settings.end.as_deref())?;

    let output = report::render(&dashboard, pipeline.companies(), view, format, &metrics)?;
    print!("{}", output);

    Ok(())
}
