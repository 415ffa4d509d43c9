//! High-level runner API for the DDL generator.
//!
//! This module wires the object store, the resolver and the compiler together
//! behind one entry point. It is the primary API for the CLI.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::ddl::compile_footer;
use crate::formats::parquet::{FooterSchema, read_footer_schema};
use crate::io::{DatasetUri, LocalObjectStore, ObjectStore, S3ObjectStore, dir_prefix};
use crate::resolver::{self, CompileRequest, SuccessMarkerCache};
use crate::telemetry::{RunStats, TelemetryEvent};

pub use crate::ddl::SchemaSource;
pub use crate::resolver::{DatasetOptions, DatasetOptionsBuilder};

/// How each table's statements are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Raw SQL, one table per line
    Sql,
    /// One Hive CLI command line per table
    #[default]
    Hive,
}

/// Everything one run needs apart from the object store
#[derive(Debug, Clone, Default)]
pub struct GenerateSettings {
    /// Treat every sub-prefix of the location as a dataset root
    pub prefix_mode: bool,
    pub options: DatasetOptions,
    pub output: OutputFormat,
    pub schema_source: SchemaSource,
    pub quiet: bool,
}

/// Arguments for running DDL generation
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Dataset (or, in prefix mode, parent prefix) location: `s3://...`, `file://...` or a path
    pub location: String,
    pub settings: GenerateSettings,

    // S3 client configuration
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

/// Result of a completed run
#[derive(Debug)]
pub struct GenerateResult {
    /// One rendered table per entry, in output order
    pub statements: Vec<String>,
    pub stats: RunStats,
    pub duration: Duration,
}

impl GenerateResult {
    /// The statements joined into a script, one per line
    pub fn script(&self) -> String {
        self.statements
            .iter()
            .map(|s| format!("{}\n", s))
            .collect()
    }
}

/// Run DDL generation with the specified arguments
///
/// # Example
///
/// ```no_run
/// use parquet2hive::runner::{GenerateArgs, GenerateSettings, run_generate};
///
/// # async fn example() -> anyhow::Result<()> {
/// let args = GenerateArgs {
///     location: "s3://my-bucket/telemetry/churn".to_string(),
///     settings: GenerateSettings::default(),
///     endpoint_url: None,
///     region: None,
/// };
///
/// let result = run_generate(args).await?;
/// print!("{}", result.script());
/// # Ok(())
/// # }
/// ```
pub async fn run_generate(args: GenerateArgs) -> Result<GenerateResult> {
    let uri = DatasetUri::parse(&args.location)?;

    let store: Box<dyn ObjectStore> = match &uri {
        DatasetUri::S3 { bucket, .. } => {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = &args.region {
                loader = loader.region(Region::new(region.clone()));
            }
            let aws_config = loader.load().await;
            Box::new(S3ObjectStore::from_config(
                &aws_config,
                args.endpoint_url.as_deref(),
                bucket.clone(),
            ))
        }
        DatasetUri::Local(_) => Box::new(LocalObjectStore::new("/")),
    };

    generate_for_store(store.as_ref(), &uri.prefix(), &args.settings).await
}

/// Generate DDL for the dataset (or datasets) at `prefix` in `store`
///
/// A failing dataset is reported and skipped; it never stops the others.
pub async fn generate_for_store(
    store: &dyn ObjectStore,
    prefix: &str,
    settings: &GenerateSettings,
) -> Result<GenerateResult> {
    let start = Instant::now();

    // Every dataset under a prefix would compile into the same tables
    if settings.prefix_mode && settings.options.alias.is_some() {
        anyhow::bail!("An alias cannot be used when generating a whole prefix");
    }

    let datasets = if settings.prefix_mode {
        store
            .list_prefixes(&dir_prefix(prefix))
            .await
            .with_context(|| format!("Failed to list datasets under {}", store.location(prefix)))?
    } else {
        vec![prefix.to_string()]
    };
    info!("Found {} dataset(s) under {}", datasets.len(), store.location(prefix));

    let (telemetry_tx, telemetry_rx) = mpsc::unbounded_channel();
    let show_progress = settings.prefix_mode && !settings.quiet;
    let progress_handle = setup_progress_tracking(show_progress, datasets.len(), telemetry_rx)?;

    // Success markers are cached for this run only
    let mut markers = SuccessMarkerCache::new();
    let mut statements = Vec::new();

    for dataset in &datasets {
        let _ = telemetry_tx.send(TelemetryEvent::DatasetStarted);

        match generate_dataset(store, dataset, settings, &mut markers, &telemetry_tx).await {
            Ok(lines) => {
                for _ in &lines {
                    let _ = telemetry_tx.send(TelemetryEvent::TableGenerated);
                }
                statements.extend(lines);
            }
            Err(e) => {
                warn!("Failed to process {}, {:#}", dataset, e);
                let _ = telemetry_tx.send(TelemetryEvent::DatasetFailed);
            }
        }
    }

    // Close the channel so the tracking task finishes
    drop(telemetry_tx);
    let stats = progress_handle
        .await
        .context("Progress tracking task failed")?;

    Ok(GenerateResult {
        statements,
        stats,
        duration: start.elapsed(),
    })
}

/// Plan, read and compile one dataset; all or nothing
async fn generate_dataset(
    store: &dyn ObjectStore,
    dataset_prefix: &str,
    settings: &GenerateSettings,
    markers: &mut SuccessMarkerCache,
    telemetry_tx: &mpsc::UnboundedSender<TelemetryEvent>,
) -> Result<Vec<String>> {
    let plan = resolver::plan(store, dataset_prefix, &settings.options, markers).await?;
    for _ in &plan.skipped {
        let _ = telemetry_tx.send(TelemetryEvent::VersionSkipped);
    }

    let mut lines = Vec::with_capacity(plan.requests.len());
    // The alias request reuses the footer of the versioned one
    let mut last_footer: Option<(String, FooterSchema)> = None;

    for request in &plan.requests {
        let footer = match last_footer.take() {
            Some((key, footer)) if key == request.object_key => footer,
            _ => read_schema(store, request).await?,
        };

        let ddl = compile_footer(
            &footer,
            settings.schema_source,
            &request.table_name,
            &request.location,
            &request.partitions,
        )
        .with_context(|| format!("Failed to compile {}", request.table_name))?;

        lines.push(match settings.output {
            OutputFormat::Sql => ddl.sql().to_string(),
            OutputFormat::Hive => ddl.to_hive_command()?,
        });
        last_footer = Some((request.object_key.clone(), footer));
    }

    Ok(lines)
}

async fn read_schema(store: &dyn ObjectStore, request: &CompileRequest) -> Result<FooterSchema> {
    let reader = store.reader(&request.object_key);
    read_footer_schema(reader.as_ref())
        .await
        .with_context(|| {
            format!(
                "Failed to read schema from {}",
                store.location(&request.object_key)
            )
        })
}

/// Spawn the task that folds telemetry into stats and drives the progress bar
fn setup_progress_tracking(
    show_progress: bool,
    total_datasets: usize,
    mut telemetry_rx: mpsc::UnboundedReceiver<TelemetryEvent>,
) -> Result<tokio::task::JoinHandle<RunStats>> {
    let bar = if show_progress {
        let bar = ProgressBar::new(total_datasets as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] Datasets: [{bar:30.cyan/blue}] {pos}/{len} | {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("=>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    Ok(tokio::spawn(async move {
        let mut stats = RunStats::new();

        while let Some(event) = telemetry_rx.recv().await {
            stats.update(&event);

            if let TelemetryEvent::DatasetStarted = event {
                // The dataset being started is not done yet
                bar.set_position(stats.datasets_started.saturating_sub(1) as u64);
            }
            bar.set_message(format!(
                "{} tables, {} failed",
                stats.tables_generated, stats.datasets_failed
            ));
        }

        bar.set_position(stats.datasets_started as u64);
        bar.finish_with_message(format!(
            "{} tables, {} failed",
            stats.tables_generated, stats.datasets_failed
        ));
        stats
    }))
}
