use clap::Parser;
use parquet2hive::runner::{
    DatasetOptionsBuilder, GenerateArgs, GenerateSettings, OutputFormat, SchemaSource,
    run_generate,
};

/// Generate Hive external table DDL for versioned Parquet datasets
#[derive(Parser, Clone)]
struct Args {
    /// Dataset location (s3://bucket/prefix, file:// URI or local path)
    location: String,

    /// Treat every sub-prefix of the location as a separate dataset
    #[arg(long)]
    prefix: bool,

    /// Only use files whose directory contains a _SUCCESS marker
    #[arg(long)]
    success_only: bool,

    /// Load at most this many versions, newest first
    #[arg(long)]
    recent_versions: Option<usize>,

    /// Load only this version (e.g. v3)
    #[arg(long)]
    dataset_version: Option<String>,

    /// Table name to use instead of the dataset name
    #[arg(long, conflicts_with = "prefix")]
    alias: Option<String>,

    /// Exclude keys matching this regex, anchored at the start of the key (repeatable)
    #[arg(long = "exclude-regex")]
    exclude_regex: Vec<String>,

    /// Emit raw SQL instead of hive command lines
    #[arg(long)]
    sql: bool,

    /// Schema to compile from (parquet, avro)
    #[arg(long, default_value = "parquet")]
    schema_source: String,

    /// Custom S3 endpoint for S3-compatible stores
    #[arg(long)]
    endpoint_url: Option<String>,

    /// AWS region (optional, taken from the environment if not specified)
    #[arg(short, long)]
    region: Option<String>,

    /// Quiet mode - only warnings on stderr, no progress or summary
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr, stdout carries the generated script
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if args.quiet {
        EnvFilter::new("parquet2hive=warn")
    } else {
        EnvFilter::new("parquet2hive=info")
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let mut options = DatasetOptionsBuilder::default();
    options
        .success_only(args.success_only)
        .exclude_patterns(args.exclude_regex.clone());
    if let Some(n) = args.recent_versions {
        options.recent_versions(n);
    }
    if let Some(version) = &args.dataset_version {
        options.version(version);
    }
    if let Some(alias) = &args.alias {
        options.alias(alias);
    }

    let settings = GenerateSettings {
        prefix_mode: args.prefix,
        options: options.build()?,
        output: if args.sql {
            OutputFormat::Sql
        } else {
            OutputFormat::Hive
        },
        schema_source: SchemaSource::parse(&args.schema_source)?,
        quiet: args.quiet,
    };

    let result = run_generate(GenerateArgs {
        location: args.location.clone(),
        settings,
        endpoint_url: args.endpoint_url.clone(),
        region: args.region.clone(),
    })
    .await?;

    print!("{}", result.script());

    if !args.quiet {
        let stats = &result.stats;
        eprintln!();
        eprintln!("Generation Summary");
        eprintln!("==================");
        eprintln!("Datasets processed: {}", stats.datasets_succeeded());
        eprintln!("Datasets failed: {}", stats.datasets_failed);
        eprintln!("Tables generated: {}", stats.tables_generated);
        eprintln!("Versions or prefixes skipped: {}", stats.versions_skipped);
        eprintln!("Duration: {:.2}s", result.duration.as_secs_f64());
    }

    if result.stats.datasets_failed > 0 && !args.prefix {
        anyhow::bail!("Failed to process {}", args.location);
    }

    Ok(())
}
