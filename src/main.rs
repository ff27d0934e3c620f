use anyhow::Context;
use clap::Parser;
use oncotwin_core::{ProfileBuilder, ProfileSet, RankingConfig};
use oncotwin_similarity::{Ranker, ScoreSummary, SimilarityEngine};
use oncotwin_storage::{dump_profiles, load_config, ConfigPaths, InputDir, OutputWriter};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Rank the most similar patients ("twins") for every patient
#[derive(Parser, Debug)]
#[command(name = "oncotwin")]
#[command(about = "Patient twin matching over genomic and clinical profiles", long_about = None)]
struct Args {
    /// Directory holding the snv/cnv/fusion/clinical tables
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Directory for match output
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Rank only this patient
    #[arg(long)]
    single: Option<String>,

    /// Write JSON instead of the flat CSV table
    #[arg(long)]
    json_output: bool,

    /// Directory holding column_subsets.json and weights.json
    #[arg(long, default_value = "./config")]
    config_dir: PathBuf,

    /// Weights file, overrides the config directory
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Column subsets file, overrides the config directory
    #[arg(long)]
    subsets: Option<PathBuf>,

    /// Doctor ID attached to every match
    #[arg(long)]
    doctor_id: Option<i64>,

    /// Matches kept per query patient
    #[arg(long, default_value_t = oncotwin_core::DEFAULT_TOP_N)]
    top_n: usize,

    /// Worker threads (default: available cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Dump every built profile as JSON into this directory
    #[arg(long)]
    dump_profiles: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn run_single(
    ranker: &Ranker,
    profiles: &ProfileSet,
    writer: &OutputWriter,
    query_id: &str,
    json_output: bool,
) -> anyhow::Result<()> {
    let records = ranker.rank_one(profiles, query_id)?;
    if json_output {
        writer.write_single_json(query_id, &records)?;
    } else {
        writer.write_single_csv(query_id, &records, profiles)?;
    }
    Ok(())
}

fn run_batch(ranker: &Ranker, profiles: &ProfileSet, writer: &OutputWriter, json_output: bool) -> anyhow::Result<()> {
    let records = ranker.rank_all(profiles);
    let summary = ScoreSummary::compute(&records);
    info!(
        "Score summary: count={} mean={:.4} std={:.4} min={:.4} median={:.4} max={:.4}",
        summary.count, summary.mean, summary.std, summary.min, summary.median, summary.max
    );

    writer.write_batch_csv(&records, profiles)?;
    if json_output {
        writer.write_batch_json(&records)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting oncotwin v{}", env!("CARGO_PKG_VERSION"));
    info!("Input directory: {:?}", args.input_dir);
    info!("Output directory: {:?}", args.output_dir);

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure worker pool")?;
    }

    let paths = ConfigPaths::in_dir(&args.config_dir).with_overrides(args.subsets.clone(), args.weights.clone());
    let ranking = RankingConfig {
        top_n: args.top_n,
        single_top_n: args.top_n,
        ..Default::default()
    };
    let config = load_config(&paths, ranking);

    let tables = InputDir::new(&args.input_dir).load_all()?;
    let profiles = ProfileBuilder::new(config.subsets.clone()).build(&tables)?;

    if let Some(dir) = &args.dump_profiles {
        dump_profiles(dir, &profiles)?;
    }

    let ranker = Ranker::new(SimilarityEngine::new(config.weights.clone()), config.ranking.clone())
        .with_doctor_id(args.doctor_id);
    let writer = OutputWriter::new(&args.output_dir)?;

    match &args.single {
        Some(query_id) => run_single(&ranker, &profiles, &writer, query_id, args.json_output)?,
        None => run_batch(&ranker, &profiles, &writer, args.json_output)?,
    }

    info!("Done");
    Ok(())
}
