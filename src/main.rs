use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use patient_outcomes::utils::io::{read_records, write_predictions, write_table};
use patient_outcomes::{
    Error, MalformedPolicy, ModelSchema, Pipeline, PipelineConfig, PrecomputedPredictor, Result,
    Target, prepare_features,
};

#[derive(Parser, Debug)]
#[command(
    name = "patient-outcomes",
    about = "Engineer model features from patient records and assemble outcome predictions."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build, encode and align features for a model schema
    Features {
        #[command(flatten)]
        common: CommonArgs,
        /// JSON list of the model's training columns
        #[arg(long)]
        schema: PathBuf,
        /// Feature table to write (.csv or .parquet)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Assemble predictions from a model's precomputed output
    Predict {
        #[command(flatten)]
        common: CommonArgs,
        /// JSON with the model's columns and its predictions
        #[arg(long)]
        model: PathBuf,
        /// Prediction set to write (.json or .parquet)
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Patient records (.csv or .parquet)
    #[arg(short, long)]
    input: PathBuf,
    /// Outcome to predict: admission, discharge or los
    #[arg(short, long)]
    target: Target,
    /// Pipeline configuration overriding the target's preset
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skip records with unusable admission or discharge times instead of failing
    #[arg(long)]
    drop_malformed: bool,
}

impl CommonArgs {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let config = match &self.config {
            Some(path) => load_config(path, self.target)?,
            None => PipelineConfig::for_target(self.target),
        };
        Ok(if self.drop_malformed {
            config.with_malformed_policy(MalformedPolicy::DropRecord)
        } else {
            config
        })
    }
}

fn load_config(path: &Path, target: Target) -> Result<PipelineConfig> {
    let config = PipelineConfig::from_path(path)?;
    if config.target != target {
        return Err(Error::InvalidConfig(format!(
            "{} configures target '{}' but '{target}' was requested",
            path.display(),
            config.target
        ))
        .into());
    }
    Ok(config)
}

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Command::Features {
            common,
            schema,
            output,
        } => {
            let config = common.pipeline_config()?;
            let schema = ModelSchema::from_path(&schema)?;
            let records = read_records(&common.input)?;
            let prepared = prepare_features(&config, &records, &schema)?;
            write_table(&output, &prepared.aligned.table)?;
            info!(
                "Wrote {} {} feature rows ({} columns zero-filled, {} records rejected) to {}",
                prepared.aligned.table.num_rows(),
                config.target,
                prepared.aligned.report.zero_filled_count(),
                prepared.rejected.len(),
                output.display()
            );
        }
        Command::Predict {
            common,
            model,
            output,
        } => {
            let config = common.pipeline_config()?;
            let predictor = PrecomputedPredictor::from_path(&model)?;
            let pipeline = Pipeline::new(config, Box::new(predictor))?;
            let records = read_records(&common.input)?;
            let predictions = pipeline.run(&records)?;
            write_predictions(&output, &predictions)?;
            info!(
                "Wrote {} {} predictions to {}",
                predictions.len(),
                pipeline.target(),
                output.display()
            );
        }
    }
    Ok(())
}
