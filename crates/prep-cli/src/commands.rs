use anyhow::{Context, Result};
use tracing::info_span;

use prep_cli::pipeline::{DataProcessor, PipelinePaths};
use prep_cli::summary::render_config;
use prep_ingest::load_config;
use prep_model::RunSummary;

use crate::cli::{ProcessArgs, ShowConfigArgs};

pub fn run_process(args: &ProcessArgs) -> Result<RunSummary> {
    let config = load_config(&args.config)?;
    let _span = info_span!("process", config = %args.config.display()).entered();
    let paths = PipelinePaths::new(&args.train, &args.test, &args.output_dir);
    let summary = DataProcessor::new(config, paths).process()?;
    Ok(summary)
}

pub fn run_show_config(args: &ShowConfigArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let rendered = render_config(&config).context("render configuration")?;
    print!("{rendered}");
    Ok(())
}
