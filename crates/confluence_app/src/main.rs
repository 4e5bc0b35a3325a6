mod cli;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use confluence_engine::{
    DocumentTreeBuilder, FileProcessor, PandocConverter, ProcessingStats, ProcessorConfig,
};
use engine_logging::{engine_debug, engine_info};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);

    let level = config.level_filter()?;
    logging::initialize(level, config.log_file.as_deref());
    engine_debug!("Configuration: {config:?}");
    if !config.standard_html_classes.is_empty() {
        engine_info!(
            "standard_html_classes configured for {} tags (not applied)",
            config.standard_html_classes.len()
        );
    }

    match &cli.command {
        Commands::Process(args) => run_process(&config, args.dry_run),
        Commands::Tree(args) => run_tree(&config, args.dry_run),
    }
}

fn directories(config: &AppConfig) -> Result<(PathBuf, PathBuf)> {
    let input = config.input_directory.clone().ok_or_else(|| {
        anyhow!("input directory must be given with --input or in the configuration file")
    })?;
    let output = config.output_directory.clone().ok_or_else(|| {
        anyhow!("output directory must be given with --output or in the configuration file")
    })?;
    Ok((input, output))
}

fn run_process(config: &AppConfig, dry_run: bool) -> Result<()> {
    let (input_dir, output_dir) = directories(config)?;
    let processor_config = ProcessorConfig {
        create_docx: config.create_docx,
        dry_run,
        cleaner: config.cleaner_settings()?,
        ..ProcessorConfig::new(input_dir, output_dir)
    };
    let mut processor = FileProcessor::new(processor_config)?
        .with_converter(Box::new(PandocConverter::new(&config.docx_converter)));
    let stats = processor.process_files().context("processing export")?;
    print_summary(&stats, dry_run);
    Ok(())
}

fn run_tree(config: &AppConfig, dry_run: bool) -> Result<()> {
    let (input_dir, output_dir) = directories(config)?;
    let builder = DocumentTreeBuilder::new(&input_dir, config.tree_settings());
    let tree = builder
        .build()
        .with_context(|| format!("building document tree from {}", input_dir.display()))?;
    let export = builder.export(&tree, &output_dir, dry_run)?;
    match export.written_to {
        Some(path) => println!("Document tree written to {}", path.display()),
        None => print!("{}", export.content),
    }
    Ok(())
}

fn print_summary(stats: &ProcessingStats, dry_run: bool) {
    let heading = if dry_run {
        "Dry run summary"
    } else {
        "Processing summary"
    };
    println!("{heading}:");
    println!("  Total input files:   {}", stats.total_input_files);
    println!("  Processed:           {}", stats.processed_files);
    println!("  Failed:              {}", stats.failed_files);
    println!("  DOCX created:        {}", stats.created_docx);
    println!("  Not processed:       {}", stats.files_not_processed);
    if !stats.errors.is_empty() {
        println!("Errors:");
        for error in &stats.errors {
            println!("  - {error}");
        }
    }
}
