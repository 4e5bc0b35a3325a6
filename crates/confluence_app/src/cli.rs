use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use confluence_engine::TreeFormat;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "confluence-export")]
#[command(about = "Clean Confluence HTML space exports and index them by breadcrumb")]
#[command(version)]
pub struct Cli {
    /// RON configuration file; command-line flags override its values
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also write log records to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean every page and organize the output by breadcrumb
    Process(ProcessArgs),
    /// Write a document tree (outline or table) of an export
    Tree(TreeArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Directory holding the exported HTML files
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Directory receiving the cleaned space
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Also convert every cleaned page to DOCX
    #[arg(long)]
    pub create_docx: bool,

    /// Download remote images next to the cleaned pages
    #[arg(long)]
    pub download_images: bool,

    /// Base URL for relative image sources
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Log what would happen without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Directory holding the HTML files to index
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Directory receiving document_tree.md or document_table.csv
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output encoding
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Field separator for the table format
    #[arg(long)]
    pub separator: Option<String>,

    /// Include file paths in the output
    #[arg(long, conflicts_with = "hide_filenames")]
    pub show_filenames: bool,

    /// Leave file paths out of the output
    #[arg(long)]
    pub hide_filenames: bool,

    /// Print the result instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Tree,
    Table,
}

impl From<FormatArg> for TreeFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Tree => TreeFormat::Tree,
            FormatArg::Table => TreeFormat::Table,
        }
    }
}

impl Cli {
    /// Global flags over the file configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.log_file = Some(file.clone());
        }
        match &self.command {
            Commands::Process(args) => args.apply(config),
            Commands::Tree(args) => args.apply(config),
        }
    }
}

impl ProcessArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input_directory = Some(input.clone());
        }
        if let Some(output) = &self.output {
            config.output_directory = Some(output.clone());
        }
        if self.create_docx {
            config.create_docx = true;
        }
        if self.download_images {
            config.images.download = true;
        }
        if let Some(base_url) = &self.base_url {
            config.images.base_url = Some(base_url.clone());
        }
    }
}

impl TreeArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input_directory = Some(input.clone());
        }
        if let Some(output) = &self.output {
            config.output_directory = Some(output.clone());
        }
        if let Some(format) = self.format {
            config.document_tree.format = format.into();
        }
        if let Some(separator) = &self.separator {
            config.document_tree.separator = separator.clone();
        }
        if self.show_filenames {
            config.document_tree.show_filenames = true;
        } else if self.hide_filenames {
            config.document_tree.show_filenames = false;
        }
    }
}
