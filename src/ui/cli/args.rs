// Sat Jan 17 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sp-porter")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Ports special process blocks between Explorers of Sky builds", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Relocate, reassemble and store every project block.
    Convert(ConvertArgs),
    /// List every candidate offset found in the project blocks.
    Candidates(ProjectArgs),
    /// Translate individual source-build addresses.
    Translate(TranslateArgs),
    /// Create a project directory.
    Init(ProjectArgs),
    /// Check the configured file hashes.
    Verify(ProjectArgs),
    /// Sort the files of a modified build by how they port.
    Compare(CompareArgs),
    /// Port the edits of a line list onto the target build's list.
    PortList(PortListArgs),
}

#[derive(Parser, Debug)]
pub struct ProjectArgs {
    pub project: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    pub project: PathBuf,

    /// Write a JSON report of every candidate offset.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Stop after resolution and print the rewritten sources.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct TranslateArgs {
    pub project: PathBuf,

    #[arg(required = true)]
    pub addresses: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct CompareArgs {
    pub base: PathBuf,
    pub modified: PathBuf,
    pub target: PathBuf,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct PortListArgs {
    pub base: PathBuf,
    pub modified: PathBuf,
    pub target: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,
}

impl CompareArgs {
    pub fn validate(&self) -> Result<(), String> {
        for dir in [&self.base, &self.modified, &self.target] {
            if !dir.is_dir() {
                return Err(format!("Directory does not exist: {:?}", dir));
            }
        }
        Ok(())
    }
}

impl PortListArgs {
    pub fn validate(&self) -> Result<(), String> {
        for file in [&self.base, &self.modified, &self.target] {
            if !file.is_file() {
                return Err(format!("List file does not exist: {:?}", file));
            }
        }
        Ok(())
    }
}
