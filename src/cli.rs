use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::extract::DEFAULT_PAGE_CONCURRENCY;
use crate::normalize::NormalizerOptions;

#[derive(Parser, Debug)]
#[command(
    name = "vistoria",
    version,
    about = "Extract, clean and compare entrada/saida inspection report PDFs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract text from a single PDF.
    Extract(ExtractArgs),
    /// Prepare both reports and send them to the analysis service.
    Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TextArgs {
    #[arg(long, default_value_t = DEFAULT_PAGE_CONCURRENCY)]
    pub page_concurrency: usize,

    /// Keep everything after "Assinaturas" instead of dropping the signature block.
    #[arg(long, default_value_t = false)]
    pub keep_signatures: bool,
}

impl TextArgs {
    pub fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            strip_signature_block: !self.keep_signatures,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    pub pdf: PathBuf,

    /// Skip normalization and print the text as extracted.
    #[arg(long, default_value_t = false)]
    pub raw: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub text: TextArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[arg(long)]
    pub entrada: PathBuf,

    #[arg(long)]
    pub saida: PathBuf,

    #[arg(long, env = "VISTORIA_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Write the Markdown report here instead of stdout.
    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long)]
    pub payload_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Prepare the payload without calling the analysis service.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[command(flatten)]
    pub text: TextArgs,
}
