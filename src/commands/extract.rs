use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::extract::{LopdfDecoder, PdfTextExtractor};
use crate::normalize::TextNormalizer;
use crate::util::write_text_file;

pub async fn run(args: ExtractArgs) -> Result<()> {
    let extractor =
        PdfTextExtractor::new(LopdfDecoder).with_page_concurrency(args.text.page_concurrency);

    info!(path = %args.pdf.display(), raw = args.raw, "extracting PDF text");

    let extracted = extractor
        .extract_file(&args.pdf)
        .await
        .with_context(|| format!("failed to extract text from {}", args.pdf.display()))?;

    let text = if args.raw {
        extracted.as_str().to_string()
    } else {
        let normalizer = TextNormalizer::with_options(args.text.normalizer_options())?;
        normalizer.normalize(extracted.as_str())
    };

    info!(
        pages = extracted.page_count(),
        raw_chars = extracted.as_str().chars().count(),
        output_chars = text.chars().count(),
        "extraction complete"
    );

    match &args.output {
        Some(path) => {
            write_text_file(path, text.as_bytes())?;
            info!(path = %path.display(), "wrote extracted text");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("failed to write extracted text to stdout")?;
        }
    }

    Ok(())
}
