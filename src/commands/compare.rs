use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisClient;
use crate::cli::CompareArgs;
use crate::extract::{LopdfDecoder, PdfTextExtractor};
use crate::model::{ComparisonManifest, DocumentSummary};
use crate::normalize::{NormalizationRule, TextNormalizer};
use crate::pipeline::prepare_pair;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty, write_text_file};

#[derive(Debug, Default)]
struct CompareOutcome {
    documents: Vec<DocumentSummary>,
    report_char_count: Option<usize>,
    warnings: Vec<String>,
}

pub async fn run(args: CompareArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("compare-{}", utc_compact_string(started_ts));

    info!(
        run_id = %run_id,
        entrada = %args.entrada.display(),
        saida = %args.saida.display(),
        dry_run = args.dry_run,
        "starting comparison"
    );

    let mut outcome = CompareOutcome::default();
    let result = compare(&args, &mut outcome).await;

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = ComparisonManifest {
            manifest_version: 1,
            run_id: run_id.clone(),
            status: match (&result, args.dry_run) {
                (Err(_), _) => "failed".to_string(),
                (Ok(()), true) => "dry_run".to_string(),
                (Ok(()), false) => "completed".to_string(),
            },
            started_at,
            updated_at: now_utc_string(),
            failure_reason: result.as_ref().err().map(|error| format!("{error:#}")),
            dry_run: args.dry_run,
            endpoint: args.webhook_url.clone().filter(|_| !args.dry_run),
            documents: outcome.documents,
            report_char_count: outcome.report_char_count,
            warnings: outcome.warnings,
        };
        match write_json_pretty(manifest_path, &manifest) {
            Ok(()) => info!(path = %manifest_path.display(), "wrote comparison manifest"),
            Err(error) if result.is_err() => warn!(
                path = %manifest_path.display(),
                error = %format!("{error:#}"),
                "failed to write comparison manifest"
            ),
            Err(error) => return Err(error),
        }
    }

    result
}

async fn compare(args: &CompareArgs, outcome: &mut CompareOutcome) -> Result<()> {
    // Endpoint is validated before any PDF is read.
    let client = if args.dry_run {
        None
    } else {
        let Some(webhook_url) = args.webhook_url.as_deref() else {
            bail!("no analysis webhook configured; pass --webhook-url or set VISTORIA_WEBHOOK_URL");
        };
        let client = AnalysisClient::new(webhook_url, Duration::from_secs(args.timeout_secs))?;
        info!(endpoint = %client.endpoint(), timeout_secs = args.timeout_secs, "analysis endpoint configured");
        Some(client)
    };

    let extractor =
        PdfTextExtractor::new(LopdfDecoder).with_page_concurrency(args.text.page_concurrency);
    let normalizer = TextNormalizer::with_options(args.text.normalizer_options())?;
    debug!(
        rules = ?normalizer
            .rules()
            .iter()
            .map(NormalizationRule::name)
            .collect::<Vec<_>>(),
        "normalization rules"
    );

    info!("reading PDFs");
    let pair = prepare_pair(&extractor, &normalizer, &args.entrada, &args.saida)
        .await
        .context("could not read the reports; check that the PDFs are not protected or corrupted")?;
    outcome.documents = pair.summaries();

    for document in [&pair.entrada, &pair.saida] {
        if document.clean_text.is_empty() {
            let message = format!(
                "{} report {} has no text after cleanup",
                document.role,
                document.path.display()
            );
            warn!(role = %document.role, path = %document.path.display(), "report has no text after cleanup");
            outcome.warnings.push(message);
        }
    }

    let payload = pair.payload();
    if let Some(payload_path) = &args.payload_path {
        write_json_pretty(payload_path, &payload)?;
        info!(path = %payload_path.display(), "wrote analysis payload");
    }

    let Some(client) = client else {
        info!("dry run complete; analysis service not called");
        return Ok(());
    };

    info!("analyzing");
    let report = client.analyze(&payload).await?;
    outcome.report_char_count = Some(report.chars().count());

    match &args.report_path {
        Some(path) => {
            write_text_file(path, report.as_bytes())?;
            info!(path = %path.display(), "wrote analysis report");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{report}").context("failed to write analysis report to stdout")?;
        }
    }

    Ok(())
}
