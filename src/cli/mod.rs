// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// The entry point for all user interaction. Parses arguments with
// clap, hands a config to the matching use case (Layer 2), and
// prints the summary it returns.
//
// Any error is wrapped as "<step> step failed" so the message on
// exit names the step; the cause chain names the missing file or
// directory.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, ExtractArgs, MergeArgs, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "resume-ner",
    version,
    about = "Extract person names and emails from PDF resumes with a trained NER model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the use case for the chosen subcommand.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Extract(args) => run_extract(args).context("extract step failed"),
            Commands::Merge(args)   => run_merge(args).context("merge step failed"),
            Commands::Train(args)   => run_train(args).context("train step failed"),
            Commands::Predict(args) => run_predict(args).context("predict step failed"),
        }
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    use crate::application::extract_use_case::ExtractUseCase;

    let summary = ExtractUseCase::new(args.into()).execute()?;

    println!("Extraction complete.");
    println!("  extracted: {}", summary.extracted);
    println!("  empty:     {}", summary.empty);
    println!("  failed:    {}", summary.failed());
    for f in &summary.failures {
        println!("    {} — {}", f.source, f.reason);
    }
    Ok(())
}

fn run_merge(args: MergeArgs) -> Result<()> {
    use crate::application::merge_use_case::MergeUseCase;

    let output  = args.output.clone();
    let summary = MergeUseCase::new(args.into()).execute()?;

    println!("Merge complete → {}", output);
    println!("  files:    {} merged, {} failed", summary.files_merged, summary.files_failed);
    println!("  examples: {}", summary.examples);
    println!("  spans:    {} kept of {}", summary.spans_kept, summary.spans_seen);
    for (reason, count) in &summary.spans_dropped {
        println!("    dropped ({reason}): {count}");
    }
    println!("  overlaps resolved: {}", summary.overlaps_resolved());
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training on '{}'", args.train_data);
    let summary = TrainUseCase::new(args.into()).execute()?;

    let fmt_loss = |l: Option<f64>| l.map_or("n/a".to_string(), |v| format!("{v:.4}"));
    println!("Training complete ({} backend).", summary.backend);
    println!("  examples:     {} train, {} validation", summary.train_examples, summary.val_examples);
    println!("  spans:        {} used, {} skipped", summary.spans_used, summary.spans_skipped);
    println!("  initial loss: {}", fmt_loss(summary.initial_loss));
    println!("  final loss:   {}", fmt_loss(summary.final_loss));
    if let Some((epoch, loss)) = summary.best_loss {
        println!("  best loss:    {loss:.4} (epoch {epoch})");
    }
    if let Some(f1) = summary.final_val_f1 {
        println!("  val F1:       {f1:.3}");
    }
    println!("  smoke test:   {} entities found", summary.smoke_entities);
    println!("Model saved to {}", summary.model_dir.display());
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let output_dir = args.output_dir.clone();
    let summary    = PredictUseCase::new(args.into())?.execute()?;

    for result in &summary.results {
        println!("\n[{}]", result.file);
        println!("  Names found ({}):", result.names().len());
        for name in result.names() {
            println!("    • {name}");
        }
        println!("  Emails found ({}):", result.emails().len());
        for email in result.emails() {
            println!("    • {email}");
        }
    }

    println!("\nPrediction complete → {}", output_dir);
    println!("  processed: {}", summary.processed());
    println!("  no result: {}", summary.empty);
    println!("  failed:    {}", summary.failed());
    for f in &summary.failures {
        println!("    {} — {}", f.source, f.reason);
    }
    Ok(())
}
