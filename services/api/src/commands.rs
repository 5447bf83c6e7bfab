use crate::infra::{build_evaluator, load_portfolio};
use admit_ai::config::AppConfig;
use admit_ai::error::AppError;
use admit_ai::workflows::entry::{read_entries_from_path, EntryOptions, RubricReport};
use admit_ai::workflows::portfolio::{
    Dimension, DimensionResult, EvaluationMode, PortfolioSynthesis,
};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Portfolio JSON file
    #[arg(long)]
    pub(crate) portfolio: PathBuf,
    /// Evaluation mode (general, uc_berkeley, ucla, uc_san_diego, uc_davis)
    #[arg(long)]
    pub(crate) mode: Option<EvaluationMode>,
    /// Print the full synthesis as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DimensionArgs {
    /// Portfolio JSON file
    #[arg(long)]
    pub(crate) portfolio: PathBuf,
    /// Dimension to score, e.g. leadership or intellectual_curiosity
    #[arg(long)]
    pub(crate) dimension: Dimension,
    #[arg(long)]
    pub(crate) mode: Option<EvaluationMode>,
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreEntryArgs {
    /// Activity description to score
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub(crate) text: Option<String>,
    /// Read the description from a file; invalid UTF-8 is replaced rather than rejected
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Activity category shown to the reasoning service
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Flag descriptions longer than this many characters
    #[arg(long)]
    pub(crate) character_limit: Option<usize>,
    /// Skip the reasoning service and score with the local rubric
    #[arg(long)]
    pub(crate) heuristic_only: bool,
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EntriesArgs {
    /// CSV export with id,title,description columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    #[arg(long)]
    pub(crate) heuristic_only: bool,
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let evaluator = build_evaluator(&config)?;
    let portfolio = load_portfolio(&args.portfolio)?;
    let mode = args.mode.unwrap_or_else(|| evaluator.default_mode());

    let synthesis = evaluator.evaluate_portfolio(&portfolio, mode.key()).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&synthesis)?);
    } else {
        render_synthesis(&synthesis);
    }
    Ok(())
}

pub(crate) async fn run_dimension(args: DimensionArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let evaluator = build_evaluator(&config)?;
    let portfolio = load_portfolio(&args.portfolio)?;
    let mode = args.mode.unwrap_or_else(|| evaluator.default_mode());

    let result = evaluator
        .evaluate_dimension(&portfolio, args.dimension, mode.key())
        .await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_dimension(&result);
    }
    Ok(())
}

pub(crate) async fn run_score_entry(args: ScoreEntryArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let evaluator = build_evaluator(&config)?;
    let options = EntryOptions {
        category: args.category,
        character_limit: args.character_limit,
        heuristic_only: args.heuristic_only,
    };

    let report = match (args.text, args.file) {
        (Some(text), _) => evaluator.score_entry(&text, &options).await,
        (None, Some(path)) => {
            let bytes = std::fs::read(path)?;
            evaluator.score_entry_bytes(&bytes, &options).await
        }
        (None, None) => evaluator.score_entry("", &options).await,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_entry(None, &report);
    }
    Ok(())
}

pub(crate) async fn run_entries(args: EntriesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let evaluator = build_evaluator(&config)?;
    let entries = read_entries_from_path(&args.csv)?;
    let options = EntryOptions {
        heuristic_only: args.heuristic_only,
        ..EntryOptions::default()
    };

    println!("Scoring {} entries from {}", entries.len(), args.csv.display());
    for (index, entry) in entries.iter().enumerate() {
        let report = evaluator.score_entry(&entry.description, &options).await;
        let label = entry
            .title
            .clone()
            .or_else(|| entry.id.clone())
            .unwrap_or_else(|| format!("row {}", index + 1));
        render_entry(Some(&label), &report);
    }
    Ok(())
}

pub(crate) fn render_synthesis(synthesis: &PortfolioSynthesis) {
    println!(
        "Overall {:.1} ({}) | {} | {} | mode {}",
        synthesis.overall_score,
        synthesis.tier.label(),
        synthesis.archetype.label(),
        synthesis.percentile_bucket.label(),
        synthesis.mode.key()
    );
    println!("First impression: {}", synthesis.holistic.first_impression);
    println!("Dimensions:");
    for result in synthesis.dimensions.values() {
        println!(
            "  - {:<26} {:>4.1} {:<12} via {}",
            result.dimension.label(),
            result.score,
            result.tier.label(),
            result.path.label()
        );
    }
    println!(
        "Campus alignment: {:.1} on {}",
        synthesis.campus_alignment.alignment_score,
        synthesis
            .campus_alignment
            .emphasized
            .iter()
            .map(|dimension| dimension.label())
            .collect::<Vec<_>>()
            .join(" + ")
    );
    println!(
        "Coherence: {:.1} | confidence {:.2}",
        synthesis.dimensional_interactions.coherence, synthesis.confidence
    );
    println!("{}", synthesis.archetype_explanation);
    for strength in &synthesis.hidden_strengths {
        println!("  * {}: {}", strength.title, strength.narrative);
    }
    if !synthesis.flags.is_empty() {
        println!("Flags: {}", synthesis.flags.join(", "));
    }
}

pub(crate) fn render_dimension(result: &DimensionResult) {
    println!(
        "{}: {:.1} ({}) via {} | confidence {:.2}",
        result.dimension.label(),
        result.score,
        result.tier.label(),
        result.path.label(),
        result.confidence
    );
    if !result.reasoning.summary.is_empty() {
        println!("{}", result.reasoning.summary);
    }
    for strength in &result.strengths {
        println!("  + {}", strength.text);
    }
    for gap in &result.growth_areas {
        println!("  - {}", gap.text);
    }
    if !result.flags.is_empty() {
        println!("Flags: {}", result.flags.join(", "));
    }
}

pub(crate) fn render_entry(label: Option<&str>, report: &RubricReport) {
    let prefix = label.map(|label| format!("{label}: ")).unwrap_or_default();
    println!(
        "{prefix}overall {:.1} | NQI {} | {} words | via {}",
        report.overall_score,
        report.narrative_quality_index,
        report.word_count,
        report.path.label()
    );
    if label.is_none() {
        for category in &report.categories {
            println!("  - {:<28} {:>4.1}", category.name.key(), category.score);
        }
    }
    if !report.flags.is_empty() {
        println!("  flags: {}", report.flags.join(", "));
    }
}
