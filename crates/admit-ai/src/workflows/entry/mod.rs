//! Rubric scoring for short activity descriptions.

mod heuristic;
mod import;
mod rubric;

pub use import::{read_entries, read_entries_from_path, EntryImportError, EntrySubmission};
pub use rubric::{length_cap, rubric_weights, CategoryScore, RubricCategory};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::workflows::portfolio::domain::{
    clamp_score, round_one_decimal, EvaluationPath, FLAG_CREDIT_ERROR, HEURISTIC_CONFIDENCE,
};
use crate::workflows::portfolio::ladder::{LadderOutcome, ReasoningLadder};
use crate::workflows::portfolio::reasoning::CallParams;
use crate::workflows::portfolio::signals::word_count;
use heuristic::heuristic_rubric;
use rubric::{parse_rubric, rubric_request, RubricPayload};

pub const FLAG_TOO_SHORT: &str = "too_short";
pub const FLAG_LENGTH_CAPPED: &str = "length_capped";
pub const FLAG_EMPTY_SUBMISSION: &str = "empty_submission";
pub const FLAG_OVER_CHARACTER_LIMIT: &str = "over_character_limit";

/// Entries shorter than this are flagged as too short.
const SHORT_ENTRY_WORDS: usize = 25;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryOptions {
    pub category: Option<String>,
    pub character_limit: Option<usize>,
    pub heuristic_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricReport {
    pub categories: Vec<CategoryScore>,
    pub weights: BTreeMap<RubricCategory, f64>,
    pub overall_score: f64,
    pub narrative_quality_index: u8,
    pub word_count: usize,
    pub path: EvaluationPath,
    pub confidence: f64,
    pub flags: Vec<String>,
}

pub struct EntryScorer<'a> {
    ladder: &'a ReasoningLadder<'a>,
    params: &'a CallParams,
}

impl<'a> EntryScorer<'a> {
    pub fn new(ladder: &'a ReasoningLadder<'a>, params: &'a CallParams) -> Self {
        Self { ladder, params }
    }

    /// Never fails: service trouble or garbage input resolves on the heuristic rung.
    pub async fn score(&self, text: &str, options: &EntryOptions) -> RubricReport {
        let text = text.trim();
        let words = word_count(text);

        let outcome = if words == 0 {
            ReasoningLadder::heuristic_only("entry", empty_rubric)
        } else if options.heuristic_only {
            ReasoningLadder::heuristic_only("entry", || heuristic_rubric(text))
        } else {
            let request = rubric_request(text, options, self.params);
            self.ladder
                .climb("entry", &request, parse_rubric, || heuristic_rubric(text))
                .await
        };

        let report = assemble(outcome, text, words, options);
        info!(
            words,
            overall = report.overall_score,
            path = report.path.label(),
            "entry scored"
        );
        report
    }

    pub async fn score_bytes(&self, bytes: &[u8], options: &EntryOptions) -> RubricReport {
        let text = String::from_utf8_lossy(bytes);
        self.score(&text, options).await
    }
}

fn empty_rubric() -> RubricPayload {
    RubricPayload {
        categories: RubricCategory::ALL
            .into_iter()
            .map(|name| CategoryScore {
                name,
                score: 0.0,
                notes: None,
            })
            .collect(),
        flags: vec![FLAG_EMPTY_SUBMISSION.to_string()],
        confidence: HEURISTIC_CONFIDENCE,
    }
}

fn assemble(
    outcome: LadderOutcome<RubricPayload>,
    text: &str,
    words: usize,
    options: &EntryOptions,
) -> RubricReport {
    let credit_error = outcome.credit_error();
    let path = outcome.path;
    let payload = outcome.value;
    let mut flags: Vec<String> = Vec::new();
    let mut push = |flag: &str| {
        if !flags.iter().any(|existing| existing == flag) {
            flags.push(flag.to_string());
        }
    };

    let cap = length_cap(words);
    let mut capped = false;
    let categories: Vec<CategoryScore> = payload
        .categories
        .into_iter()
        .map(|mut item| {
            let score = clamp_score(item.score);
            if score > cap {
                capped = true;
            }
            item.score = round_one_decimal(score.min(cap));
            item
        })
        .collect();

    // Payload flags come from the heuristic rung or the empty-submission path only.
    for flag in &payload.flags {
        push(flag.as_str());
    }
    if words < SHORT_ENTRY_WORDS {
        push(FLAG_TOO_SHORT);
    }
    if capped {
        push(FLAG_LENGTH_CAPPED);
    }
    if credit_error {
        push(FLAG_CREDIT_ERROR);
    }
    if options
        .character_limit
        .is_some_and(|limit| text.chars().count() > limit)
    {
        push(FLAG_OVER_CHARACTER_LIMIT);
    }

    let weights = rubric_weights();
    let weighted: f64 = categories
        .iter()
        .map(|item| item.score * item.name.weight())
        .sum();
    let weighted = clamp_score(weighted);

    RubricReport {
        categories,
        weights,
        overall_score: round_one_decimal(weighted),
        narrative_quality_index: (weighted * 10.0).round() as u8,
        word_count: words,
        path,
        confidence: payload.confidence,
        flags,
    }
}
