use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workflows::portfolio::domain::{
    clamp_confidence, clamp_score, DEFAULT_SERVICE_CONFIDENCE,
};
use crate::workflows::portfolio::parser::{parse_object, ParseError};
use crate::workflows::portfolio::reasoning::{CallParams, ReasoningRequest};
use crate::workflows::portfolio::schema::{optional_string, required_array};

use super::EntryOptions;

/// Rubric answers are short; cap the completion budget below the portfolio default.
pub(crate) const ENTRY_MAX_TOKENS: u32 = 1200;

/// Writing-quality categories for a single activity description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricCategory {
    OpeningHook,
    VividSpecificity,
    ShowDontTell,
    CharacterInteriority,
    ReflectionMeaning,
    NarrativeArc,
    QuantifiedImpact,
    VoiceAuthenticity,
    DialogueScene,
    InitiativeOwnership,
    CraftConcision,
}

impl RubricCategory {
    pub const ALL: [RubricCategory; 11] = [
        RubricCategory::OpeningHook,
        RubricCategory::VividSpecificity,
        RubricCategory::ShowDontTell,
        RubricCategory::CharacterInteriority,
        RubricCategory::ReflectionMeaning,
        RubricCategory::NarrativeArc,
        RubricCategory::QuantifiedImpact,
        RubricCategory::VoiceAuthenticity,
        RubricCategory::DialogueScene,
        RubricCategory::InitiativeOwnership,
        RubricCategory::CraftConcision,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RubricCategory::OpeningHook => "opening_hook",
            RubricCategory::VividSpecificity => "vivid_specificity",
            RubricCategory::ShowDontTell => "show_dont_tell",
            RubricCategory::CharacterInteriority => "character_interiority",
            RubricCategory::ReflectionMeaning => "reflection_meaning",
            RubricCategory::NarrativeArc => "narrative_arc",
            RubricCategory::QuantifiedImpact => "quantified_impact",
            RubricCategory::VoiceAuthenticity => "voice_authenticity",
            RubricCategory::DialogueScene => "dialogue_scene",
            RubricCategory::InitiativeOwnership => "initiative_ownership",
            RubricCategory::CraftConcision => "craft_concision",
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            RubricCategory::OpeningHook => 0.08,
            RubricCategory::VividSpecificity => 0.12,
            RubricCategory::ShowDontTell => 0.10,
            RubricCategory::CharacterInteriority => 0.10,
            RubricCategory::ReflectionMeaning => 0.12,
            RubricCategory::NarrativeArc => 0.10,
            RubricCategory::QuantifiedImpact => 0.10,
            RubricCategory::VoiceAuthenticity => 0.08,
            RubricCategory::DialogueScene => 0.05,
            RubricCategory::InitiativeOwnership => 0.10,
            RubricCategory::CraftConcision => 0.05,
        }
    }

    fn from_key(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' ', '\''], "_");
        let normalized = normalized.replace("don_t", "dont");
        RubricCategory::ALL
            .into_iter()
            .find(|category| category.key() == normalized)
    }
}

pub fn rubric_weights() -> BTreeMap<RubricCategory, f64> {
    RubricCategory::ALL
        .into_iter()
        .map(|category| (category, category.weight()))
        .collect()
}

/// Ceiling applied to every category score based on submission length.
pub fn length_cap(word_count: usize) -> f64 {
    match word_count {
        0..=24 => 1.0,
        25..=49 => 2.0,
        50..=99 => 4.0,
        _ => 10.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: RubricCategory,
    pub score: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Category scores before length caps. `flags` is only ever set locally; anything the
/// service sends under that key is discarded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RubricPayload {
    pub categories: Vec<CategoryScore>,
    pub flags: Vec<String>,
    pub confidence: f64,
}

pub(crate) fn parse_rubric(text: &str) -> Result<RubricPayload, ParseError> {
    let map = parse_object(text)?;
    let mut found: BTreeMap<RubricCategory, CategoryScore> = BTreeMap::new();

    for (index, item) in required_array(&map, "categories")?.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| {
            ParseError::schema(format!("categories[{index}]"), "must be an object")
        })?;
        let name = object
            .get("name")
            .or_else(|| object.get("category"))
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::schema(format!("categories[{index}].name"), "is required"))?;
        let Some(category) = RubricCategory::from_key(name) else {
            continue;
        };
        let score = object
            .get("score")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                ParseError::schema(format!("categories[{index}].score"), "must be a number")
            })?;
        found.entry(category).or_insert(CategoryScore {
            name: category,
            score: clamp_score(score),
            notes: optional_string(object.get("notes")),
        });
    }

    if let Some(missing) = RubricCategory::ALL
        .iter()
        .find(|category| !found.contains_key(category))
    {
        return Err(ParseError::schema(
            format!("categories.{}", missing.key()),
            "is required",
        ));
    }

    Ok(RubricPayload {
        categories: RubricCategory::ALL
            .iter()
            .filter_map(|category| found.remove(category))
            .collect(),
        flags: Vec::new(),
        confidence: map
            .get("confidence")
            .and_then(Value::as_f64)
            .map(clamp_confidence)
            .unwrap_or(DEFAULT_SERVICE_CONFIDENCE),
    })
}

pub(crate) fn rubric_request(
    text: &str,
    options: &EntryOptions,
    params: &CallParams,
) -> ReasoningRequest {
    let mut system_instructions = String::from(
        "You are an admissions writing coach scoring one activity description on a fixed rubric.\n\
         Score every category from 0 to 10. Short entries cannot earn high marks for narrative depth.\n\
         Respond with a single JSON object inside a ```json fence:\n\
         {\"categories\": [{\"name\": \"<category>\", \"score\": <number>, \"notes\": \"...\"}], \"confidence\": <number 0-1>}\n\
         Categories:\n",
    );
    for category in RubricCategory::ALL {
        let _ = writeln!(
            system_instructions,
            "- {} (weight {:.2})",
            category.key(),
            category.weight()
        );
    }

    let mut payload = String::new();
    if let Some(category) = &options.category {
        let _ = writeln!(payload, "Activity category: {category}");
    }
    if let Some(limit) = options.character_limit {
        let _ = writeln!(payload, "Character limit: {limit}");
    }
    let _ = writeln!(payload, "Entry:\n{text}");

    ReasoningRequest {
        system_instructions,
        user_payload: payload,
        params: params.with_max_tokens(params.max_tokens.min(ENTRY_MAX_TOKENS)),
    }
}
