//! Schema contracts for reasoning-service payloads.
//!
//! Required fields must be present with the right JSON type or the whole payload is
//! rejected. Optional fields that are missing or mistyped resolve to their defaults.

use serde_json::{Map, Value};

use super::domain::{
    clamp_confidence, ComparativeContext, Dimension, Evidence, Gap, Rarity, ReasoningNotes,
    Severity, Tier, DEFAULT_SERVICE_CONFIDENCE,
};
use super::parser::{parse_object, ParseError};

/// Validated dimension judgment, before clamping and tier re-derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionPayload {
    pub score: f64,
    pub advisory_tier: Tier,
    pub reasoning: ReasoningNotes,
    pub strengths: Vec<Evidence>,
    pub weaknesses: Vec<Gap>,
    pub comparative_context: ComparativeContext,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HolisticPayload {
    pub first_impression: String,
    pub themes: Vec<String>,
    pub standout_signal: Option<String>,
    pub initial_band: Option<Tier>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativePayload {
    pub archetype_explanation: String,
    pub hidden_strengths: Vec<NarrativeStrength>,
    pub synergies: Vec<String>,
    pub tensions: Vec<String>,
    pub coherence_narrative: String,
    pub campus_fit_rationale: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeStrength {
    pub title: String,
    pub narrative: String,
    pub dimensions: Vec<Dimension>,
}

pub fn parse_dimension(text: &str) -> Result<DimensionPayload, ParseError> {
    let map = parse_object(text)?;

    let score = required_number(&map, "dimension_score")?;
    let tier_raw = required_str(&map, "tier")?;
    let advisory_tier = Tier::parse(tier_raw)
        .ok_or_else(|| ParseError::schema("tier", format!("has unknown value '{tier_raw}'")))?;

    let strengths = required_array(&map, "strengths")?
        .iter()
        .enumerate()
        .map(|(index, item)| evidence_item(item, index))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    let weaknesses = required_array(&map, "weaknesses")?
        .iter()
        .enumerate()
        .map(|(index, item)| gap_item(item, index))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    Ok(DimensionPayload {
        score,
        advisory_tier,
        reasoning: reasoning_notes(map.get("reasoning")),
        strengths,
        weaknesses,
        comparative_context: comparative_context(map.get("comparative_context")),
        confidence: optional_confidence(&map),
    })
}

pub fn parse_holistic(text: &str) -> Result<HolisticPayload, ParseError> {
    let map = parse_object(text)?;
    let first_impression = required_str(&map, "first_impression")?.trim().to_string();
    if first_impression.is_empty() {
        return Err(ParseError::schema("first_impression", "must not be empty"));
    }
    let themes = string_items(required_array(&map, "themes")?, "themes")?;

    Ok(HolisticPayload {
        first_impression,
        themes,
        standout_signal: optional_string(map.get("standout_signal")),
        initial_band: map
            .get("initial_band")
            .and_then(Value::as_str)
            .and_then(Tier::parse),
        confidence: optional_confidence(&map),
    })
}

pub fn parse_narrative(text: &str) -> Result<NarrativePayload, ParseError> {
    let map = parse_object(text)?;
    let archetype_explanation = required_str(&map, "archetype_explanation")?
        .trim()
        .to_string();
    if archetype_explanation.is_empty() {
        return Err(ParseError::schema("archetype_explanation", "must not be empty"));
    }

    let hidden_strengths = required_array(&map, "hidden_strengths")?
        .iter()
        .enumerate()
        .map(|(index, item)| narrative_strength(item, index))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    let interactions = map
        .get("dimensional_interactions")
        .ok_or_else(|| ParseError::schema("dimensional_interactions", "is required"))?
        .as_object()
        .ok_or_else(|| ParseError::schema("dimensional_interactions", "must be an object"))?;

    Ok(NarrativePayload {
        archetype_explanation,
        hidden_strengths,
        synergies: lenient_strings(interactions.get("synergies")),
        tensions: lenient_strings(interactions.get("tensions")),
        coherence_narrative: optional_string(interactions.get("coherence_narrative"))
            .or_else(|| optional_string(interactions.get("coherence")))
            .unwrap_or_default(),
        campus_fit_rationale: optional_string(map.get("campus_fit_rationale")),
        confidence: optional_confidence(&map),
    })
}

pub(crate) fn required_number(map: &Map<String, Value>, field: &str) -> Result<f64, ParseError> {
    let value = map
        .get(field)
        .ok_or_else(|| ParseError::schema(field, "is required"))?;
    let number = value
        .as_f64()
        .ok_or_else(|| ParseError::schema(field, "must be a number"))?;
    if number.is_finite() {
        Ok(number)
    } else {
        Err(ParseError::schema(field, "must be finite"))
    }
}

pub(crate) fn required_str<'a>(
    map: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ParseError> {
    map.get(field)
        .ok_or_else(|| ParseError::schema(field, "is required"))?
        .as_str()
        .ok_or_else(|| ParseError::schema(field, "must be a string"))
}

pub(crate) fn required_array<'a>(
    map: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Vec<Value>, ParseError> {
    map.get(field)
        .ok_or_else(|| ParseError::schema(field, "is required"))?
        .as_array()
        .ok_or_else(|| ParseError::schema(field, "must be an array"))
}

pub(crate) fn optional_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn optional_confidence(map: &Map<String, Value>) -> f64 {
    map.get("confidence")
        .and_then(Value::as_f64)
        .map(clamp_confidence)
        .unwrap_or(DEFAULT_SERVICE_CONFIDENCE)
}

fn string_items(items: &[Value], field: &str) -> Result<Vec<String>, ParseError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(|text| text.trim().to_string())
                .ok_or_else(|| ParseError::schema(format!("{field}[{index}]"), "must be a string"))
        })
        .filter(|item| !matches!(item, Ok(text) if text.is_empty()))
        .collect()
}

pub(crate) fn lenient_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) if !text.trim().is_empty() => vec![text.trim().to_string()],
        _ => Vec::new(),
    }
}

fn quotes(object: &Map<String, Value>) -> Vec<String> {
    let mut quotes = lenient_strings(object.get("supporting_quotes"));
    if let Some(single) = optional_string(object.get("supporting_quote")) {
        quotes.push(single);
    }
    quotes
}

fn item_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| optional_string(object.get(*key)))
}

fn evidence_item(item: &Value, index: usize) -> Result<Option<Evidence>, ParseError> {
    match item {
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => Ok(Some(Evidence {
            text: text.trim().to_string(),
            supporting_quotes: Vec::new(),
            rarity: Rarity::default(),
        })),
        Value::Object(object) => Ok(item_text(object, &["text", "strength", "description"]).map(
            |text| Evidence {
                text,
                supporting_quotes: quotes(object),
                rarity: object
                    .get("rarity")
                    .and_then(Value::as_str)
                    .map(parse_rarity)
                    .unwrap_or_default(),
            },
        )),
        _ => Err(ParseError::schema(
            format!("strengths[{index}]"),
            "must be a string or object",
        )),
    }
}

fn gap_item(item: &Value, index: usize) -> Result<Option<Gap>, ParseError> {
    match item {
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => Ok(Some(Gap {
            text: text.trim().to_string(),
            supporting_quotes: Vec::new(),
            severity: Severity::default(),
        })),
        Value::Object(object) => Ok(item_text(object, &["text", "weakness", "description"]).map(
            |text| Gap {
                text,
                supporting_quotes: quotes(object),
                severity: object
                    .get("severity")
                    .and_then(Value::as_str)
                    .map(parse_severity)
                    .unwrap_or_default(),
            },
        )),
        _ => Err(ParseError::schema(
            format!("weaknesses[{index}]"),
            "must be a string or object",
        )),
    }
}

fn narrative_strength(item: &Value, index: usize) -> Result<Option<NarrativeStrength>, ParseError> {
    match item {
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => Ok(Some(NarrativeStrength {
            title: text.trim().to_string(),
            narrative: String::new(),
            dimensions: Vec::new(),
        })),
        Value::Object(object) => {
            let Some(title) = item_text(object, &["title", "strength", "text"]) else {
                return Ok(None);
            };
            let dimensions = lenient_strings(object.get("dimensions"))
                .iter()
                .filter_map(|raw| raw.parse::<Dimension>().ok())
                .collect();
            Ok(Some(NarrativeStrength {
                title,
                narrative: item_text(object, &["narrative", "explanation"]).unwrap_or_default(),
                dimensions,
            }))
        }
        _ => Err(ParseError::schema(
            format!("hidden_strengths[{index}]"),
            "must be a string or object",
        )),
    }
}

fn reasoning_notes(value: Option<&Value>) -> ReasoningNotes {
    match value {
        Some(Value::String(summary)) => ReasoningNotes {
            summary: summary.trim().to_string(),
            ..ReasoningNotes::default()
        },
        Some(Value::Object(object)) => ReasoningNotes {
            summary: optional_string(object.get("summary")).unwrap_or_default(),
            key_observations: lenient_strings(object.get("key_observations")),
            scoring_rationale: optional_string(object.get("scoring_rationale"))
                .unwrap_or_default(),
        },
        _ => ReasoningNotes::default(),
    }
}

fn comparative_context(value: Option<&Value>) -> ComparativeContext {
    let Some(Value::Object(object)) = value else {
        return ComparativeContext::default();
    };
    ComparativeContext {
        percentile_estimate: optional_string(object.get("percentile_estimate")),
        typical_applicant: optional_string(object.get("typical_applicant")),
        differentiator: optional_string(object.get("differentiator")),
    }
}

fn parse_rarity(raw: &str) -> Rarity {
    match raw.trim().to_ascii_lowercase().as_str() {
        "common" => Rarity::Common,
        "rare" | "very rare" | "very_rare" => Rarity::Rare,
        "exceptional" | "extraordinary" => Rarity::Exceptional,
        _ => Rarity::Uncommon,
    }
}

fn parse_severity(raw: &str) -> Severity {
    match raw.trim().to_ascii_lowercase().as_str() {
        "minor" | "low" => Severity::Minor,
        "significant" | "major" | "high" | "critical" => Severity::Significant,
        _ => Severity::Moderate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_DIMENSION: &str = r#"Analysis follows.
```json
{
  "dimension_score": 8.2,
  "tier": "Strong",
  "reasoning": {"summary": "Sustained robotics leadership", "key_observations": ["captain"], "scoring_rationale": "founded team"},
  "strengths": [
    {"text": "Founded the robotics club", "supporting_quotes": ["I founded our robotics club"], "rarity": "rare"},
    "Mentors younger members"
  ],
  "weaknesses": [{"text": "Impact not quantified", "severity": "minor"}],
  "comparative_context": {"percentile_estimate": "top 15%"},
  "confidence": 0.9
}
```"#;

    #[test]
    fn parses_complete_dimension_payload() {
        let payload = parse_dimension(VALID_DIMENSION).expect("valid payload");
        assert_eq!(payload.score, 8.2);
        assert_eq!(payload.advisory_tier, Tier::Strong);
        assert_eq!(payload.strengths.len(), 2);
        assert_eq!(payload.strengths[0].rarity, Rarity::Rare);
        assert_eq!(payload.strengths[1].rarity, Rarity::Uncommon);
        assert_eq!(payload.weaknesses[0].severity, Severity::Minor);
        assert_eq!(
            payload.comparative_context.percentile_estimate.as_deref(),
            Some("top 15%")
        );
        assert_eq!(payload.confidence, 0.9);
    }

    #[test]
    fn optional_fields_resolve_to_defaults() {
        let text = r#"{"dimension_score": 6, "tier": "developing", "strengths": [], "weaknesses": []}"#;
        let payload = parse_dimension(text).unwrap();
        assert_eq!(payload.reasoning, ReasoningNotes::default());
        assert_eq!(payload.comparative_context, ComparativeContext::default());
        assert_eq!(payload.confidence, DEFAULT_SERVICE_CONFIDENCE);
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let missing_score = r#"{"tier": "strong", "strengths": [], "weaknesses": []}"#;
        assert_eq!(
            parse_dimension(missing_score).unwrap_err(),
            ParseError::schema("dimension_score", "is required")
        );

        let missing_weaknesses = r#"{"dimension_score": 5, "tier": "strong", "strengths": []}"#;
        assert_eq!(
            parse_dimension(missing_weaknesses).unwrap_err(),
            ParseError::schema("weaknesses", "is required")
        );
    }

    #[test]
    fn mistyped_required_fields_fail_validation() {
        let string_score =
            r#"{"dimension_score": "8", "tier": "strong", "strengths": [], "weaknesses": []}"#;
        assert_eq!(
            parse_dimension(string_score).unwrap_err(),
            ParseError::schema("dimension_score", "must be a number")
        );

        let bad_tier =
            r#"{"dimension_score": 8, "tier": "legendary", "strengths": [], "weaknesses": []}"#;
        assert!(matches!(
            parse_dimension(bad_tier).unwrap_err(),
            ParseError::Schema { field, .. } if field == "tier"
        ));

        let bad_item =
            r#"{"dimension_score": 8, "tier": "strong", "strengths": [42], "weaknesses": []}"#;
        assert!(matches!(
            parse_dimension(bad_item).unwrap_err(),
            ParseError::Schema { field, .. } if field == "strengths[0]"
        ));
    }

    #[test]
    fn out_of_range_scores_pass_schema_for_later_clamping() {
        let text = r#"{"dimension_score": 14, "tier": "exceptional", "strengths": [], "weaknesses": [], "confidence": 3}"#;
        let payload = parse_dimension(text).unwrap();
        assert_eq!(payload.score, 14.0);
        assert_eq!(payload.confidence, 1.0);
    }

    #[test]
    fn holistic_requires_impression_and_themes() {
        let ok = r#"{"first_impression": "A builder", "themes": ["robotics", "mentoring"], "initial_band": "strong"}"#;
        let payload = parse_holistic(ok).unwrap();
        assert_eq!(payload.themes, vec!["robotics", "mentoring"]);
        assert_eq!(payload.initial_band, Some(Tier::Strong));

        let missing = r#"{"first_impression": "A builder"}"#;
        assert_eq!(
            parse_holistic(missing).unwrap_err(),
            ParseError::schema("themes", "is required")
        );

        let blank = r#"{"first_impression": "   ", "themes": []}"#;
        assert_eq!(
            parse_holistic(blank).unwrap_err(),
            ParseError::schema("first_impression", "must not be empty")
        );
    }

    #[test]
    fn narrative_requires_interactions_object() {
        let ok = r#"{
            "archetype_explanation": "A scholar at heart",
            "hidden_strengths": [{"title": "Quiet mentor", "narrative": "Tutors peers", "dimensions": ["community"]}],
            "dimensional_interactions": {"synergies": ["research feeds curiosity"], "tensions": [], "coherence_narrative": "Consistent"},
            "overall_score": 9.9
        }"#;
        let payload = parse_narrative(ok).unwrap();
        assert_eq!(payload.hidden_strengths[0].dimensions, vec![Dimension::CommunityImpact]);
        assert_eq!(payload.synergies.len(), 1);
        assert_eq!(payload.coherence_narrative, "Consistent");

        let missing = r#"{"archetype_explanation": "x", "hidden_strengths": []}"#;
        assert_eq!(
            parse_narrative(missing).unwrap_err(),
            ParseError::schema("dimensional_interactions", "is required")
        );
    }

    #[test]
    fn narrative_rejects_blank_explanation() {
        let blank = r#"{
            "archetype_explanation": " \n ",
            "hidden_strengths": [],
            "dimensional_interactions": {"synergies": [], "tensions": []}
        }"#;
        assert_eq!(
            parse_narrative(blank).unwrap_err(),
            ParseError::schema("archetype_explanation", "must not be empty")
        );
    }
}
