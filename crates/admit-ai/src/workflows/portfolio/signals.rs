//! Deterministic lexical signals used by the heuristic scorers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const MAX_QUOTE_CHARS: usize = 220;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    QuantifiedMetric,
    NamedBeneficiary,
    Reflection,
    SustainedDuration,
    EmotionalLanguage,
    Dialogue,
    LeadershipAction,
    CuriosityMarker,
    ServiceOrientation,
    FutureOrientation,
}

impl Signal {
    pub const ALL: [Signal; 10] = [
        Signal::QuantifiedMetric,
        Signal::NamedBeneficiary,
        Signal::Reflection,
        Signal::SustainedDuration,
        Signal::EmotionalLanguage,
        Signal::Dialogue,
        Signal::LeadershipAction,
        Signal::CuriosityMarker,
        Signal::ServiceOrientation,
        Signal::FutureOrientation,
    ];

    fn pattern(&self) -> &'static str {
        match self {
            Signal::QuantifiedMetric => {
                r"(?i)(\$\s?\d[\d,]*|\b\d[\d,]*(\.\d+)?\s?(%|percent\b)|\b\d[\d,]*\+?\s+(students|people|members|hours|volunteers|children|kids|patients|residents|families|participants|attendees|dollars|books|meals|teams|schools|events|users|seniors|donors|pounds)\b)"
            }
            Signal::NamedBeneficiary => {
                r"(?i)\b(students|children|kids|patients|residents|seniors|families|neighbors|classmates|refugees|veterans|immigrants|underserved|low-income|homeless|elderly|younger (students|kids|members)|community members)\b"
            }
            Signal::Reflection => {
                r"(?i)\b(i learned|i realized|i discovered|taught me|made me (realize|understand|see)|i now (understand|see|know)|looking back|i began to|i came to (see|understand|realize)|changed how i|i reflected)\b"
            }
            Signal::SustainedDuration => {
                r"(?i)\b(for (\d+|two|three|four|five|six) (years|months|summers|seasons)|since (\d{4}|freshman|sophomore|ninth grade|middle school|elementary)|every (week|weekend|day|summer|saturday|sunday|morning)|weekly|each (week|summer|semester)|(two|three|four|\d+) consecutive|over the (past|last) (\d+|two|three|four) years)\b"
            }
            Signal::EmotionalLanguage => {
                r"(?i)\b(afraid|scared|nervous|anxious|proud|ashamed|frustrated|overwhelmed|heartbroken|excited|terrified|joy|grief|tears|cried|laughed|embarrassed|angry|hopeful|lonely|relieved)\b"
            }
            Signal::Dialogue => r#""[^"\n]{3,}"|“[^”\n]{3,}”"#,
            Signal::LeadershipAction => {
                r"(?i)\b(founded|co-founded|led|organized|launched|president|captain|chair|directed|managed|mentored|coordinated|initiated|spearheaded|elected|head of)\b"
            }
            Signal::CuriosityMarker => {
                r"(?i)\b(research|researched|experiment|experiments|hypothesis|wondered|curious|curiosity|independent study|self-taught|taught myself|explored|investigated|published|lab)\b"
            }
            Signal::ServiceOrientation => {
                r"(?i)\b(volunteer|volunteered|volunteering|tutor|tutored|tutoring|donated|donation|fundraiser|fundraising|food bank|shelter|outreach|nonprofit|non-profit|advocate|advocated|advocacy|clean-up)\b"
            }
            Signal::FutureOrientation => {
                r"(?i)\b(career|major in|plan to|hope to|aspire|aspiration|internship|pursue|pursuing|intend to|graduate school|medical school|become an?)\b"
            }
        }
    }
}

fn compiled() -> &'static [(Signal, Regex)] {
    static PATTERNS: OnceLock<Vec<(Signal, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        Signal::ALL
            .iter()
            .filter_map(|signal| Regex::new(signal.pattern()).ok().map(|regex| (*signal, regex)))
            .collect()
    })
}

/// Result of scanning a block of applicant text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextSignals {
    pub word_count: usize,
    hits: BTreeMap<Signal, String>,
}

impl TextSignals {
    pub fn scan(text: &str) -> Self {
        let hits = compiled()
            .iter()
            .filter_map(|(signal, regex)| {
                regex
                    .find(text)
                    .map(|found| (*signal, sentence_around(text, found.start(), found.end())))
            })
            .collect();

        Self {
            word_count: word_count(text),
            hits,
        }
    }

    pub fn has(&self, signal: Signal) -> bool {
        self.hits.contains_key(&signal)
    }

    /// The sentence containing the first match, for evidence quoting.
    pub fn quote(&self, signal: Signal) -> Option<&str> {
        self.hits.get(&signal).map(String::as_str)
    }

    pub fn fired(&self) -> impl Iterator<Item = Signal> + '_ {
        self.hits.keys().copied()
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .count()
}

fn is_sentence_break(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '\n')
}

fn sentence_around(text: &str, start: usize, end: usize) -> String {
    let sentence_start = text[..start]
        .char_indices()
        .rev()
        .find(|(_, ch)| is_sentence_break(*ch))
        .map(|(index, ch)| index + ch.len_utf8())
        .unwrap_or(0);
    let sentence_end = text[end..]
        .char_indices()
        .find(|(_, ch)| is_sentence_break(*ch))
        .map(|(index, ch)| end + index + ch.len_utf8())
        .unwrap_or(text.len());

    let sentence = text[sentence_start..sentence_end].trim();
    truncate_chars(sentence, MAX_QUOTE_CHARS)
}

pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push('…');
    truncated
}

/// Lowercase and collapse whitespace so quotes can be matched against source text.
pub(crate) fn normalize_for_match(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
