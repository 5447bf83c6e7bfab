use std::collections::BTreeMap;

use tracing::info;

use super::super::domain::{
    Activity, ActivityCategory, EvaluationPath, HolisticImpression, Portfolio, Tier,
    HEURISTIC_CONFIDENCE,
};
use super::super::inputs::portfolio_text;
use super::super::ladder::ReasoningLadder;
use super::super::reasoning::CallParams;
use super::super::schema::parse_holistic;
use super::super::signals::{truncate_chars, Signal, TextSignals};
use super::prompts;

const MAX_THEMES: usize = 3;

/// First-pass read of the whole portfolio, shared by the analyzers and synthesis.
pub struct HolisticAnalyzer<'a> {
    ladder: &'a ReasoningLadder<'a>,
    params: &'a CallParams,
}

impl<'a> HolisticAnalyzer<'a> {
    pub fn new(ladder: &'a ReasoningLadder<'a>, params: &'a CallParams) -> Self {
        Self { ladder, params }
    }

    pub async fn analyze(&self, portfolio: &Portfolio) -> HolisticImpression {
        let request = prompts::holistic_request(portfolio, self.params);
        let outcome = self
            .ladder
            .climb(
                "holistic",
                &request,
                |text| {
                    parse_holistic(text).map(|payload| HolisticImpression {
                        first_impression: payload.first_impression,
                        themes: payload.themes,
                        standout_signal: payload.standout_signal,
                        initial_band: payload.initial_band.unwrap_or_else(|| {
                            estimate_band(&TextSignals::scan(&portfolio_text(portfolio)))
                        }),
                        confidence: payload.confidence,
                        path: EvaluationPath::Primary,
                    })
                },
                || heuristic_impression(portfolio),
            )
            .await;

        let mut impression = outcome.value;
        impression.path = outcome.path;
        info!(
            band = impression.initial_band.label(),
            themes = impression.themes.len(),
            "holistic impression formed"
        );
        impression
    }
}

/// Deterministic impression built from activity categories and lexical signals.
pub(crate) fn heuristic_impression(portfolio: &Portfolio) -> HolisticImpression {
    let text = portfolio_text(portfolio);
    let signals = TextSignals::scan(&text);
    let themes = themes(&portfolio.activities, &signals);

    let first_impression = format!(
        "Portfolio with {} activities and {} essays ({} words of applicant writing). \
         Most visible themes: {}.",
        portfolio.activities.len(),
        portfolio.essays.len(),
        signals.word_count,
        if themes.is_empty() {
            "none yet".to_string()
        } else {
            themes.join(", ")
        }
    );

    HolisticImpression {
        first_impression,
        themes,
        standout_signal: standout(&portfolio.activities, &signals),
        initial_band: estimate_band(&signals),
        confidence: HEURISTIC_CONFIDENCE,
        path: EvaluationPath::Heuristic,
    }
}

fn category_theme(category: ActivityCategory) -> Option<&'static str> {
    match category {
        ActivityCategory::Academic => Some("academic enrichment"),
        ActivityCategory::Arts => Some("creative arts"),
        ActivityCategory::Athletics => Some("athletics"),
        ActivityCategory::CommunityService => Some("community service"),
        ActivityCategory::Employment => Some("work experience"),
        ActivityCategory::Family => Some("family responsibility"),
        ActivityCategory::Research => Some("research"),
        ActivityCategory::StudentGovernment => Some("student government"),
        ActivityCategory::Other => None,
    }
}

fn themes(activities: &[Activity], signals: &TextSignals) -> Vec<String> {
    let mut hours: BTreeMap<&'static str, f64> = BTreeMap::new();
    for activity in activities {
        if let Some(theme) = category_theme(activity.category) {
            // Listed-but-unlogged activities still count toward a theme.
            *hours.entry(theme).or_default() += activity.total_hours().max(1.0);
        }
    }
    let mut ranked: Vec<(&'static str, f64)> = hours.into_iter().collect();
    ranked.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(right.0)));

    let mut themes: Vec<String> = ranked
        .into_iter()
        .take(MAX_THEMES)
        .map(|(theme, _)| theme.to_string())
        .collect();

    for (signal, theme) in [
        (Signal::LeadershipAction, "leadership"),
        (Signal::ServiceOrientation, "service"),
        (Signal::CuriosityMarker, "inquiry"),
    ] {
        if themes.len() >= MAX_THEMES {
            break;
        }
        if signals.has(signal) && !themes.iter().any(|existing| existing.contains(theme)) {
            themes.push(theme.to_string());
        }
    }
    themes
}

fn standout(activities: &[Activity], signals: &TextSignals) -> Option<String> {
    let longest = activities
        .iter()
        .filter(|activity| activity.total_hours() > 0.0)
        .max_by(|left, right| left.total_hours().total_cmp(&right.total_hours()));
    if let Some(activity) = longest {
        return Some(format!(
            "{} (about {:.0} hours)",
            activity.title.trim(),
            activity.total_hours()
        ));
    }
    signals
        .quote(Signal::QuantifiedMetric)
        .or_else(|| signals.quote(Signal::LeadershipAction))
        .map(|quote| truncate_chars(quote, 120))
}

fn estimate_band(signals: &TextSignals) -> Tier {
    match signals.fired().count() {
        count if count >= 7 => Tier::Strong,
        count if count >= 4 => Tier::Developing,
        _ => Tier::Foundational,
    }
}
