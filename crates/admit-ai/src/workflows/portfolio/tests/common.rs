use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{json, Value};

use crate::workflows::portfolio::domain::{
    AcademicRecord, Activity, ActivityCategory, Course, CourseLevel, Dimension, Essay,
    FutureGoals, Portfolio,
};
use crate::workflows::portfolio::reasoning::{ReasoningClient, ReasoningError, ReasoningRequest};
use crate::workflows::portfolio::{LadderPolicy, PortfolioEvaluator};

pub(super) fn portfolio() -> Portfolio {
    Portfolio {
        applicant_id: Some("applicant-042".to_string()),
        academics: Some(AcademicRecord {
            gpa_unweighted: Some(3.92),
            gpa_weighted: Some(4.4),
            courses: vec![
                Course {
                    name: "AP Calculus BC".to_string(),
                    level: CourseLevel::AdvancedPlacement,
                    grade: Some("A".to_string()),
                },
                Course {
                    name: "AP Biology".to_string(),
                    level: CourseLevel::AdvancedPlacement,
                    grade: Some("A-".to_string()),
                },
                Course {
                    name: "Honors English".to_string(),
                    level: CourseLevel::Honors,
                    grade: Some("A".to_string()),
                },
            ],
            awards: vec!["AP Scholar with Distinction".to_string()],
            ..AcademicRecord::default()
        }),
        activities: vec![
            Activity {
                title: "Neighborhood Tutoring Circle".to_string(),
                role: Some("Founder".to_string()),
                category: ActivityCategory::CommunityService,
                description: "I founded a free tutoring circle that met every Saturday for three years and served 40 students from families who could not afford tutors.".to_string(),
                hours_per_week: Some(4.0),
                weeks_per_year: Some(40),
                years_active: Some(3),
                ..Activity::default()
            },
            Activity {
                title: "Protein Folding Research".to_string(),
                role: Some("Student researcher".to_string()),
                category: ActivityCategory::Research,
                description: "I taught myself Python to run folding simulations and presented a poster at the county science fair.".to_string(),
                hours_per_week: Some(6.0),
                weeks_per_year: Some(20),
                ..Activity::default()
            },
        ],
        essays: vec![Essay {
            prompt: "Describe a challenge you overcame.".to_string(),
            body: "The first Saturday only two kids showed up, and I was nervous that nobody wanted help. \"Can you explain fractions again?\" one of them asked, and I realized patience mattered more than speed. Looking back, I learned that showing up every week is what builds trust.".to_string(),
        }],
        goals: Some(FutureGoals {
            intended_major: Some("Biochemistry".to_string()),
            career_interests: vec!["computational biology".to_string()],
            statement: Some("I plan to pursue research on protein design.".to_string()),
        }),
    }
}

pub(super) fn scenario_scores() -> BTreeMap<Dimension, f64> {
    Dimension::ALL
        .into_iter()
        .zip([8.0, 7.0, 9.0, 5.0, 6.0, 7.0])
        .collect()
}

pub(super) fn dimension_response(score: f64, tier: &str) -> String {
    let body = json!({
        "dimension_score": score,
        "tier": tier,
        "reasoning": {"summary": "Scripted judgment", "key_observations": [], "scoring_rationale": "fixture"},
        "strengths": [{"text": "Shows up", "supporting_quotes": ["every Saturday"], "rarity": "uncommon"}],
        "weaknesses": ["Could quantify more"],
        "confidence": 0.8
    });
    format!("Here is my assessment.\n```json\n{body}\n```\nThanks!")
}

pub(super) fn holistic_response() -> String {
    json!({
        "first_impression": "A patient builder who teaches.",
        "themes": ["teaching", "research"],
        "standout_signal": "Three years of free tutoring",
        "initial_band": "strong",
        "confidence": 0.7
    })
    .to_string()
}

pub(super) fn narrative_response() -> String {
    json!({
        "archetype_explanation": "Depth in academics paired with genuine inquiry.",
        "hidden_strengths": [{"title": "Teacher", "narrative": "Explains well", "dimensions": ["community_impact"]}],
        "dimensional_interactions": {"synergies": ["Research feeds tutoring"], "tensions": [], "coherence_narrative": "Consistent"},
        "campus_fit_rationale": "Strong research fit.",
        "overall_score": 1.0,
        "confidence": 0.9
    })
    .to_string()
}

/// Plays back a fixed queue of responses; an exhausted queue reports the service as down.
#[derive(Default)]
pub(super) struct ScriptedClient {
    script: Mutex<VecDeque<Result<String, ReasoningError>>>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl ScriptedClient {
    pub(super) fn new(script: Vec<Result<String, ReasoningError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.requests.lock().expect("requests mutex poisoned").len()
    }

    pub(super) fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }
}

#[async_trait]
impl ReasoningClient for ScriptedClient {
    async fn explain(&self, request: &ReasoningRequest) -> Result<String, ReasoningError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.clone());
        self.script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(ReasoningError::Unavailable("script exhausted".to_string())))
    }
}

/// Answers by stage so concurrent analyzers get deterministic replies.
pub(super) struct StageClient {
    scores: BTreeMap<Dimension, f64>,
    narrative: bool,
    calls: AtomicUsize,
    narrative_calls: AtomicUsize,
}

impl StageClient {
    pub(super) fn new(scores: BTreeMap<Dimension, f64>) -> Self {
        Self {
            scores,
            narrative: true,
            calls: AtomicUsize::new(0),
            narrative_calls: AtomicUsize::new(0),
        }
    }

    /// Narrative requests get prose with no JSON in it.
    pub(super) fn with_broken_narrative(mut self) -> Self {
        self.narrative = false;
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn narrative_calls(&self) -> usize {
        self.narrative_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReasoningClient for StageClient {
    async fn explain(&self, request: &ReasoningRequest) -> Result<String, ReasoningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = &request.system_instructions;

        if system.contains("first impression") {
            return Ok(holistic_response());
        }
        if system.contains("writing the synthesis") {
            self.narrative_calls.fetch_add(1, Ordering::SeqCst);
            return if self.narrative {
                Ok(narrative_response())
            } else {
                Ok("I would rather not answer in JSON today.".to_string())
            };
        }
        for dimension in Dimension::ALL {
            if system.contains(&format!("student portfolio: {}.", dimension.label())) {
                let score = self.scores.get(&dimension).copied().unwrap_or(5.0);
                // Advisory tier deliberately stale so re-derivation is exercised.
                return Ok(dimension_response(score, "developing"));
            }
        }
        Err(ReasoningError::Unavailable("unexpected request".to_string()))
    }
}

/// Never answers within any reasonable timeout.
pub(super) struct StalledClient {
    pub(super) delay: Duration,
    pub(super) calls: AtomicUsize,
}

#[async_trait]
impl ReasoningClient for StalledClient {
    async fn explain(&self, _request: &ReasoningRequest) -> Result<String, ReasoningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(dimension_response(9.0, "exceptional"))
    }
}

pub(super) fn evaluator(client: Arc<dyn ReasoningClient>) -> PortfolioEvaluator {
    PortfolioEvaluator::new(client)
        .expect("builtin weights validate")
        .with_policy(LadderPolicy {
            call_timeout: Duration::from_secs(5),
        })
}

pub(super) fn json_body(value: &Value, pointer: &str) -> Value {
    value
        .pointer(pointer)
        .cloned()
        .unwrap_or_else(|| panic!("missing {pointer} in {value}"))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
