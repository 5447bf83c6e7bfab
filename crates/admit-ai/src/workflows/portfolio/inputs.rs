use serde::Serialize;

use super::domain::{AcademicRecord, Activity, Course, Dimension, Essay, FutureGoals, Portfolio};

/// Applicant data problems detected before any service call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("required applicant field '{0}' is missing")]
    MissingField(&'static str),
}

/// The slice of a portfolio one analyzer is allowed to see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dimension", rename_all = "snake_case")]
pub enum DimensionInput {
    Academics(AcademicSlice),
    Leadership(ActivitySlice),
    IntellectualCuriosity(CuriositySlice),
    CommunityImpact(ActivitySlice),
    Authenticity(VoiceSlice),
    FutureReadiness(FutureSlice),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicSlice {
    pub record: AcademicRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySlice {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuriositySlice {
    pub activities: Vec<Activity>,
    pub essays: Vec<Essay>,
    pub courses: Vec<Course>,
    pub academic_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSlice {
    pub essays: Vec<Essay>,
    pub activity_descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FutureSlice {
    pub goals: Option<FutureGoals>,
    pub activities: Vec<Activity>,
    pub essays: Vec<Essay>,
}

impl DimensionInput {
    pub fn from_portfolio(portfolio: &Portfolio, dimension: Dimension) -> Result<Self, InputError> {
        let input = match dimension {
            Dimension::Academics => {
                let record = portfolio
                    .academics
                    .clone()
                    .ok_or(InputError::MissingField("academics"))?;
                DimensionInput::Academics(AcademicSlice { record })
            }
            Dimension::Leadership => DimensionInput::Leadership(ActivitySlice {
                activities: portfolio.activities.clone(),
            }),
            Dimension::IntellectualCuriosity => {
                let (courses, academic_notes) = portfolio
                    .academics
                    .as_ref()
                    .map(|record| (record.courses.clone(), record.notes.clone()))
                    .unwrap_or_default();
                DimensionInput::IntellectualCuriosity(CuriositySlice {
                    activities: portfolio.activities.clone(),
                    essays: portfolio.essays.clone(),
                    courses,
                    academic_notes,
                })
            }
            Dimension::CommunityImpact => DimensionInput::CommunityImpact(ActivitySlice {
                activities: portfolio.activities.clone(),
            }),
            Dimension::Authenticity => {
                let essays: Vec<Essay> = portfolio
                    .essays
                    .iter()
                    .filter(|essay| !essay.body.trim().is_empty())
                    .cloned()
                    .collect();
                let activity_descriptions: Vec<String> = portfolio
                    .activities
                    .iter()
                    .map(|activity| activity.description.trim().to_string())
                    .filter(|description| !description.is_empty())
                    .collect();
                if essays.is_empty() && activity_descriptions.is_empty() {
                    return Err(InputError::MissingField("essays"));
                }
                DimensionInput::Authenticity(VoiceSlice {
                    essays,
                    activity_descriptions,
                })
            }
            Dimension::FutureReadiness => DimensionInput::FutureReadiness(FutureSlice {
                goals: portfolio.goals.clone(),
                activities: portfolio.activities.clone(),
                essays: portfolio.essays.clone(),
            }),
        };
        Ok(input)
    }

    /// Build all six slices, failing on the first missing field.
    pub fn all_from_portfolio(portfolio: &Portfolio) -> Result<Vec<Self>, InputError> {
        Dimension::ALL
            .iter()
            .map(|dimension| Self::from_portfolio(portfolio, *dimension))
            .collect()
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            DimensionInput::Academics(_) => Dimension::Academics,
            DimensionInput::Leadership(_) => Dimension::Leadership,
            DimensionInput::IntellectualCuriosity(_) => Dimension::IntellectualCuriosity,
            DimensionInput::CommunityImpact(_) => Dimension::CommunityImpact,
            DimensionInput::Authenticity(_) => Dimension::Authenticity,
            DimensionInput::FutureReadiness(_) => Dimension::FutureReadiness,
        }
    }

    /// All applicant-authored text in this slice, one passage per line.
    pub fn source_text(&self) -> String {
        let mut passages: Vec<String> = Vec::new();
        match self {
            DimensionInput::Academics(slice) => {
                passages.extend(slice.record.courses.iter().map(|course| course.name.clone()));
                passages.extend(slice.record.awards.iter().cloned());
                passages.extend(slice.record.notes.iter().cloned());
            }
            DimensionInput::Leadership(slice) | DimensionInput::CommunityImpact(slice) => {
                passages.extend(slice.activities.iter().map(activity_passage));
            }
            DimensionInput::IntellectualCuriosity(slice) => {
                passages.extend(slice.activities.iter().map(activity_passage));
                passages.extend(slice.essays.iter().map(|essay| essay.body.clone()));
                passages.extend(slice.courses.iter().map(|course| course.name.clone()));
                passages.extend(slice.academic_notes.iter().cloned());
            }
            DimensionInput::Authenticity(slice) => {
                passages.extend(slice.essays.iter().map(|essay| essay.body.clone()));
                passages.extend(slice.activity_descriptions.iter().cloned());
            }
            DimensionInput::FutureReadiness(slice) => {
                if let Some(goals) = &slice.goals {
                    passages.extend(goals.intended_major.iter().cloned());
                    passages.extend(goals.career_interests.iter().cloned());
                    passages.extend(goals.statement.iter().cloned());
                }
                passages.extend(slice.activities.iter().map(activity_passage));
                passages.extend(slice.essays.iter().map(|essay| essay.body.clone()));
            }
        }
        passages
            .into_iter()
            .map(|passage| passage.trim().to_string())
            .filter(|passage| !passage.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn activity_passage(activity: &Activity) -> String {
    let mut passage = activity.title.trim().to_string();
    if let Some(role) = activity.role.as_deref().filter(|role| !role.trim().is_empty()) {
        passage.push_str(", ");
        passage.push_str(role.trim());
    }
    if !activity.description.trim().is_empty() {
        passage.push_str(". ");
        passage.push_str(activity.description.trim());
    }
    passage
}

/// Every passage of the portfolio, used by the holistic read.
pub fn portfolio_text(portfolio: &Portfolio) -> String {
    let mut passages: Vec<String> = portfolio.activities.iter().map(activity_passage).collect();
    passages.extend(portfolio.essays.iter().map(|essay| essay.body.clone()));
    if let Some(goals) = &portfolio.goals {
        passages.extend(goals.statement.iter().cloned());
    }
    if let Some(record) = &portfolio.academics {
        passages.extend(record.notes.iter().cloned());
    }
    passages
        .into_iter()
        .map(|passage| passage.trim().to_string())
        .filter(|passage| !passage.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portfolio_without_academics() -> Portfolio {
        Portfolio {
            activities: vec![Activity {
                title: "Robotics Club".to_string(),
                role: Some("Captain".to_string()),
                description: "Led a team of 12 builders.".to_string(),
                ..Activity::default()
            }],
            ..Portfolio::default()
        }
    }

    #[test]
    fn academics_slice_requires_record() {
        let err =
            DimensionInput::from_portfolio(&portfolio_without_academics(), Dimension::Academics)
                .unwrap_err();
        assert_eq!(err, InputError::MissingField("academics"));
    }

    #[test]
    fn authenticity_accepts_activity_descriptions_without_essays() {
        let input =
            DimensionInput::from_portfolio(&portfolio_without_academics(), Dimension::Authenticity)
                .expect("descriptions are enough");
        assert_eq!(input.dimension(), Dimension::Authenticity);
        assert!(input.source_text().contains("Led a team of 12 builders."));
    }

    #[test]
    fn authenticity_rejects_portfolio_without_any_prose() {
        let err = DimensionInput::from_portfolio(&Portfolio::default(), Dimension::Authenticity)
            .unwrap_err();
        assert_eq!(err, InputError::MissingField("essays"));
    }

    #[test]
    fn leadership_source_text_includes_role() {
        let input =
            DimensionInput::from_portfolio(&portfolio_without_academics(), Dimension::Leadership)
                .unwrap();
        assert_eq!(
            input.source_text(),
            "Robotics Club, Captain. Led a team of 12 builders."
        );
    }
}
