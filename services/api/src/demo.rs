use crate::commands::{render_entry, render_synthesis};
use crate::infra::{build_evaluator, offline_evaluator};
use admit_ai::config::AppConfig;
use admit_ai::error::AppError;
use admit_ai::workflows::entry::EntryOptions;
use admit_ai::workflows::portfolio::{
    AcademicRecord, Activity, ActivityCategory, ClassRank, Course, CourseLevel, Essay,
    EvaluationMode, FutureGoals, Portfolio, PortfolioEvaluator,
};
use clap::Args;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation mode for the sample portfolio (defaults to the configured mode)
    #[arg(long)]
    pub(crate) mode: Option<EvaluationMode>,
    /// Skip the reasoning service even when an API key is configured.
    #[arg(long)]
    pub(crate) offline: bool,
    /// Skip the activity-description portion of the demo.
    #[arg(long)]
    pub(crate) skip_entries: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        mode,
        offline,
        skip_entries,
    } = args;

    let evaluator = demo_evaluator(offline)?;
    let mode = mode.unwrap_or_else(|| evaluator.default_mode());

    println!("Portfolio evaluation demo ({})", mode.display_name());
    let portfolio = sample_portfolio();
    let synthesis = evaluator.evaluate_portfolio(&portfolio, mode.key()).await?;
    render_synthesis(&synthesis);

    if skip_entries {
        return Ok(());
    }

    println!("\nActivity description scoring");
    let options = EntryOptions::default();
    for (label, text) in sample_entries() {
        let report = evaluator.score_entry(text, &options).await;
        render_entry(Some(label), &report);
    }

    Ok(())
}

fn demo_evaluator(offline: bool) -> Result<PortfolioEvaluator, AppError> {
    if offline {
        return offline_evaluator();
    }
    let config = AppConfig::load()?;
    build_evaluator(&config)
}

pub(crate) fn sample_portfolio() -> Portfolio {
    Portfolio {
        applicant_id: Some("demo-applicant".to_string()),
        academics: Some(AcademicRecord {
            gpa_unweighted: Some(3.86),
            gpa_weighted: Some(4.31),
            class_rank: Some(ClassRank {
                position: 12,
                class_size: 380,
            }),
            courses: vec![
                course("AP Physics C", CourseLevel::AdvancedPlacement, "A"),
                course("AP Literature", CourseLevel::AdvancedPlacement, "A-"),
                course("Linear Algebra", CourseLevel::DualEnrollment, "A"),
                course("Honors Chemistry", CourseLevel::Honors, "B+"),
            ],
            awards: vec!["National Merit Commended Scholar".to_string()],
            ..AcademicRecord::default()
        }),
        activities: vec![
            Activity {
                title: "Coding for Seniors".to_string(),
                role: Some("Founder and lead instructor".to_string()),
                organization: Some("Eastside Public Library".to_string()),
                category: ActivityCategory::CommunityService,
                description: "Started weekly workshops teaching 60 older adults to video call their families, and trained 8 classmates to run sessions.".to_string(),
                hours_per_week: Some(3.0),
                weeks_per_year: Some(36),
                years_active: Some(2),
            },
            Activity {
                title: "Astronomy Research Program".to_string(),
                role: Some("Student researcher".to_string()),
                organization: None,
                category: ActivityCategory::Research,
                description: "Analyzed variable-star light curves with Python and co-authored a poster on period estimation errors.".to_string(),
                hours_per_week: Some(8.0),
                weeks_per_year: Some(10),
                years_active: Some(1),
            },
            Activity {
                title: "Debate Team".to_string(),
                role: Some("Captain".to_string()),
                organization: None,
                category: ActivityCategory::Academic,
                description: "Coached novices on case writing and qualified for the state tournament.".to_string(),
                hours_per_week: Some(6.0),
                weeks_per_year: Some(30),
                years_active: Some(3),
            },
        ],
        essays: vec![Essay {
            prompt: "Reflect on an idea that changed how you see the world.".to_string(),
            body: "My grandmother hung up on me three times before our first successful video call. \"Where is your face?\" she asked, laughing, while I stared at her ceiling fan. I was frustrated, but I realized the problem was not her patience but my instructions. That night I rewrote my guide in large print with pictures, and I learned that teaching starts with listening to where someone is stuck.".to_string(),
        }],
        goals: Some(FutureGoals {
            intended_major: Some("Computer Science".to_string()),
            career_interests: vec!["accessible technology".to_string()],
            statement: Some(
                "I want to build software that older adults can use without a grandchild nearby."
                    .to_string(),
            ),
        }),
    }
}

fn course(name: &str, level: CourseLevel, grade: &str) -> Course {
    Course {
        name: name.to_string(),
        level,
        grade: Some(grade.to_string()),
    }
}

fn sample_entries() -> [(&'static str, &'static str); 2] {
    [
        (
            "Detailed",
            "I founded a library workshop series after watching my grandmother struggle with video calls. Over two years I taught 60 adults, wrote a large-print guide, and trained 8 classmates to lead sessions. I learned that patience is a skill you practice, and our waitlist grew to 25 people every month.",
        ),
        ("Vague", "Volunteered at the library sometimes."),
    ]
}
