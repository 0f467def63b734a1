//! Resume screening, written batch-style: each stage is one traced call over
//! the whole applicant list, so a request leaves one record per stage no
//! matter how many applicants it screens.

use serde::{Deserialize, Serialize};

use explainx_core::{traced, TraceContext};

use crate::functions::round2;

/// Experience score marking an applicant below the minimum.
pub const DISQUALIFIED: f64 = -100.0;
/// How many candidates `process_applications` returns.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub email: String,
    pub verified: bool,
    pub experience_years: f64,
    pub domain: String,
    pub current_salary: f64,
    pub expected_salary: f64,
    pub cgpa: f64,
}

/// The role being hired for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub domain: String,
    pub min_experience: f64,
    pub salary_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub application: Application,
    pub final_score: f64,
}

traced! {
    /// Verified applicants with a plausible email address.
    pub fn validate_users(ctx: &TraceContext, apps: &[Application]) -> Vec<bool> {
        apps.iter().map(|app| app.verified && app.email.contains('@')).collect()
    }
}

traced! {
    /// Two points per year above the minimum, capped at ten; below the
    /// minimum is disqualifying.
    pub fn calculate_experience_scores(ctx: &TraceContext, apps: &[Application], min_exp: f64) -> Vec<f64> {
        apps.iter()
            .map(|app| {
                if app.experience_years < min_exp {
                    DISQUALIFIED
                } else {
                    ((app.experience_years - min_exp) * 2.0).min(10.0)
                }
            })
            .collect()
    }
}

traced! {
    pub fn calculate_domain_scores(ctx: &TraceContext, apps: &[Application], target_domain: &str) -> Vec<f64> {
        apps.iter()
            .map(|app| if app.domain == target_domain { 20.0 } else { 0.0 })
            .collect()
    }
}

traced! {
    /// Reward asks within budget and penalize those far above it.
    pub fn calculate_salary_scores(ctx: &TraceContext, apps: &[Application], jd_salary: f64) -> Vec<f64> {
        apps.iter()
            .map(|app| {
                let expected = app.expected_salary;
                if expected <= jd_salary {
                    return 10.0;
                }
                let over = (expected - jd_salary) / jd_salary;
                if over <= 0.1 {
                    5.0
                } else if over <= 0.2 {
                    0.0
                } else {
                    -20.0
                }
            })
            .collect()
    }
}

traced! {
    pub fn calculate_cgpa_scores(ctx: &TraceContext, apps: &[Application]) -> Vec<f64> {
        apps.iter()
            .map(|app| if app.cgpa < 6.0 { 0.0 } else { (app.cgpa - 6.0) * 2.5 })
            .collect()
    }
}

traced! {
    /// Score every applicant against `jd` and return the best `TOP_N`.
    ///
    /// Invalid and disqualified applicants are dropped. Ties keep input order.
    pub fn process_applications(
        ctx: &TraceContext,
        applications: &[Application],
        jd: &JobDescription,
    ) -> Vec<ScoredCandidate> {
        let valid = validate_users(ctx, applications);
        let experience = calculate_experience_scores(ctx, applications, jd.min_experience);
        let domain = calculate_domain_scores(ctx, applications, &jd.domain);
        let salary = calculate_salary_scores(ctx, applications, jd.salary_budget);
        let cgpa = calculate_cgpa_scores(ctx, applications);

        let mut scored: Vec<ScoredCandidate> = applications
            .iter()
            .enumerate()
            .filter(|(i, _)| valid[*i] && experience[*i] != DISQUALIFIED)
            .map(|(i, app)| ScoredCandidate {
                application: app.clone(),
                final_score: round2(experience[i] + domain[i] + salary[i] + cgpa[i]),
            })
            .collect();

        scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        scored.truncate(TOP_N);
        scored
    }
}
