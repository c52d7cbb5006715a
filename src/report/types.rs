use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::api::{AnalysisId, SiteId};

/// The four audit categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Technical,
    Content,
    UserExperience,
    Authority,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Technical,
        Category::Content,
        Category::UserExperience,
        Category::Authority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Technical => "Technical SEO",
            Category::Content => "Content quality",
            Category::UserExperience => "User experience",
            Category::Authority => "Authority",
        }
    }
}

/// The full report payload for one completed analysis. `analysis` is the
/// only required top-level field; everything else depends on which
/// sub-analyses the producer ran.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisReport {
    pub analysis: AnalysisSummary,
    #[serde(default)]
    pub core_web_vitals: Option<CoreWebVitals>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub llm_technical_analysis: Option<AiFindings>,
    #[serde(default)]
    pub llm_content_analysis: Option<AiFindings>,
    #[serde(default)]
    pub llm_ux_analysis: Option<AiFindings>,
    #[serde(default)]
    pub llm_authority_analysis: Option<AiFindings>,
    #[serde(default)]
    pub llm_action_plan: Option<ActionPlan>,
}

/// Score block of a report; also the row shape of the history listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisSummary {
    pub id: AnalysisId,
    pub site_id: SiteId,
    pub total_score: f64,
    /// Pre-cap total, when the producer capped the displayed score.
    #[serde(default)]
    pub raw_total_score: Option<f64>,
    #[serde(default)]
    pub is_capped: Option<bool>,
    pub technical_score: f64,
    pub content_score: f64,
    pub user_experience_score: f64,
    pub authority_score: f64,
    #[serde(default)]
    pub score_breakdown: Option<ScoreBreakdown>,
    #[serde(default)]
    pub pagespeed_mobile_score: Option<f64>,
    #[serde(default)]
    pub pagespeed_desktop_score: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Per-category breakdown of how the scores were earned.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(default)]
    pub technical: Option<CategoryBreakdown>,
    #[serde(default)]
    pub content: Option<CategoryBreakdown>,
    #[serde(default)]
    pub user_experience: Option<CategoryBreakdown>,
    #[serde(default)]
    pub authority: Option<CategoryBreakdown>,
}

impl ScoreBreakdown {
    pub fn get(&self, category: Category) -> Option<&CategoryBreakdown> {
        match category {
            Category::Technical => self.technical.as_ref(),
            Category::Content => self.content.as_ref(),
            Category::UserExperience => self.user_experience.as_ref(),
            Category::Authority => self.authority.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryBreakdown {
    pub score: f64,
    /// Weight of this category in the total, in (0, 1].
    pub weight: f64,
    /// Points this category contributed to the total.
    pub contribution: f64,
    /// Check name -> detail, in the producer's order.
    #[serde(default)]
    pub details: IndexMap<String, CheckDetail>,
}

impl CategoryBreakdown {
    /// Whether `contribution` equals `score * weight` up to `tolerance`.
    pub fn contribution_matches(&self, tolerance: f64) -> bool {
        (self.score * self.weight - self.contribution).abs() <= tolerance
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckDetail {
    pub description: String,
    /// Free-form status tag from the producer ("pass", "missing", ...).
    pub status: String,
    pub points_earned: f64,
    pub max_points: f64,
    /// Observed value the check was judged on, when the producer kept it.
    #[serde(default)]
    pub value: Option<String>,
}

/// Display classification of a check's status tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckRating {
    Pass,
    Warn,
    Fail,
}

impl CheckDetail {
    pub fn rating(&self) -> CheckRating {
        match self.status.to_lowercase().as_str() {
            "pass" | "optimal" | "excellent" | "good" => CheckRating::Pass,
            "fail" | "missing" | "poor" => CheckRating::Fail,
            _ => CheckRating::Warn,
        }
    }

    /// Earned fraction of the check's points, clamped to [0, 1].
    pub fn fraction(&self) -> f64 {
        if self.max_points <= 0.0 {
            0.0
        } else {
            (self.points_earned / self.max_points).clamp(0.0, 1.0)
        }
    }
}

/// Core Web Vitals measurements; each is independently optional.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreWebVitals {
    /// Largest Contentful Paint, seconds.
    #[serde(default)]
    pub lcp: Option<f64>,
    /// First Input Delay, milliseconds.
    #[serde(default)]
    pub fid: Option<f64>,
    /// Cumulative Layout Shift, unitless.
    #[serde(default)]
    pub cls: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Complex,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Complex => "complex",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub difficulty: Difficulty,
    /// Expected score gain in points.
    pub expected_impact: f64,
    pub category: String,
}

/// One category's LLM-generated findings. All fields default so a
/// degraded producer's partial objects still parse; an entirely empty
/// object is treated as the section being unavailable.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AiFindings {
    #[serde(default)]
    pub overall_assessment: Option<String>,
    #[serde(default)]
    pub critical_issues: Vec<CriticalIssue>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
    #[serde(default)]
    pub professional_recommendations: Vec<String>,
    /// Category-specific detailed scoring; the shape differs per
    /// category, so it stays opaque.
    #[serde(
        default,
        alias = "technical_score_breakdown",
        alias = "content_score_breakdown",
        alias = "ux_score_breakdown",
        alias = "authority_score_breakdown"
    )]
    pub score_breakdown: Option<serde_json::Value>,
}

impl AiFindings {
    pub fn is_empty(&self) -> bool {
        self.overall_assessment.is_none()
            && self.critical_issues.is_empty()
            && self.strengths.is_empty()
            && self.improvements.is_empty()
            && self.professional_recommendations.is_empty()
            && self.score_breakdown.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CriticalIssue {
    pub issue: String,
    pub impact: Priority,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub solution: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Improvement {
    pub area: String,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub recommended_state: String,
    pub priority: Priority,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub implementation_steps: Vec<String>,
    #[serde(default)]
    pub expected_impact: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl ActionPriority {
    pub fn label(self) -> &'static str {
        match self {
            ActionPriority::Critical => "critical",
            ActionPriority::High => "high",
            ActionPriority::Medium => "medium",
            ActionPriority::Low => "low",
        }
    }
}

/// The LLM-generated action plan. Same empty-object rule as
/// [`AiFindings`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActionPlan {
    #[serde(default)]
    pub executive_summary: Option<String>,
    #[serde(default)]
    pub priority_actions: Vec<PriorityAction>,
    #[serde(default, rename = "30_day_plan")]
    pub plan_30_day: Option<PhasePlan>,
    #[serde(default, rename = "60_day_plan")]
    pub plan_60_day: Option<PhasePlan>,
    #[serde(default, rename = "90_day_plan")]
    pub plan_90_day: Option<PhasePlan>,
    #[serde(default)]
    pub long_term_strategy: Option<String>,
    #[serde(default)]
    pub quick_wins: Vec<String>,
    #[serde(default)]
    pub monitoring_recommendations: Vec<String>,
}

/// Phased windows of the action plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanWindow {
    Days30,
    Days60,
    Days90,
}

impl PlanWindow {
    pub const ALL: [PlanWindow; 3] = [PlanWindow::Days30, PlanWindow::Days60, PlanWindow::Days90];

    pub fn label(self) -> &'static str {
        match self {
            PlanWindow::Days30 => "30-day plan",
            PlanWindow::Days60 => "60-day plan",
            PlanWindow::Days90 => "90-day plan",
        }
    }
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.executive_summary.is_none()
            && self.priority_actions.is_empty()
            && self.plan_30_day.is_none()
            && self.plan_60_day.is_none()
            && self.plan_90_day.is_none()
            && self.long_term_strategy.is_none()
            && self.quick_wins.is_empty()
            && self.monitoring_recommendations.is_empty()
    }

    pub fn phase(&self, window: PlanWindow) -> Option<&PhasePlan> {
        match window {
            PlanWindow::Days30 => self.plan_30_day.as_ref(),
            PlanWindow::Days60 => self.plan_60_day.as_ref(),
            PlanWindow::Days90 => self.plan_90_day.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriorityAction {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    pub priority: ActionPriority,
    /// Expected impact on a 1-10 scale.
    #[serde(default)]
    pub expected_impact: Option<f64>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub required_resources: Vec<String>,
    #[serde(default)]
    pub kpis: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhasePlan {
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub expected_score_improvement: Option<String>,
    #[serde(default)]
    pub key_deliverables: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_deserializes_snake_case() {
        let category: Category = serde_json::from_value(json!("user_experience")).unwrap();
        assert_eq!(category, Category::UserExperience);
    }

    #[test]
    fn test_check_rating_pass_tags() {
        for tag in ["pass", "optimal", "excellent", "good", "PASS"] {
            let check = CheckDetail {
                description: "x".into(),
                status: tag.into(),
                points_earned: 1.0,
                max_points: 1.0,
                value: None,
            };
            assert_eq!(check.rating(), CheckRating::Pass, "tag {}", tag);
        }
    }

    #[test]
    fn test_check_rating_fail_tags() {
        for tag in ["fail", "missing", "poor"] {
            let check = CheckDetail {
                description: "x".into(),
                status: tag.into(),
                points_earned: 0.0,
                max_points: 1.0,
                value: None,
            };
            assert_eq!(check.rating(), CheckRating::Fail, "tag {}", tag);
        }
    }

    #[test]
    fn test_check_rating_unknown_tag_warns() {
        let check = CheckDetail {
            description: "x".into(),
            status: "partial".into(),
            points_earned: 0.5,
            max_points: 1.0,
            value: None,
        };
        assert_eq!(check.rating(), CheckRating::Warn);
    }

    #[test]
    fn test_check_fraction_clamps() {
        let check = CheckDetail {
            description: "x".into(),
            status: "pass".into(),
            points_earned: 12.0,
            max_points: 10.0,
            value: None,
        };
        assert_eq!(check.fraction(), 1.0);

        let zero_max = CheckDetail {
            max_points: 0.0,
            ..check
        };
        assert_eq!(zero_max.fraction(), 0.0);
    }

    #[test]
    fn test_action_plan_day_window_renames() {
        let plan: ActionPlan = serde_json::from_value(json!({
            "30_day_plan": {"focus_areas": ["Fix meta titles"]},
            "90_day_plan": {"key_deliverables": ["Link-building campaign"]}
        }))
        .unwrap();
        assert!(plan.phase(PlanWindow::Days30).is_some());
        assert!(plan.phase(PlanWindow::Days60).is_none());
        assert_eq!(
            plan.phase(PlanWindow::Days90).unwrap().key_deliverables,
            vec!["Link-building campaign"]
        );
    }

    #[test]
    fn test_ai_findings_empty_object() {
        let findings: AiFindings = serde_json::from_value(json!({})).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_ai_findings_with_empty_lists_not_empty() {
        let findings: AiFindings = serde_json::from_value(json!({
            "overall_assessment": "Solid technical base."
        }))
        .unwrap();
        assert!(!findings.is_empty());
        assert!(findings.strengths.is_empty());
    }

    #[test]
    fn test_ai_findings_score_breakdown_alias() {
        let findings: AiFindings = serde_json::from_value(json!({
            "technical_score_breakdown": {"https_security": {"score": 90, "note": "ok"}}
        }))
        .unwrap();
        assert!(findings.score_breakdown.is_some());
    }

    #[test]
    fn test_contribution_matches_within_tolerance() {
        let breakdown = CategoryBreakdown {
            score: 70.0,
            weight: 0.3,
            contribution: 21.0,
            details: IndexMap::new(),
        };
        assert!(breakdown.contribution_matches(0.5));

        let off = CategoryBreakdown {
            contribution: 25.0,
            details: IndexMap::new(),
            ..breakdown
        };
        assert!(!off.contribution_matches(0.5));
    }
}
