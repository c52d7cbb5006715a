pub mod section;
pub mod types;

pub use self::section::Section;

use self::types::{
    ActionPlan, AiFindings, AnalysisReport, Category, CategoryBreakdown, Recommendation,
};
use crate::config::{CLS_TARGET, FID_TARGET_MS, LCP_TARGET_SECS};

/// Read-only view model over one analysis report. The payload is an
/// immutable snapshot: accessors expose it, nothing mutates it, and the
/// next run replaces it wholesale.
pub struct ReportModel {
    report: AnalysisReport,
}

impl ReportModel {
    pub fn new(report: AnalysisReport) -> Self {
        Self { report }
    }

    pub fn raw(&self) -> &AnalysisReport {
        &self.report
    }

    /// Full-precision total score.
    pub fn total_score(&self) -> f64 {
        self.report.analysis.total_score
    }

    /// Total score rounded for display.
    pub fn total_score_display(&self) -> i64 {
        self.total_score().round() as i64
    }

    /// Pre-cap total, when the producer capped the displayed score.
    pub fn raw_total_score(&self) -> Option<f64> {
        self.report.analysis.raw_total_score
    }

    pub fn is_capped(&self) -> bool {
        self.report.analysis.is_capped.unwrap_or(false)
    }

    pub fn category_score(&self, category: Category) -> f64 {
        let analysis = &self.report.analysis;
        match category {
            Category::Technical => analysis.technical_score,
            Category::Content => analysis.content_score,
            Category::UserExperience => analysis.user_experience_score,
            Category::Authority => analysis.authority_score,
        }
    }

    pub fn category_score_display(&self, category: Category) -> i64 {
        self.category_score(category).round() as i64
    }

    /// Check-level breakdown for one category, when the producer sent it.
    pub fn breakdown_for(&self, category: Category) -> Section<&CategoryBreakdown> {
        self.report
            .analysis
            .score_breakdown
            .as_ref()
            .and_then(|b| b.get(category))
            .into()
    }

    /// PageSpeed scores; present when at least one device was measured.
    pub fn pagespeed(&self) -> Section<PagespeedScores> {
        let analysis = &self.report.analysis;
        if analysis.pagespeed_mobile_score.is_none() && analysis.pagespeed_desktop_score.is_none() {
            Section::Unavailable
        } else {
            Section::Present(PagespeedScores {
                mobile: analysis.pagespeed_mobile_score,
                desktop: analysis.pagespeed_desktop_score,
            })
        }
    }

    /// The measured subset of Core Web Vitals, each classified against
    /// its fixed display target.
    pub fn vitals_summary(&self) -> Vec<VitalReading> {
        let mut readings = Vec::new();
        if let Some(vitals) = &self.report.core_web_vitals {
            if let Some(lcp) = vitals.lcp {
                readings.push(VitalReading {
                    metric: VitalMetric::Lcp,
                    value: lcp,
                    within_target: lcp <= LCP_TARGET_SECS,
                });
            }
            if let Some(fid) = vitals.fid {
                readings.push(VitalReading {
                    metric: VitalMetric::Fid,
                    value: fid,
                    within_target: fid <= FID_TARGET_MS,
                });
            }
            if let Some(cls) = vitals.cls {
                readings.push(VitalReading {
                    metric: VitalMetric::Cls,
                    value: cls,
                    within_target: cls <= CLS_TARGET,
                });
            }
        }
        readings
    }

    /// Recommendations in the producer's order; the producer is
    /// authoritative on priority ordering.
    pub fn recommendations(&self) -> &[Recommendation] {
        &self.report.recommendations
    }

    /// LLM findings for one category. An absent or empty object means
    /// the analysis was not run for this report, distinct from findings
    /// that exist but list nothing.
    pub fn ai_findings(&self, category: Category) -> Section<&AiFindings> {
        let findings = match category {
            Category::Technical => &self.report.llm_technical_analysis,
            Category::Content => &self.report.llm_content_analysis,
            Category::UserExperience => &self.report.llm_ux_analysis,
            Category::Authority => &self.report.llm_authority_analysis,
        };
        match findings {
            Some(findings) if !findings.is_empty() => Section::Present(findings),
            _ => Section::Unavailable,
        }
    }

    /// The LLM action plan; the priority/timeline/quick-wins views are
    /// projections over this one structure.
    pub fn action_plan(&self) -> Section<&ActionPlan> {
        match &self.report.llm_action_plan {
            Some(plan) if !plan.is_empty() => Section::Present(plan),
            _ => Section::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagespeedScores {
    pub mobile: Option<f64>,
    pub desktop: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalMetric {
    Lcp,
    Fid,
    Cls,
}

impl VitalMetric {
    pub fn label(self) -> &'static str {
        match self {
            VitalMetric::Lcp => "Largest Contentful Paint",
            VitalMetric::Fid => "First Input Delay",
            VitalMetric::Cls => "Cumulative Layout Shift",
        }
    }

    pub fn target_label(self) -> &'static str {
        match self {
            VitalMetric::Lcp => "<= 2.5s",
            VitalMetric::Fid => "<= 100ms",
            VitalMetric::Cls => "<= 0.1",
        }
    }
}

/// One measured vital, classified for display only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalReading {
    pub metric: VitalMetric,
    pub value: f64,
    pub within_target: bool,
}

impl VitalReading {
    pub fn display_value(&self) -> String {
        match self.metric {
            VitalMetric::Lcp => format!("{:.2}s", self.value),
            VitalMetric::Fid => format!("{:.0}ms", self.value),
            VitalMetric::Cls => format!("{:.3}", self.value),
        }
    }
}
