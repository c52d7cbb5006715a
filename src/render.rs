use crate::report::types::{AiFindings, Category, CheckRating, PlanWindow};
use crate::report::{ReportModel, Section};

/// Render the whole report as terminal text. Sections the producer did
/// not run render an explicit placeholder instead of disappearing, so a
/// reduced pipeline is visible as such.
pub fn render_report(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str(&render_scores(model));
    out.push_str(&render_breakdown(model));
    out.push_str(&render_pagespeed(model));
    out.push_str(&render_vitals(model));
    out.push_str(&render_recommendations(model));
    out.push_str(&render_ai_findings(model));
    out.push_str(&render_action_plan(model));
    out
}

pub fn render_scores(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str("# SEO Report\n\n");
    if model.is_capped() {
        if let Some(raw) = model.raw_total_score() {
            out.push_str(&format!(
                "Total score: {}/100 (capped from {:.1})\n",
                model.total_score_display(),
                raw
            ));
        } else {
            out.push_str(&format!(
                "Total score: {}/100 (capped)\n",
                model.total_score_display()
            ));
        }
    } else {
        out.push_str(&format!("Total score: {}/100\n", model.total_score_display()));
    }
    for category in Category::ALL {
        out.push_str(&format!(
            "  {:<16} {}\n",
            category.label(),
            model.category_score_display(category)
        ));
    }
    out.push('\n');
    out
}

pub fn render_breakdown(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str("## Score breakdown\n");
    let available = Category::ALL
        .iter()
        .any(|c| model.breakdown_for(*c).is_available());
    if !available {
        out.push_str("Score breakdown not available.\n\n");
        return out;
    }
    for category in Category::ALL {
        let Section::Present(breakdown) = model.breakdown_for(category) else {
            continue;
        };
        out.push_str(&format!(
            "{}: {:.0}/100, weight {:.0}%, contributes {:.1} points\n",
            category.label(),
            breakdown.score,
            breakdown.weight * 100.0,
            breakdown.contribution
        ));
        for check in breakdown.details.values() {
            let mark = match check.rating() {
                CheckRating::Pass => "+",
                CheckRating::Warn => "~",
                CheckRating::Fail => "-",
            };
            out.push_str(&format!(
                "  [{}] {} ({:.0}/{:.0})",
                mark, check.description, check.points_earned, check.max_points
            ));
            if let Some(value) = &check.value {
                out.push_str(&format!(": {}", value));
            }
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

pub fn render_pagespeed(model: &ReportModel) -> String {
    let mut out = String::new();
    let Section::Present(scores) = model.pagespeed() else {
        return out;
    };
    out.push_str("## PageSpeed\n");
    if let Some(mobile) = scores.mobile {
        out.push_str(&format!("  Mobile:  {:.0}\n", mobile));
    }
    if let Some(desktop) = scores.desktop {
        out.push_str(&format!("  Desktop: {:.0}\n", desktop));
    }
    out.push('\n');
    out
}

pub fn render_vitals(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str("## Core Web Vitals\n");
    let readings = model.vitals_summary();
    if readings.is_empty() {
        out.push_str("Core Web Vitals not available.\n\n");
        return out;
    }
    for reading in readings {
        let verdict = if reading.within_target { "ok" } else { "over target" };
        out.push_str(&format!(
            "  {:<26} {:>8}  (target {}, {})\n",
            reading.metric.label(),
            reading.display_value(),
            reading.metric.target_label(),
            verdict
        ));
    }
    out.push('\n');
    out
}

pub fn render_recommendations(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str("## Recommendations\n");
    let recommendations = model.recommendations();
    if recommendations.is_empty() {
        out.push_str("No recommendations.\n\n");
        return out;
    }
    for rec in recommendations {
        out.push_str(&format!(
            "- {} [{} priority, {} to implement, +{:.0} points, {}]\n  {}\n",
            rec.title,
            rec.priority.label(),
            rec.difficulty.label(),
            rec.expected_impact,
            rec.category,
            rec.description
        ));
    }
    out.push('\n');
    out
}

pub fn render_ai_findings(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str("## AI analysis\n");
    for category in Category::ALL {
        out.push_str(&format!("### {}\n", category.label()));
        match model.ai_findings(category) {
            Section::Present(findings) => out.push_str(&render_findings_body(findings)),
            Section::Unavailable => out.push_str(
                "AI analysis not available. Configure an LLM API key on the backend to enable it.\n",
            ),
        }
    }
    out.push('\n');
    out
}

fn render_findings_body(findings: &AiFindings) -> String {
    let mut out = String::new();
    if let Some(assessment) = &findings.overall_assessment {
        out.push_str(&format!("{}\n", assessment));
    }
    for issue in &findings.critical_issues {
        out.push_str(&format!(
            "! {} (impact: {})\n",
            issue.issue,
            issue.impact.label()
        ));
        if !issue.explanation.is_empty() {
            out.push_str(&format!("  {}\n", issue.explanation));
        }
        if !issue.solution.is_empty() {
            out.push_str(&format!("  Fix: {}\n", issue.solution));
        }
    }
    for strength in &findings.strengths {
        out.push_str(&format!("+ {}\n", strength));
    }
    for improvement in &findings.improvements {
        out.push_str(&format!(
            "> {} [{} priority, {}]\n",
            improvement.area,
            improvement.priority.label(),
            improvement.difficulty.label()
        ));
        if !improvement.current_state.is_empty() {
            out.push_str(&format!("  Now: {}\n", improvement.current_state));
        }
        if !improvement.recommended_state.is_empty() {
            out.push_str(&format!("  Target: {}\n", improvement.recommended_state));
        }
        for (i, step) in improvement.implementation_steps.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, step));
        }
        if let Some(impact) = &improvement.expected_impact {
            out.push_str(&format!("  Expected: {}\n", impact));
        }
    }
    for rec in &findings.professional_recommendations {
        out.push_str(&format!("* {}\n", rec));
    }
    out
}

pub fn render_action_plan(model: &ReportModel) -> String {
    let mut out = String::new();
    out.push_str("## Action plan\n");
    let Section::Present(plan) = model.action_plan() else {
        out.push_str(
            "Action plan not available. Configure an LLM API key on the backend to enable it.\n",
        );
        return out;
    };

    if let Some(summary) = &plan.executive_summary {
        out.push_str(&format!("{}\n", summary));
    }

    out.push_str("\n### Priority actions\n");
    if plan.priority_actions.is_empty() {
        out.push_str("No priority actions found.\n");
    }
    for action in &plan.priority_actions {
        out.push_str(&format!("- {} [{}]", action.title, action.priority.label()));
        if let Some(category) = &action.category {
            out.push_str(&format!(" ({})", category));
        }
        if let Some(impact) = action.expected_impact {
            out.push_str(&format!(" impact {:.0}/10", impact));
        }
        if let Some(timeline) = &action.timeline {
            out.push_str(&format!(", {}", timeline));
        }
        out.push('\n');
        for (i, step) in action.steps.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, step));
        }
        if !action.required_resources.is_empty() {
            out.push_str(&format!("  Resources: {}\n", action.required_resources.join(", ")));
        }
        if !action.kpis.is_empty() {
            out.push_str(&format!("  KPIs: {}\n", action.kpis.join(", ")));
        }
    }

    out.push_str("\n### Timeline\n");
    let mut any_phase = false;
    for window in PlanWindow::ALL {
        let Some(phase) = plan.phase(window) else {
            continue;
        };
        any_phase = true;
        out.push_str(&format!("{}\n", window.label()));
        for area in &phase.focus_areas {
            out.push_str(&format!("  Focus: {}\n", area));
        }
        if let Some(improvement) = &phase.expected_score_improvement {
            out.push_str(&format!("  Expected improvement: {}\n", improvement));
        }
        for deliverable in &phase.key_deliverables {
            out.push_str(&format!("  Deliverable: {}\n", deliverable));
        }
    }
    if !any_phase {
        out.push_str("No timeline plans found.\n");
    }
    if let Some(strategy) = &plan.long_term_strategy {
        out.push_str(&format!("Long term: {}\n", strategy));
    }

    out.push_str("\n### Quick wins\n");
    if plan.quick_wins.is_empty() {
        out.push_str("No quick wins found.\n");
    }
    for win in &plan.quick_wins {
        out.push_str(&format!("- {}\n", win));
    }
    if !plan.monitoring_recommendations.is_empty() {
        out.push_str("Ongoing monitoring:\n");
        for rec in &plan.monitoring_recommendations {
            out.push_str(&format!("- {}\n", rec));
        }
    }
    out
}
