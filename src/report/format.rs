//! Plain-text terminal formatting.
//!
//! Formatting lives here so the fitting and forecasting code stays free of
//! presentation details, and output changes are localized.

use crate::categorize::needs_manual_review;
use crate::domain::{CategoryPrediction, Goal, TrainConfig};
use crate::forecast::{
    GoalReport, IncomeForecast, RecommendationType, RiskType, SavingsCapacityForecast,
    SpendingForecast,
};
use crate::models::RegressionModel;
use crate::train::TrainingReport;

/// Training run summary: data sizes, per-target candidates, chosen models.
pub fn format_training_report(report: &TrainingReport, config: &TrainConfig) -> String {
    let mut out = String::new();

    out.push_str("=== finfc - Model Training ===\n");
    match &config.dataset {
        Some(path) => out.push_str(&format!("Dataset: {}\n", path.display())),
        None if config.sample_count == 0 => out.push_str("Dataset: built-in seed table\n"),
        None => out.push_str(&format!(
            "Dataset: synthetic (n={}, seed={})\n",
            config.sample_count, config.seed
        )),
    }
    out.push_str(&format!(
        "Split: train={} test={} (ratio={:.2}, seed={})\n",
        report.train_size, report.test_size, config.test_ratio, config.seed
    ));

    for trained in &report.models {
        out.push_str(&format!("\nTarget: {}\n", trained.target));
        for candidate in &trained.candidates {
            let chosen = if Some(candidate.algorithm) == trained.algorithm { "*" } else { " " };
            let m = &candidate.metrics;
            out.push_str(&format!(
                "{chosen} {:<14} R2={:>8.4} acc={:>6.1}% MSE={:.4} MAE={:.4}\n",
                candidate.algorithm.to_string(),
                m.r_squared,
                m.accuracy * 100.0,
                m.mse,
                m.mae
            ));
        }
        for (algorithm, reason) in &trained.skipped {
            out.push_str(&format!("  (skipped {algorithm}) {reason}\n"));
        }
        if trained.algorithm.is_none() {
            out.push_str("  no algorithm fit; using constant mean\n");
        }
        out.push_str(&format!("  model: {}\n", fmt_model(&trained.model)));
    }

    out
}

pub fn format_spending_forecast(forecast: &SpendingForecast) -> String {
    let mut out = String::new();
    out.push_str("=== Spending trend ===\n");
    out.push_str(&format!("Trend: {}\n", forecast.trend.as_str()));
    out.push_str(&format!("Confidence: {:.2}\n", forecast.confidence));

    let Some(prediction) = &forecast.prediction else {
        out.push_str("Not enough monthly data for a prediction.\n");
        return out;
    };

    out.push_str("\nMonthly totals:\n");
    for m in &prediction.monthly_totals {
        out.push_str(&format!("  {}-{:02} {:>12.2}\n", m.year, m.month, m.total));
    }
    out.push_str(&format!("\nModel: {}\n", fmt_model(&prediction.model)));
    out.push_str("Next months:\n");
    for (i, value) in prediction.next_months.iter().enumerate() {
        out.push_str(&format!("  +{} {:>12.2}\n", i + 1, value));
    }
    out
}

pub fn format_income_forecast(forecast: &IncomeForecast) -> String {
    let mut out = String::new();
    out.push_str("=== Income growth ===\n");
    out.push_str(&format!("Trend: {}\n", forecast.trend.as_str()));
    out.push_str(&format!("Growth: {:.2}% per period\n", forecast.growth_rate));
    out.push_str(&format!("Confidence: {:.2}\n", forecast.confidence));
    out.push_str(&format!("Model: {}\n", fmt_model(&forecast.model)));
    out.push_str(&format!("Predictions: {}\n", fmt_vec(&forecast.predictions)));
    out
}

pub fn format_savings_forecast(forecast: &SavingsCapacityForecast) -> String {
    let mut out = String::new();
    out.push_str("=== Savings capacity ===\n");
    for (label, t) in [("income", &forecast.income), ("expenses", &forecast.expenses)] {
        out.push_str(&format!(
            "{label:<9} avg={:.2} current={:.2} slope={:.2} trend={} vol={:.3}\n",
            t.average,
            t.current,
            t.slope,
            t.direction.as_str(),
            t.volatility
        ));
    }
    out.push_str(&format!("Confidence: {:.2}\n\n", forecast.confidence));

    out.push_str(&format!("{:>6} {:>12} {:>12} {:>12}\n", "period", "income", "expenses", "capacity"));
    out.push_str(&format!("{:-<6} {:-<12} {:-<12} {:-<12}\n", "", "", "", ""));
    for p in &forecast.projections {
        out.push_str(&format!(
            "{:>6} {:>12.2} {:>12.2} {:>12.2}\n",
            p.period, p.income, p.expenses, p.capacity
        ));
    }
    out
}

/// Goal outlook with risks and recommendations.
pub fn format_goal_report(goal: &Goal, report: &GoalReport) -> String {
    let mut out = String::new();
    let outlook = &report.outlook;

    out.push_str(&format!("=== Goal {} ===\n", goal.id));
    out.push_str(&format!(
        "Target: {:.2} | current: {:.2} | progress: {:.1}%\n",
        goal.target_amount,
        goal.current_amount,
        outlook.progress * 100.0
    ));
    match goal.deadline {
        Some(deadline) => out.push_str(&format!(
            "Deadline: {deadline} ({})\n",
            outlook
                .months_remaining
                .map(|m| format!("{m:.1} months"))
                .unwrap_or_default()
        )),
        None => out.push_str("Deadline: none\n"),
    }
    if let Some(required) = outlook.required_monthly {
        out.push_str(&format!("Required monthly: {required:.2}\n"));
    }
    if let Some(ratio) = outlook.capacity_ratio {
        out.push_str(&format!("Capacity ratio: {ratio:.2}\n"));
    }
    out.push_str(&format!("Probability: {:.0}%\n", outlook.probability * 100.0));

    out.push_str("\nRisks:\n");
    if report.risks.is_empty() {
        out.push_str("  none\n");
    }
    for risk in &report.risks {
        out.push_str(&format!(
            "  [{}] {}: {}\n    -> {}\n",
            risk.severity.as_str(),
            risk_label(risk.kind),
            risk.description,
            risk.mitigation
        ));
    }

    out.push_str("\nRecommendations:\n");
    if report.recommendations.is_empty() {
        out.push_str("  none\n");
    }
    for rec in &report.recommendations {
        out.push_str(&format!(
            "  [{}] {} ({})\n    {}\n    -> {}\n",
            rec.priority.as_str(),
            rec.title,
            recommendation_label(rec.kind),
            rec.description,
            rec.action
        ));
    }
    out
}

/// One line per description: text, category, confidence, review flag.
pub fn format_categorizations(descriptions: &[String], predictions: &[CategoryPrediction]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<32} {:<15} {:>10} {:<6}\n",
        "description", "category", "confidence", "review"
    ));
    out.push_str(&format!("{:-<32} {:-<15} {:-<10} {:-<6}\n", "", "", "", ""));

    let mut review = 0usize;
    for (description, p) in descriptions.iter().zip(predictions) {
        let flag = if needs_manual_review(p.confidence) {
            review += 1;
            "yes"
        } else {
            ""
        };
        let line = format!(
            "{:<32} {:<15} {:>10.2} {:<6}",
            truncate(description, 32),
            p.category.as_str(),
            p.confidence,
            flag
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push_str(&format!("\n{} of {} need manual review\n", review, predictions.len()));
    out
}

fn fmt_model(model: &RegressionModel) -> String {
    match model {
        RegressionModel::Linear { slope, intercept, r_squared } => {
            format!("linear y = {slope:.6}x + {intercept:.6} (R2={r_squared:.4})")
        }
        RegressionModel::Polynomial { coefficients, r_squared } => {
            format!("polynomial coeffs={} (R2={r_squared:.4})", fmt_vec(coefficients))
        }
        RegressionModel::Exponential { a, b, r_squared } => {
            format!("exponential y = {a:.6}e^({b:.6}x) (R2={r_squared:.4})")
        }
        RegressionModel::Mean { value } => format!("mean y = {value:.6}"),
    }
}

fn risk_label(kind: RiskType) -> &'static str {
    match kind {
        RiskType::Time => "time",
        RiskType::Capacity => "capacity",
        RiskType::Market => "market",
        RiskType::Progress => "progress",
    }
}

fn recommendation_label(kind: RecommendationType) -> &'static str {
    match kind {
        RecommendationType::BudgetOptimization => "budget_optimization",
        RecommendationType::TimelineAdjustment => "timeline_adjustment",
        RecommendationType::IncomeOptimization => "income_optimization",
        RecommendationType::SpendingOptimization => "spending_optimization",
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
