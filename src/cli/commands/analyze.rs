//! `buyer analyze` command - full procurement comparison for a project

use console::style;
use miette::Result;

use crate::cli::helpers::{
    format_money, format_percent, print_header, print_section, print_structured, risk_style,
    truncate_str, ReportTable, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Id;
use crate::procurement::ProjectComparison;

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    /// Project id
    pub project: Id,
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let comparison = session.service(global).comparison(args.project)?;

    if print_structured(&comparison, session.format)? {
        return Ok(());
    }

    let items = item_table(&comparison);
    if session.format != OutputFormat::Auto {
        items.print(session.format);
        return Ok(());
    }

    print_header(&format!("Procurement Analysis: {}", comparison.project_name));
    println!(
        "Strategy: {}   Vendors needed: {}",
        style(comparison.strategy).cyan(),
        comparison.total_vendors_needed
    );
    println!(
        "BOM items: {} ({} covered, {} partial, {} without quotes)",
        comparison.total_bom_items,
        style(comparison.fully_covered_items).green(),
        style(comparison.partially_covered_items).yellow(),
        style(comparison.uncovered_items).red()
    );

    print_section("COSTS");
    println!("  Budget:       {:>14}", format_money(comparison.project_budget));
    println!("  Target:       {:>14}", format_money(comparison.total_target_cost));
    println!("  Best case:    {:>14}", format_money(comparison.best_case_cost));
    println!("  Recommended:  {:>14}", format_money(comparison.recommended_cost));
    println!("  Worst case:   {:>14}", format_money(comparison.worst_case_cost));
    if comparison.project_budget > 0.0 {
        let savings = format!(
            "{} ({})",
            format_money(comparison.savings_vs_budget),
            format_percent(comparison.savings_percent)
        );
        let savings = if comparison.savings_vs_budget < 0.0 {
            style(savings).red()
        } else {
            style(savings).green()
        };
        println!("  Vs budget:    {:>14}", savings);
    }

    let fresh = &comparison.quote_freshness;
    print_section("QUOTES");
    println!(
        "  {} total, {} fresh, {} stale, {} expired, average age {} days",
        fresh.total, fresh.fresh, fresh.stale, fresh.expired, fresh.average_age_days
    );

    print_section("BOM ITEMS");
    items.print(session.format);

    let assessment = &comparison.risk_assessment;
    print_section("RISK");
    println!("  Overall: {}", risk_style(assessment.overall_risk));
    for factor in &assessment.risk_factors {
        println!(
            "  {} [{}] {} - {}",
            style("•").dim(),
            risk_style(factor.severity),
            factor.description,
            factor.impact
        );
    }
    for action in &assessment.mitigation_actions {
        println!("  {} {}", style("→").cyan(), action);
    }

    Ok(())
}

fn item_table(comparison: &ProjectComparison) -> ReportTable {
    let mut table = ReportTable::new([
        "ID", "SPECIFICATION", "NEEDED", "PLANNED", "COVERAGE", "QUOTES", "BEST", "RECOMMENDED",
        "RISK",
    ]);
    for analysis in &comparison.bom_item_analyses {
        table.push([
            analysis.bom_item_id.to_string(),
            truncate_str(&analysis.specification.name, 28),
            analysis.total_quantity_needed.to_string(),
            analysis.total_quantity_planned.to_string(),
            format_percent(analysis.coverage_percent),
            analysis.quote_count().to_string(),
            analysis
                .best_quote
                .as_ref()
                .map_or("-".to_string(), |q| format_money(q.converted_price)),
            format_money(analysis.recommended_total_cost),
            analysis.risk_level.to_string(),
        ]);
    }
    table
}
