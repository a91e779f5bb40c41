//! `buyer risks` command - weighted multi-category risk assessment

use console::style;
use miette::Result;

use crate::cli::helpers::{
    format_money, format_percent, label, print_header, print_section, print_structured,
    risk_style, ReportTable, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Id;

#[derive(clap::Args, Debug)]
pub struct RisksArgs {
    /// Project id
    pub project: Id,
}

pub fn run(args: RisksArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let assessment = session.service(global).enhanced_risks(args.project)?;

    if print_structured(&assessment, session.format)? {
        return Ok(());
    }

    let mut categories = ReportTable::new(["CATEGORY", "LEVEL", "SCORE", "AFFECTED", "IMPACT"]);
    for (category, risk) in &assessment.category_risks {
        categories.push([
            category.to_string(),
            risk.level.to_string(),
            format!("{:.0}", risk.score),
            risk.affected_items.to_string(),
            risk.estimated_impact.clone(),
        ]);
    }

    if session.format != OutputFormat::Auto {
        categories.print(session.format);
        return Ok(());
    }

    print_header("Risk Assessment");
    println!(
        "Overall: {}   Score: {:.1}/100",
        risk_style(assessment.overall_risk),
        assessment.risk_score
    );

    print_section("CATEGORIES");
    categories.print(session.format);

    let timeline = &assessment.timeline_risk;
    let budget = &assessment.budget_risk;
    let supply = &assessment.supply_chain_risk;
    let quality = &assessment.quality_risk;
    print_section("DETAIL");
    println!(
        "  Timeline:     {} expiring soon, {} expired, average age {} days",
        timeline.quotes_expiring_soon, timeline.quotes_expired, timeline.average_quote_age_days
    );
    println!(
        "  Budget:       overrun {} ({}), {} items over target, contingency {}",
        format_money(budget.projected_overrun),
        format_percent(budget.overrun_percent),
        budget.items_over_budget,
        format_money(budget.contingency_needed)
    );
    println!(
        "  Supply chain: {} single-source, {} without quotes{}",
        supply.single_source_items,
        supply.no_quote_items,
        if supply.low_vendor_diversity { ", low vendor diversity" } else { "" }
    );
    println!(
        "  Quality:      {} low-rated, {} unrated vendors",
        quality.low_rated_vendors, quality.unrated_vendors
    );

    for (category, risk) in &assessment.category_risks {
        for issue in &risk.issues {
            println!("  {} [{}] {}", style("•").dim(), category, issue);
        }
    }

    if !assessment.mitigation_actions.is_empty() {
        print_section("MITIGATION");
        let mut actions = ReportTable::new(["PRIORITY", "CATEGORY", "ACTION", "EFFORT", "WHEN"]);
        for action in &assessment.mitigation_actions {
            actions.push([
                action.priority.to_string(),
                action.category.to_string(),
                action.action.clone(),
                label(&action.effort),
                label(&action.timeline),
            ]);
        }
        actions.print(session.format);
    }
    Ok(())
}
