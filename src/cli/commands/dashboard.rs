//! `buyer dashboard` command - project procurement dashboard

use console::style;
use miette::Result;

use crate::cli::helpers::{
    format_money, format_percent, label, print_header, print_section, print_structured,
    risk_style, truncate_str, ReportTable, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Id;
use crate::procurement::dashboard::{ActivityImpact, BudgetHealth, TimelineStatus};
use crate::procurement::ProjectDashboard;

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Project id
    pub project: Id,
}

pub fn run(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let dashboard = session.service(global).dashboard(args.project)?;

    if print_structured(&dashboard, session.format)? {
        return Ok(());
    }

    let vendors = vendor_table(&dashboard);
    if session.format != OutputFormat::Auto {
        vendors.print(session.format);
        return Ok(());
    }

    print_header(&format!("Dashboard: {}", dashboard.project_name));

    let progress = &dashboard.progress;
    let timeline = label(&progress.timeline_status);
    let timeline = match progress.timeline_status {
        TimelineStatus::OnTrack => style(timeline).green().bold(),
        TimelineStatus::AtRisk => style(timeline).yellow().bold(),
        TimelineStatus::Delayed => style(timeline).red().bold(),
    };
    print_section("PROGRESS");
    println!(
        "  BOM coverage {}   requisitions {}/{}   orders {} placed, {} received",
        format_percent(progress.bom_coverage),
        progress.requisitions_complete,
        progress.requisitions_total,
        progress.orders_placed,
        progress.orders_received
    );
    match progress.days_to_deadline {
        Some(days) => println!("  Timeline {} ({} days to deadline)", timeline, days),
        None => println!("  Timeline {} (no deadline)", timeline),
    }

    let financial = &dashboard.financial;
    let health = label(&financial.budget_health);
    let health = match financial.budget_health {
        BudgetHealth::Healthy => style(health).green().bold(),
        BudgetHealth::Warning => style(health).yellow().bold(),
        BudgetHealth::Critical => style(health).red().bold(),
    };
    print_section("FINANCIAL");
    println!("  Budget:     {:>14}", format_money(financial.budget));
    println!("  Committed:  {:>14}", format_money(financial.committed));
    println!("  Estimated:  {:>14}", format_money(financial.estimated));
    println!("  Remaining:  {:>14}", format_money(financial.remaining));
    println!(
        "  Utilization {}   savings {} ({})   health {}",
        format_percent(financial.utilization_percent),
        format_money(financial.savings),
        format_percent(financial.savings_percent),
        health
    );

    let procurement = &dashboard.procurement;
    print_section("PROCUREMENT");
    println!(
        "  {} items: {} quoted, {} ordered, {} received",
        procurement.total_items,
        procurement.items_with_quotes,
        procurement.items_ordered,
        procurement.items_received
    );
    println!(
        "  {} vendors engaged, average lead time {} days, quotes {}",
        procurement.vendors_engaged,
        procurement.average_lead_time_days,
        label(&procurement.quote_freshness)
    );

    if !vendors.is_empty() {
        print_section("VENDORS");
        vendors.print(session.format);
    }

    print_section("RISKS");
    for risk in &dashboard.risks {
        println!(
            "  {:<14} {}  {}",
            risk.category.to_string(),
            risk_style(risk.level),
            risk.top_issue
        );
    }

    if !dashboard.recent_activity.is_empty() {
        print_section("RECENT ACTIVITY");
        for item in &dashboard.recent_activity {
            let marker = match item.impact {
                ActivityImpact::Positive => style("+").green(),
                ActivityImpact::Neutral => style("·").dim(),
                ActivityImpact::Negative => style("-").red(),
            };
            println!(
                "  {} {}  {}",
                marker,
                item.timestamp.format("%Y-%m-%d"),
                truncate_str(&item.description, 60)
            );
        }
    }
    Ok(())
}

fn vendor_table(dashboard: &ProjectDashboard) -> ReportTable {
    let mut table = ReportTable::new(["VENDOR", "ITEMS", "VALUE", "RATING", "ON TIME", "STATUS"]);
    for vendor in &dashboard.vendor_performance {
        table.push([
            vendor.vendor_name.clone(),
            vendor.items_supplied.to_string(),
            format_money(vendor.total_value),
            vendor
                .average_rating
                .map_or("-".to_string(), |r| format!("{:.1}", r)),
            vendor.on_time_delivery.map_or("-".to_string(), format_percent),
            label(&vendor.status),
        ]);
    }
    table
}
