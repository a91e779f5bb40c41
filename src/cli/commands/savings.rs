//! `buyer savings` command - savings against requisition targets

use console::style;
use miette::Result;

use crate::cli::helpers::{
    format_money, format_percent, print_header, print_section, print_structured, truncate_str,
    ReportTable, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Id;

#[derive(clap::Args, Debug)]
pub struct SavingsArgs {
    /// Project id
    pub project: Id,
}

pub fn run(args: SavingsArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let summary = session.service(global).savings(args.project)?;

    if print_structured(&summary, session.format)? {
        return Ok(());
    }

    let mut lines = ReportTable::new([
        "BOM ITEM", "SPECIFICATION", "QTY", "TARGET", "RECOMMENDED", "BEST", "PER UNIT", "TOTAL",
        "%",
    ]);
    for line in &summary.line_items {
        let priced = line.is_priced();
        let dash = || "-".to_string();
        lines.push([
            line.bom_item_id.to_string(),
            truncate_str(&line.specification_name, 28),
            line.quantity.to_string(),
            if line.target_price > 0.0 { format_money(line.target_price) } else { dash() },
            if line.recommended_price > 0.0 { format_money(line.recommended_price) } else { dash() },
            if line.best_price > 0.0 { format_money(line.best_price) } else { dash() },
            if priced { format_money(line.savings_per_unit) } else { dash() },
            if priced { format_money(line.total_savings) } else { dash() },
            if priced { format_percent(line.savings_percent) } else { dash() },
        ]);
    }

    if session.format != OutputFormat::Auto {
        lines.print(session.format);
        return Ok(());
    }

    print_header("Savings vs Target");
    let total = format!(
        "{} ({})",
        format_money(summary.total_savings),
        format_percent(summary.savings_percent)
    );
    let total = if summary.total_savings < 0.0 {
        style(total).red().bold()
    } else {
        style(total).green().bold()
    };
    println!("Total savings:          {}", total);
    println!("Target cost:            {}", format_money(summary.total_target_cost));
    println!("Recommended cost:       {}", format_money(summary.total_recommended_cost));
    println!("Consolidation savings:  {}", format_money(summary.consolidation_savings));

    print_section("LINE ITEMS");
    lines.print(session.format);

    if !summary.savings_by_vendor.is_empty() {
        print_section("BY VENDOR");
        let mut table = ReportTable::new(["VENDOR", "SAVINGS"]);
        for (vendor, savings) in &summary.savings_by_vendor {
            table.push([vendor.clone(), format_money(*savings)]);
        }
        table.print(session.format);
    }
    Ok(())
}
