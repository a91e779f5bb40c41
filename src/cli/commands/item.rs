//! `buyer item` command - coverage and quotes for one BOM item

use miette::Result;

use crate::cli::helpers::{
    format_money, format_percent, print_header, print_section, print_structured, risk_style,
    ReportTable, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Id;
use crate::procurement::BomItemAnalysis;

#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// BOM item id
    pub bom_item: Id,
}

pub fn run(args: ItemArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let analysis = session.service(global).analyze_bom_item(args.bom_item)?;

    if print_structured(&analysis, session.format)? {
        return Ok(());
    }

    let quotes = quote_table(&analysis);
    if session.format != OutputFormat::Auto {
        quotes.print(session.format);
        return Ok(());
    }

    print_header(&format!(
        "BOM Item {}: {}",
        analysis.bom_item_id, analysis.specification.name
    ));
    println!(
        "Needed: {}   Planned: {}   Coverage: {}   Risk: {}",
        analysis.total_quantity_needed,
        analysis.total_quantity_planned,
        format_percent(analysis.coverage_percent),
        risk_style(analysis.risk_level)
    );
    if analysis.over_planned_quantity > 0 {
        println!("Over-planned by {}", analysis.over_planned_quantity);
    }
    println!(
        "Best total: {}   Recommended total: {}   Target: {}",
        format_money(analysis.best_total_cost),
        format_money(analysis.recommended_total_cost),
        format_money(analysis.target_total_cost)
    );

    print_section("QUOTES");
    if quotes.is_empty() {
        println!("  No available quotes");
    } else {
        quotes.print(session.format);
    }

    if !analysis.requisition_items.is_empty() {
        print_section("REQUISITIONS");
        let mut table = ReportTable::new(["REQUISITION", "QTY", "TARGET", "STATUS"]);
        for demand in &analysis.requisition_items {
            table.push([
                demand.requisition_name.clone(),
                demand.quantity.to_string(),
                demand
                    .target_unit_price
                    .map_or("-".to_string(), format_money),
                demand.status.to_string(),
            ]);
        }
        table.print(session.format);
    }

    Ok(())
}

fn quote_table(analysis: &BomItemAnalysis) -> ReportTable {
    let mut table = ReportTable::new([
        "QUOTE", "VENDOR", "PRICE", "CURRENCY", "USD", "QUOTED", "VALID UNTIL",
    ]);
    for quote in &analysis.available_quotes {
        table.push([
            quote.id.to_string(),
            quote.vendor_name.clone(),
            format!("{:.2}", quote.price),
            quote.currency.clone(),
            format_money(quote.converted_price),
            quote.quote_date.format("%Y-%m-%d").to_string(),
            quote
                .valid_until
                .map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string()),
        ]);
    }
    table
}
