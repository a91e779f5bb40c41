//! `buyer recommend` command - vendor assignment under a strategy

use console::style;
use miette::Result;

use crate::cli::helpers::{format_money, print_header, print_structured, ReportTable, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Id, Strategy};

#[derive(clap::Args, Debug)]
pub struct RecommendArgs {
    /// Project id
    pub project: Id,

    /// Strategy to apply (default: the project's stored strategy)
    #[arg(long, short = 's', value_enum)]
    pub strategy: Option<Strategy>,
}

pub fn run(args: RecommendArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let service = session.service(global);
    let strategy = match args.strategy {
        Some(strategy) => strategy,
        None => service.strategy(args.project)?.strategy,
    };
    let plan = service.recommendations(args.project, strategy)?;

    if print_structured(&plan, session.format)? {
        return Ok(());
    }

    let mut table = ReportTable::new(["PRIORITY", "VENDOR", "ITEMS", "BOM ITEMS", "COST", "RATIONALE"]);
    for rec in &plan.recommendations {
        let items: Vec<String> = rec.bom_items.iter().map(|id| id.to_string()).collect();
        table.push([
            rec.priority.to_string(),
            rec.vendor_name.clone(),
            rec.item_count.to_string(),
            items.join(","),
            format_money(rec.total_cost),
            rec.rationale.clone(),
        ]);
    }

    if session.format != OutputFormat::Auto {
        table.print(session.format);
        return Ok(());
    }

    print_header(&format!("Recommendations: {}", strategy));
    if table.is_empty() {
        println!("No vendor can supply any BOM item");
    } else {
        table.print(session.format);
    }
    println!(
        "Total: {} across {} vendor(s)",
        style(format_money(plan.total_cost)).bold(),
        plan.vendor_count
    );
    if !plan.unassigned_bom_items.is_empty() {
        let ids: Vec<String> = plan
            .unassigned_bom_items
            .iter()
            .map(|id| id.to_string())
            .collect();
        println!(
            "{} Unassigned BOM items: {}",
            style("!").yellow(),
            ids.join(", ")
        );
    }
    Ok(())
}
