//! `buyer scenarios` command - the four strategies side by side

use miette::Result;

use crate::cli::helpers::{format_money, print_header, print_structured, ReportTable, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Id;

#[derive(clap::Args, Debug)]
pub struct ScenariosArgs {
    /// Project id
    pub project: Id,
}

pub fn run(args: ScenariosArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let scenarios = session.service(global).scenarios(args.project)?;

    if print_structured(&scenarios, session.format)? {
        return Ok(());
    }

    let mut table = ReportTable::new(["STRATEGY", "SCENARIO", "VENDORS", "TOTAL", "VS BUDGET", "TRADEOFFS"]);
    for scenario in &scenarios {
        table.push([
            scenario.strategy.to_string(),
            scenario.name.clone(),
            scenario.vendor_count.to_string(),
            format_money(scenario.total_cost),
            format_money(scenario.savings_vs_budget),
            scenario.tradeoffs.clone(),
        ]);
    }

    if session.format == OutputFormat::Auto {
        print_header("Procurement Scenarios");
    }
    table.print(session.format);
    Ok(())
}
