//! `buyer seed` command - load a YAML dataset into the database

use chrono::Utc;
use console::style;
use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{print_structured, ReportTable, Session};
use crate::cli::GlobalOpts;
use crate::core::{Dataset, Id};
use crate::core::store::DatasetSummary;

#[derive(clap::Args, Debug)]
pub struct SeedArgs {
    /// Dataset file (vendors, specifications, products, quotes, projects, orders)
    pub file: PathBuf,
}

#[derive(Serialize)]
struct SeedReport {
    loaded: DatasetSummary,
    projects: Vec<ProjectRef>,
}

#[derive(Serialize)]
struct ProjectRef {
    id: Id,
    name: String,
}

pub fn run(args: SeedArgs, global: &GlobalOpts) -> Result<()> {
    let dataset = Dataset::from_file(&args.file)?;
    let mut session = Session::open(global)?;
    let loaded = session.store.load_dataset(&dataset, global.as_of.unwrap_or_else(Utc::now))?;
    let projects = session
        .store
        .list_projects()?
        .into_iter()
        .map(|(id, name)| ProjectRef { id, name })
        .collect();
    let report = SeedReport { loaded, projects };

    if print_structured(&report, session.format)? {
        return Ok(());
    }

    if !global.quiet {
        let s = &report.loaded;
        println!(
            "{} Loaded {} vendors, {} specifications, {} products, {} quotes, {} projects, {} orders, {} ratings from {}",
            style("✓").green(),
            s.vendors,
            s.specifications,
            s.products,
            s.quotes,
            s.projects,
            s.purchase_orders,
            s.ratings,
            style(args.file.display()).cyan()
        );
        println!();
    }

    let mut table = ReportTable::new(["ID", "PROJECT"]);
    for project in &report.projects {
        table.push([project.id.to_string(), project.name.clone()]);
    }
    table.print(session.format);
    Ok(())
}
