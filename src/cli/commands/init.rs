//! `buyer init` command - create the procurement database

use console::style;
use miette::Result;

use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct InitArgs {}

pub fn run(_args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let version = session.store.schema_version()?;

    if !global.quiet {
        println!(
            "{} Initialized procurement database at {} (schema v{})",
            style("✓").green(),
            style(session.path.display()).cyan(),
            version
        );
        println!();
        println!("Next steps:");
        println!(
            "  {} Load vendors, quotes and projects",
            style("buyer seed <file.yaml>").yellow()
        );
        println!(
            "  {} Analyze a project",
            style("buyer analyze <project-id>").yellow()
        );
    }
    Ok(())
}
