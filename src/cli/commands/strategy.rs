//! `buyer strategy` command - the project's stored procurement strategy

use console::style;
use miette::Result;

use crate::cli::helpers::{print_structured, Session};
use crate::cli::GlobalOpts;
use crate::core::{Id, Strategy};

#[derive(clap::Subcommand, Debug)]
pub enum StrategyCommands {
    /// Show the stored strategy (creates the default on first use)
    Show {
        /// Project id
        project: Id,
    },

    /// Replace the stored strategy
    Set {
        /// Project id
        project: Id,

        #[arg(value_enum)]
        strategy: Strategy,
    },
}

pub fn run(cmd: StrategyCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let stored = match cmd {
        StrategyCommands::Show { project } => session.service(global).strategy(project)?,
        StrategyCommands::Set { project, strategy } => {
            session.store.set_strategy(project, strategy)?
        }
    };

    if print_structured(&stored, session.format)? {
        return Ok(());
    }

    println!(
        "Project {}: {}",
        stored.project_id,
        style(stored.strategy).cyan().bold()
    );
    Ok(())
}
