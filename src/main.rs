use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use buyer::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => buyer::cli::commands::init::run(args, &global),
        Commands::Seed(args) => buyer::cli::commands::seed::run(args, &global),
        Commands::Analyze(args) => buyer::cli::commands::analyze::run(args, &global),
        Commands::Item(args) => buyer::cli::commands::item::run(args, &global),
        Commands::Recommend(args) => buyer::cli::commands::recommend::run(args, &global),
        Commands::Scenarios(args) => buyer::cli::commands::scenarios::run(args, &global),
        Commands::Savings(args) => buyer::cli::commands::savings::run(args, &global),
        Commands::Risks(args) => buyer::cli::commands::risks::run(args, &global),
        Commands::Dashboard(args) => buyer::cli::commands::dashboard::run(args, &global),
        Commands::Strategy(cmd) => buyer::cli::commands::strategy::run(cmd, &global),
        Commands::Completions(args) => buyer::cli::commands::completions::run(args),
    }
}

/// Log to stderr so stdout stays pipeable; RUST_LOG wins over the flags
fn init_tracing(global: &GlobalOpts) {
    let level = if global.verbose {
        "debug"
    } else if global.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
