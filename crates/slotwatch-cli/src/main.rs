use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "slotwatch", version, about = "Watch CoWIN for open vaccination slots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single poll cycle
    ///
    /// Do not run `check` while another `check` or `watch` polls the same
    /// pincode: both may notify a session before either records it as seen.
    Check(commands::poll::CheckArgs),
    /// Poll repeatedly until interrupted
    ///
    /// Run at most one `watch` per pincode, and do not schedule `check` for
    /// that pincode alongside it: concurrent cycles may notify a session
    /// twice.
    Watch(commands::poll::WatchArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Inspect or reset the record of notified sessions
    Seen {
        #[command(subcommand)]
        action: commands::seen::SeenAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("slotwatch=info,slotwatch_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check(args) => commands::poll::check(args).await,
        Commands::Watch(args) => commands::poll::watch(args).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Seen { action } => commands::seen::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
