//! Aspirate CLI - Kubernetes manifests and Helm charts from Aspire manifests

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;
mod error;
mod exit_codes;
mod prompt;

use commands::generate::GenerateArgs;
use commands::{ContainerArgs, ManifestArgs};

#[derive(Parser)]
#[command(name = "aspirate")]
#[command(author = "Aspirate Contributors")]
#[command(version)]
#[command(about = "Generate Kubernetes manifests and Helm charts from Aspire manifests", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Never prompt; take the default answer or fail
    #[arg(long, global = true, env = "ASPIRATE_NON_INTERACTIVE")]
    non_interactive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build images and generate kustomize manifests or a Helm chart
    Generate(GenerateArgs),

    /// Build and push images only
    Build {
        #[command(flatten)]
        manifest: ManifestArgs,

        #[command(flatten)]
        container: ContainerArgs,
    },
}

/// Log to stderr, filtered by `ASPIRATE_LOG`
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ASPIRATE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    let result = match &cli.command {
        Commands::Generate(args) => commands::generate::run(args, cli.non_interactive).await,
        Commands::Build {
            manifest,
            container,
        } => commands::build::run(manifest, container, cli.non_interactive).await,
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
