use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use soulvault::cli::{
    handle_consult, handle_export, handle_register, handle_soul_command, CliContext, SoulCommands,
};
use soulvault::config::{Settings, VaultPaths};
use soulvault::enhancer::Enhancer;

#[derive(Parser)]
#[command(
    name = "soulvault",
    author = "Kaylee Beyene",
    version,
    about = "Password-protected oracle journal",
    long_about = "SoulVault keeps a private, encrypted journal of questions put to \
                  named souls. Each answer is a deterministic reading derived from \
                  the question, the soul's secret seed and the consultation count."
)]
struct Cli {
    /// User to log in as
    #[arg(short, long, global = true, env = "SOULVAULT_USER")]
    user: Option<String>,

    /// Password (prompted for when absent)
    #[arg(long, global = true, env = "SOULVAULT_PASSWORD", hide = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    Register {
        /// Username (3-20 characters: letters, digits, '_' or '-')
        username: String,
    },

    /// Soul management commands
    #[command(subcommand)]
    Soul(SoulCommands),

    /// Ask a soul a question
    Consult {
        /// Soul name
        soul: String,
        /// The question
        question: String,
    },

    /// Export the lineage of all souls as CSV
    Export {
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show current configuration and paths
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SOULVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = VaultPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Probe the enhancer once; the result is passed down explicitly
    let enhancer = Enhancer::from_settings(&settings.enhancer);
    let enhancer_available = enhancer.as_ref().is_some_and(Enhancer::probe);

    let ctx = CliContext::new(paths, settings, cli.user, cli.password);

    match cli.command {
        Some(Commands::Register { username }) => {
            handle_register(&ctx, &username)?;
        }
        Some(Commands::Soul(cmd)) => {
            handle_soul_command(&ctx, cmd)?;
        }
        Some(Commands::Consult { soul, question }) => {
            handle_consult(
                &ctx,
                &soul,
                &question,
                enhancer.as_ref(),
                enhancer_available,
            )
            .await?;
        }
        Some(Commands::Export { output }) => {
            handle_export(&ctx, output)?;
        }
        Some(Commands::Config) => {
            println!("SoulVault Configuration");
            println!("=======================");
            println!("Base directory:   {}", ctx.paths.base_dir().display());
            println!("Credential store: {}", ctx.paths.credentials_file().display());
            println!("Record stores:    {}", ctx.paths.souls_dir().display());
            println!("Export directory: {}", ctx.paths.export_dir().display());
            println!();
            println!("Settings:");
            println!("  KDF:              {}", ctx.settings.kdf.algorithm_name());
            println!(
                "  Enhancer:         {}",
                match (&ctx.settings.enhancer.command, enhancer_available) {
                    (Some(command), true) => format!("{} (available)", command.display()),
                    (Some(command), false) => format!("{} (unavailable)", command.display()),
                    (None, _) => "none".to_string(),
                }
            );
        }
        None => {
            println!("SoulVault - password-protected oracle journal");
            println!();
            println!("Run 'soulvault --help' for usage information.");
            println!("Run 'soulvault register <username>' to get started.");
        }
    }

    Ok(())
}
