//! Soul CLI commands
//!
//! Implements CLI commands for managing a user's souls.

use clap::Subcommand;

use super::CliContext;
use crate::display::{format_soul_details, format_soul_list, format_stats};
use crate::error::VaultResult;

/// Soul subcommands
#[derive(Subcommand)]
pub enum SoulCommands {
    /// Create a new soul with a fresh random seed
    Create {
        /// Soul name (unique per user)
        name: String,
    },
    /// List all souls
    List,
    /// Show a soul and its event history
    Show {
        /// Soul name
        name: String,
    },
    /// Show aggregate statistics for a soul
    Stats {
        /// Soul name
        name: String,
    },
}

/// Handle a soul command
pub fn handle_soul_command(ctx: &CliContext, cmd: SoulCommands) -> VaultResult<()> {
    let mut session = ctx.unlock()?;

    match cmd {
        SoulCommands::Create { name } => {
            let soul = session.create_soul(&name)?;

            println!("Created soul: {}", soul.name);
            println!("  Seed: {}…", soul.seed.partial());
        }

        SoulCommands::List => {
            print!("{}", format_soul_list(session.registry()));
        }

        SoulCommands::Show { name } => {
            print!("{}", format_soul_details(session.soul(&name)?));
        }

        SoulCommands::Stats { name } => {
            let stats = session.stats(&name)?;
            print!("{}", format_stats(&name, stats.as_ref()));
        }
    }

    Ok(())
}
