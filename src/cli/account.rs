//! Account CLI commands
//!
//! Registration of new users.

use tracing::debug;

use super::{prompt_password, CliContext};
use crate::crypto::SecureString;
use crate::error::VaultResult;
use crate::models::validate_password;
use crate::storage::CredentialStore;

/// Handle `register <username>`
pub fn handle_register(ctx: &CliContext, username: &str) -> VaultResult<()> {
    let password = if ctx.has_password() {
        ctx.password("Password: ")?
    } else {
        prompt_new_password()?
    };

    ctx.paths.ensure_directories()?;
    let mut store = CredentialStore::open(ctx.paths.credentials_file(), ctx.settings.kdf)?;
    debug!(kdf = ctx.settings.kdf.algorithm_name(), "registering with kdf");
    store.register(username, &password)?;

    println!("Registered user: {}", username);
    Ok(())
}

/// Prompt for a new password with confirmation
fn prompt_new_password() -> VaultResult<SecureString> {
    loop {
        let first = prompt_password("Choose a password: ")?;

        if let Err(e) = validate_password(&first) {
            println!("{}. Please try again.", e);
            continue;
        }

        let second = prompt_password("Confirm password: ")?;

        if !first.same_as(&second) {
            println!("Passwords do not match. Please try again.");
            continue;
        }

        return Ok(first);
    }
}
