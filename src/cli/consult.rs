//! Consult CLI command

use super::CliContext;
use crate::display::format_reading;
use crate::enhancer::Enhancer;
use crate::error::VaultResult;
use crate::services::consult;

/// Handle `consult <soul> <question>`
pub async fn handle_consult(
    ctx: &CliContext,
    soul: &str,
    question: &str,
    enhancer: Option<&Enhancer>,
    enhancer_available: bool,
) -> VaultResult<()> {
    let mut session = ctx.unlock()?;
    let event = consult(&mut session, soul, question, enhancer, enhancer_available).await?;

    print!("{}", format_reading(soul, &event));
    Ok(())
}
