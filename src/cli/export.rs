//! Export CLI command

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::Local;

use super::CliContext;
use crate::error::{VaultError, VaultResult};
use crate::export::export_lineage_csv;

/// Handle `export [--output PATH]`
///
/// Without `--output` the file goes to `<base>/exports/<user>-lineage-<date>.csv`.
pub fn handle_export(ctx: &CliContext, output: Option<PathBuf>) -> VaultResult<()> {
    let session = ctx.unlock()?;

    let path = match output {
        Some(path) => path,
        None => ctx.paths.export_dir().join(format!(
            "{}-lineage-{}.csv",
            session.username(),
            Local::now().format("%Y%m%d")
        )),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            VaultError::Export(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let file = File::create(&path)
        .map_err(|e| VaultError::Export(format!("Failed to create {}: {}", path.display(), e)))?;
    export_lineage_csv(session.registry(), BufWriter::new(file))?;

    println!(
        "Exported {} soul(s) to {}",
        session.registry().len(),
        path.display()
    );
    Ok(())
}
