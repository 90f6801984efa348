use anyhow::{Context, Result};
use std::path::Path;

use crate::scenario::Scenario;

/// Write the template scenario to `output`.
pub fn init_scenario(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }
    let json = serde_json::to_string_pretty(&Scenario::template())
        .context("Failed to serialize template scenario")?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Scenario written to {}", output.display());
    println!("\n💡 Run it with 'metabreed run -c {}'", output.display());
    Ok(())
}
