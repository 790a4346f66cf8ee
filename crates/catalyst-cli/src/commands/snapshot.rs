//! `catalyst snapshot`: capture the allowlisted tables from Postgres into a
//! snapshot file usable as the `file` schema source.

use anyhow::{Context, Result};
use catalyst_core::CatalystConfig;
use std::fs;
use std::path::Path;

pub async fn run(config: &CatalystConfig, output: &Path) -> Result<()> {
    let schema = super::introspect_configured(config).await?;
    let yaml = schema.to_yaml()?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(output, yaml).with_context(|| format!("Failed to write snapshot to {:?}", output))?;

    println!(
        "Wrote {} table(s) from schema {} to {}",
        schema.tables.len(),
        config.guardrails.schema_name,
        output.display()
    );
    Ok(())
}
