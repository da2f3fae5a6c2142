//! Snapshot command implementation

use anyhow::{Context, Result};
use tidelog_core::{LoggerConfig, SnapshotConfig};
use tokio::io::AsyncWriteExt;

use crate::cli::SnapshotArgs;
use crate::output::{format_bytes, print_success};

/// Command-line flags layered over the configured snapshot defaults
pub fn resolve_options(defaults: SnapshotConfig, args: &SnapshotArgs) -> SnapshotConfig {
    SnapshotConfig {
        max_bytes: args.max_bytes.unwrap_or(defaults.max_bytes),
        gzip: args.gzip || defaults.gzip,
    }
}

pub async fn execute(config: &LoggerConfig, args: SnapshotArgs) -> Result<()> {
    let options = resolve_options(config.snapshot, &args);
    let manager = super::open_manager(config)?;
    let data = manager.snapshot_with(options).await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &data)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!(
                "Wrote {} snapshot to {}",
                format_bytes(data.len() as u64),
                path.display()
            ));
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_options() {
        let defaults = SnapshotConfig {
            max_bytes: 100,
            gzip: false,
        };
        let args = SnapshotArgs {
            max_bytes: None,
            gzip: false,
            output: None,
        };
        assert_eq!(resolve_options(defaults, &args), defaults);

        let args = SnapshotArgs {
            max_bytes: Some(7),
            gzip: true,
            output: None,
        };
        let options = resolve_options(defaults, &args);
        assert_eq!(options.max_bytes, 7);
        assert!(options.gzip);
    }
}
