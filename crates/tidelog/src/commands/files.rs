//! Files command implementation

use anyhow::{Context, Result};
use tidelog_core::LoggerConfig;
use tidelog_logs::{policy, DirectoryScanner};

use crate::output::print_files_table;

pub fn execute(config: &LoggerConfig) -> Result<()> {
    let scanner = DirectoryScanner::new(config.base_dir.clone());
    let mut files = scanner
        .scan()
        .with_context(|| format!("Failed to list {}", config.base_dir.display()))?;
    policy::from_config(&config.policy).sort(&mut files);

    print_files_table(&files);
    Ok(())
}
