//! Append command implementation

use anyhow::Result;
use serde::Serialize;
use tidelog_core::LoggerConfig;

use crate::output::print_summary;

#[derive(Serialize)]
struct Appended {
    records: usize,
    dir: String,
}

pub async fn execute(config: &LoggerConfig, messages: Vec<String>) -> Result<()> {
    let manager = super::open_manager(config)?;
    let records = messages.len();

    for message in messages {
        manager.append(message);
    }
    manager.shutdown().await?;

    print_summary(
        &format!("Appended {} record(s) to {}", records, config.base_dir.display()),
        Appended {
            records,
            dir: config.base_dir.display().to_string(),
        },
    );
    Ok(())
}
