//! Table and JSON output formatting

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};
use tidelog_core::LogFileDescriptor;

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if JSON output mode is enabled
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

#[derive(Tabled)]
pub struct FileRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "name")]
    pub name: String,
    #[tabled(rename = "size")]
    pub size: String,
    #[tabled(rename = "modified")]
    pub modified: String,
}

/// JSON-friendly file representation
#[derive(Serialize)]
pub struct FileJson {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

impl From<&LogFileDescriptor> for FileJson {
    fn from(file: &LogFileDescriptor) -> Self {
        FileJson {
            name: file.name().to_string(),
            path: file.path().display().to_string(),
            size: file.size(),
            modified_at: file.modified_at(),
        }
    }
}

impl FileRow {
    fn new(index: usize, file: &LogFileDescriptor) -> Self {
        FileRow {
            index,
            name: file.name().to_string(),
            size: format_bytes(file.size()),
            modified: file.modified_at().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Print files in the order given
pub fn print_files_table(files: &[LogFileDescriptor]) {
    if is_json_mode() {
        let json_files: Vec<FileJson> = files.iter().map(FileJson::from).collect();
        match serde_json::to_string_pretty(&json_files) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing to JSON: {}", e),
        }
        return;
    }

    if files.is_empty() {
        println!("No log files");
        return;
    }

    let rows: Vec<FileRow> = files
        .iter()
        .enumerate()
        .map(|(idx, file)| FileRow::new(idx, file))
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .with(Modify::new(Columns::single(2)).with(Alignment::right()))
        .to_string();

    println!("{}", table);
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else if bytes > 0 {
        format!("{}B", bytes)
    } else {
        "0B".to_string()
    }
}

/// Status messages go to stderr so they never mix with records on stdout
pub fn print_success(message: &str) {
    if is_json_mode() {
        return;
    }
    eprintln!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// JSON summary of a finished command
#[derive(Serialize)]
pub struct SummaryJson<T: Serialize> {
    pub success: bool,
    pub data: T,
}

pub fn print_summary<T: Serialize>(message: &str, data: T) {
    if is_json_mode() {
        let summary = SummaryJson {
            success: true,
            data,
        };
        if let Ok(json) = serde_json::to_string_pretty(&summary) {
            println!("{}", json);
        }
    } else {
        print_success(message);
    }
}
