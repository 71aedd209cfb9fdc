//! Utility functions for Augcache CLI

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

/// Create a progress bar with standard styling
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        pb.set_style(bar_style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    let millis = duration.subsec_millis();

    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else if seconds > 0 {
        format!("{}.{:03}s", seconds, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Print formatted output (JSON or human-readable)
pub fn print_output(data: &Value, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        print_human_readable(data, 0);
    }
    Ok(())
}

fn print_human_readable(data: &Value, indent: usize) {
    let prefix = "  ".repeat(indent);

    match data {
        Value::Object(map) => {
            for (key, value) in map {
                match value {
                    Value::Object(_) => {
                        println!("{}{}:", prefix, style(key).bold());
                        print_human_readable(value, indent + 1);
                    }
                    Value::Array(arr) if arr.iter().any(Value::is_object) => {
                        println!("{}{}:", prefix, style(key).bold());
                        for (i, item) in arr.iter().enumerate() {
                            println!("{}  [{}]", prefix, i);
                            print_human_readable(item, indent + 2);
                        }
                    }
                    _ => println!("{}{}: {}", prefix, style(key).bold(), format_value(value)),
                }
            }
        }
        _ => println!("{}{}", prefix, format_value(data)),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        _ => value.to_string(),
    }
}
