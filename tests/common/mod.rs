#![allow(dead_code)]

use serde_json::json;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn entry_line(log_id: &str, level: &str, message: &str) -> String {
    json!({
        "timestamp": "2024-03-01T10:00:00Z",
        "log_id": log_id,
        "level": level,
        "message": message,
    })
    .to_string()
}

pub fn request_line(log_id: &str, method: &str, path: &str, status: u16) -> String {
    entry_line(
        log_id,
        "INFO",
        &format!(
            "{method} {path} | Status: {status} | Duration: 12.5ms | IP: 10.0.0.1 | User-Agent: curl/8.6.0"
        ),
    )
}

pub fn uniform_lines(log_id: &str, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| entry_line(log_id, "INFO", &format!("message {i}")))
        .collect()
}

/// First `target_count` lines carry `target_id`; the rest get unique ids.
pub fn seeded_lines(target_id: &str, target_count: usize, total: usize) -> Vec<String> {
    (0..total)
        .map(|i| {
            if i < target_count {
                entry_line(target_id, "INFO", &format!("target message {i}"))
            } else {
                entry_line(&format!("other-{i}"), "INFO", &format!("filler message {i}"))
            }
        })
        .collect()
}

pub fn write_log(path: &Path, lines: &[String]) {
    let mut file = File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.sync_data().unwrap();
}

pub fn write_compressed_log(path: &Path, lines: &[String]) {
    let file = File::create(path).unwrap();
    let mut encoder = zstd::Encoder::new(file, 3).unwrap();
    for line in lines {
        writeln!(encoder, "{line}").unwrap();
    }
    let file = encoder.finish().unwrap();
    file.sync_data().unwrap();
}

pub fn append_line(path: &Path, line: &str) {
    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    writeln!(file, "{line}").unwrap();
    file.sync_data().unwrap();
}
