mod common;

use common::{entry_line, write_log};
use logsift::{scan_file, LogEntry, ScanOptions};
use proptest::prelude::*;
use tempfile::tempdir;

fn arb_log_id() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("alpha".to_string()),
        Just("beta".to_string()),
        Just("gamma".to_string()),
        Just("delta".to_string()),
    ]
}

fn arb_level() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("INFO".to_string()),
        Just("WARN".to_string()),
        Just("ERROR".to_string()),
        Just("DEBUG".to_string()),
    ]
}

fn arb_lines() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        (arb_log_id(), arb_level(), 0..1000u32)
            .prop_map(|(id, level, n)| entry_line(&id, &level, &format!("message {n}"))),
        0..100,
    )
}

// Every well-formed line comes back, whatever the chunk size.
proptest! {
    #[test]
    fn prop_scan_is_complete(lines in arb_lines(), chunk_size in 1..300usize) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app-2024-03-01.log");
        write_log(&path, &lines);

        let opts = ScanOptions::default().with_chunk_size(chunk_size);
        let result = scan_file(&path, None, &opts).unwrap();

        prop_assert_eq!(result.entries.len(), lines.len());
        prop_assert!(result.warnings.is_empty());
        prop_assert!(!result.terminated_early);
    }
}

// Filtering returns exactly the matching subset, in order.
proptest! {
    #[test]
    fn prop_filter_matches_manual_selection(lines in arb_lines(), chunk_size in 1..300usize) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app-2024-03-01.log");
        write_log(&path, &lines);

        let filter = |entry: &LogEntry| entry.log_id == "alpha";
        let opts = ScanOptions::default().with_chunk_size(chunk_size);
        let result = scan_file(&path, Some(&filter), &opts).unwrap();

        let all = scan_file(&path, None, &opts).unwrap();
        let manual: Vec<&LogEntry> =
            all.entries.iter().filter(|e| e.log_id == "alpha").collect();

        prop_assert_eq!(result.entries.len(), manual.len());
        for (got, want) in result.entries.iter().zip(manual) {
            prop_assert_eq!(got, want);
        }
    }
}

// Early termination caps the result at exactly max_results.
proptest! {
    #[test]
    fn prop_early_termination_is_exact(
        lines in arb_lines(),
        chunk_size in 1..300usize,
        max_results in 1..50usize,
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app-2024-03-01.log");
        write_log(&path, &lines);

        let filter = |entry: &LogEntry| entry.log_id == "beta";
        let matches = lines.iter().filter(|l| l.contains("\"beta\"")).count();

        let opts = ScanOptions::default()
            .with_chunk_size(chunk_size)
            .with_max_results(max_results)
            .with_early_termination(true);
        let result = scan_file(&path, Some(&filter), &opts).unwrap();

        prop_assert_eq!(result.entries.len(), matches.min(max_results));
        if result.terminated_early {
            prop_assert_eq!(result.entries.len(), max_results);
        }
        for entry in &result.entries {
            prop_assert_eq!(&entry.log_id, "beta");
        }
    }
}

// Without early termination, max_results never truncates anything.
proptest! {
    #[test]
    fn prop_disabled_early_termination_returns_all(
        lines in arb_lines(),
        max_results in 0..50usize,
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app-2024-03-01.log");
        write_log(&path, &lines);

        let filter = |entry: &LogEntry| entry.log_id == "gamma";
        let matches = lines.iter().filter(|l| l.contains("\"gamma\"")).count();

        let opts = ScanOptions::default()
            .with_max_results(max_results)
            .with_early_termination(false);
        let result = scan_file(&path, Some(&filter), &opts).unwrap();

        prop_assert_eq!(result.entries.len(), matches);
        prop_assert!(!result.terminated_early);
    }
}

// Rescanning an unmodified file yields identical results.
proptest! {
    #[test]
    fn prop_rescan_is_idempotent(lines in arb_lines(), chunk_size in 1..300usize) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app-2024-03-01.log");
        write_log(&path, &lines);

        let opts = ScanOptions::default().with_chunk_size(chunk_size);
        let first = scan_file(&path, None, &opts).unwrap();
        let second = scan_file(&path, None, &opts).unwrap();

        prop_assert_eq!(first.entries, second.entries);
        prop_assert_eq!(first.warnings, second.warnings);
    }
}
