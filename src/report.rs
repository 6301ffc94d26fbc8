//! Final acceptance check and build report.
//!
//! A successful publish is not taken at its word: the expected executable
//! must actually exist afterwards, or the whole run is a failure.

use anyhow::{Context, Result, bail};
use log::debug;

use crate::paths::BuildPaths;

/// Verify the published executable and print the completion report.
pub fn summarize(paths: &BuildPaths) -> Result<()> {
    let exe = paths.executable();
    if !exe.exists() {
        bail!("Executable not found at {} after publish", exe.display());
    }

    let size = std::fs::metadata(&exe)
        .with_context(|| format!("could not read metadata for {}", exe.display()))?
        .len();
    debug!("Artifact size: {} bytes", size);

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                        Build Complete!");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("Executable: {}", exe.display());
    println!("File Size:  {}", format_size(size));
    println!();
    println!("To run: {}", exe.display());
    println!();

    Ok(())
}

/// Format a byte count as mebibytes plus the exact grouped count,
/// e.g. `50.00 MB (52,428,800 bytes)`.
fn format_size(bytes: u64) -> String {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    format!("{:.2} MB ({} bytes)", mb, group_thousands(bytes))
}

/// Insert `,` separators every three digits.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_fifty_megabyte_artifact_report() {
        assert_eq!(format_size(52_428_800), "50.00 MB (52,428,800 bytes)");
    }

    #[test]
    fn test_small_sizes_round_to_two_decimals() {
        assert_eq!(format_size(0), "0.00 MB (0 bytes)");
        assert_eq!(format_size(1_048_576), "1.00 MB (1,048,576 bytes)");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_missing_executable_is_a_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = BuildPaths::resolve(tmp.path());

        let err = summarize(&paths).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_present_executable_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = BuildPaths::resolve(tmp.path());
        fs::create_dir_all(&paths.publish_dir).unwrap();
        fs::write(paths.executable(), b"MZ fake executable").unwrap();

        summarize(&paths).unwrap();
    }
}
