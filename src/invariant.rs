use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use log::{error, info};

/// Set of invariant descriptions that have been successfully asserted.
fn checked_invariants() -> &'static Mutex<HashSet<String>> {
    static CHECKED: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    CHECKED.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Asserts that a critical invariant holds.
///
/// A failed condition panics in debug/test builds and logs a critical error
/// in release builds. A passing condition is recorded, so Contract Tests can
/// later verify the invariant was actually exercised.
///
/// # Arguments
/// * `condition` - The boolean result of the check.
/// * `description` - Human-readable invariant (e.g., "publish output is always self-contained").
/// * `component` - Optional component tag (e.g., "Pipeline").
pub fn assert_invariant(condition: bool, description: &str, component: Option<&str>) {
    if !condition {
        let msg = format!(
            "INVARIANT VIOLATION [{}]: {}",
            component.unwrap_or("General"),
            description
        );
        error!("{}", msg);

        // Fail closed while developing and testing; survive in production.
        if cfg!(debug_assertions) || cfg!(test) {
            panic!("{}", msg);
        }
    } else if let Ok(mut set) = checked_invariants().lock() {
        set.insert(description.to_string());
    }
}

/// A Contract Test: verifies that the listed invariants were asserted at
/// some point during the test's execution.
#[allow(dead_code)]
pub fn contract_test(context: &str, required_invariants: &[&str]) {
    let checked = checked_invariants().lock().unwrap();
    let missing: Vec<&str> = required_invariants
        .iter()
        .copied()
        .filter(|req| !checked.contains(*req))
        .collect();

    if !missing.is_empty() {
        panic!(
            "Contract Test Failed for '{}'. The following invariants were NOT checked:\n{:#?}",
            context, missing
        );
    }
    info!("Contract Test Passed: {}", context);
}

/// Clears the invariant log. Call this before running a new isolated test.
#[allow(dead_code)]
pub fn clear_invariant_log() {
    if let Ok(mut set) = checked_invariants().lock() {
        set.clear();
    }
}
