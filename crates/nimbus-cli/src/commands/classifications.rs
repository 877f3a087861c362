//! `nimbus classifications` -- list known log classifications.
//!
//! # Example
//!
//! ```text
//! nimbus classifications
//! ```

use nimbus_core::log::{Classification, LOG_CLASSIFICATIONS_ENV};

/// One line per classification: dotted name, hex code, facility.
fn rows() -> Vec<String> {
    Classification::ALL
        .iter()
        .map(|c| format!("  {:<24} {:#08x}  {:?}", c.as_str(), c.code(), c.facility()))
        .collect()
}

/// Run the classifications command.
pub fn run() {
    println!("Log classifications");
    println!("===================");
    println!();
    for row in rows() {
        println!("{row}");
    }
    println!();
    println!("Select with --log or {LOG_CLASSIFICATIONS_ENV} (comma-separated names).");
}
