//! `deck` - IssueDeck entity store CLI
//!
//! Seeds an in-memory store, hydrates it from the JSON snapshot in the data
//! directory and runs one command against it.

use issuedeck::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
