// Analyzer module: indicator math and per-ticker snapshot building.

pub mod indicators;
pub mod ticker;

// Re-export the entry point used by the scanner.
pub use ticker::analyze;
