//! CLI-specific utilities for serial-dl
//!
//! Terminal output lives here, separate from the core library.

pub mod progress;

pub use progress::ProgressManager;
