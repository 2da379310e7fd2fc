//! Core library modules for serial-dl
//!
//! Pattern inference and the sequential fetcher.

pub mod error;
pub mod fetcher;
pub mod pattern;

pub use fetcher::Fetcher;
pub use pattern::SequenceSpec;
