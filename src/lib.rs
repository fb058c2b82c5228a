//! Psychologist Directory
//!
//! Search and browse the registry of licensed psychologists:
//! - Typed client for the registry's Supabase RPCs
//! - Row-to-record grouping and incremental pagination
//! - Debounced scroll and search triggers
//! - Terminal UI with expandable cards

pub mod config;
pub mod directory;
pub mod error;
pub mod tui;
pub mod utils;

// Re-exports for convenience
pub use config::DirectoryConfig;
pub use directory::{DirectoryService, Pager, PsychologistRecord, SearchFilters, SupabaseClient};
pub use error::{DirectoryError, Result};
