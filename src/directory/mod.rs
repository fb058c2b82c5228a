//! Directory Module
//!
//! Everything between the remote data service and the screen: the data
//! model, row grouping, search filters, pagination and card presentation.

pub mod card;
mod client;
mod debounce;
mod filters;
mod grouping;
mod model;
mod pager;

pub use client::{DirectoryService, SupabaseClient};
pub use debounce::Debouncer;
pub use filters::SearchFilters;
pub use grouping::{flatten, group_rows, regroup, RecordSet};
pub use model::{
    FilterOptionRow, FilterOptions, PsychologistRecord, PsychologistRow, Specialty, SpecialtyEntry,
    ACTIVE_STATUS,
};
pub use pager::{fetch_pages, PageMode, PageOutcome, PageRequest, Pager};
