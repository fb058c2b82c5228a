//! Search Filters
//!
//! User-selected criteria and their translation into search RPC parameters.

use serde_json::{json, Map, Value};

/// Search criteria as selected in the UI
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub name: String,
    pub specialties: Vec<String>,
    pub branches: Vec<String>,
    pub dgpc: bool,
    pub tsa: bool,
    pub expert: bool,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name as it is sent to the service
    pub fn normalized_name(&self) -> &str {
        self.name.trim()
    }

    /// Add the specialty if absent, remove it if present
    pub fn toggle_specialty(&mut self, specialty: &str) {
        toggle(&mut self.specialties, specialty);
    }

    pub fn toggle_branch(&mut self, branch: &str) {
        toggle(&mut self.branches, branch);
    }

    pub fn is_empty(&self) -> bool {
        self.normalized_name().is_empty()
            && self.specialties.is_empty()
            && self.branches.is_empty()
            && !self.dgpc
            && !self.tsa
            && !self.expert
    }

    /// JSON body for the search RPC. Inactive criteria are left out so the
    /// service applies no restriction for them.
    pub fn to_params(&self, page: usize, page_size: usize) -> Value {
        let mut params = Map::new();

        let name = self.normalized_name();
        if !name.is_empty() {
            params.insert("_nume".into(), json!(name));
        }
        if !self.specialties.is_empty() {
            params.insert("_specialitate".into(), json!(self.specialties));
        }
        if !self.branches.is_empty() {
            params.insert("_filiala".into(), json!(self.branches));
        }
        if self.dgpc {
            params.insert("_dgpc".into(), Value::Bool(true));
        }
        if self.tsa {
            params.insert("_tsa".into(), Value::Bool(true));
        }
        if self.expert {
            params.insert("_expert".into(), Value::Bool(true));
        }
        params.insert("_limit".into(), json!(page_size));
        params.insert("_offset".into(), json!(page * page_size));

        Value::Object(params)
    }
}

impl PartialEq for SearchFilters {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_name() == other.normalized_name()
            && self.specialties == other.specialties
            && self.branches == other.branches
            && self.dgpc == other.dgpc
            && self.tsa == other.tsa
            && self.expert == other.expert
    }
}

impl Eq for SearchFilters {}

fn toggle(selection: &mut Vec<String>, option: &str) {
    if let Some(pos) = selection.iter().position(|s| s == option) {
        selection.remove(pos);
    } else {
        selection.push(option.to_string());
    }
}
