//! Directory Data Model
//!
//! `PsychologistRow` is the flat shape returned by the search RPC (one row per
//! specialty per person). `PsychologistRecord` is the grouped shape the UI
//! renders (one record per person).

use serde::{Deserialize, Deserializer, Serialize};

/// Status value the registry uses for an active specialty
pub const ACTIVE_STATUS: &str = "Activ";

/// A single row from the search RPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsychologistRow {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nume: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cod_personal: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dgpc: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tsa: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expert: bool,
    #[serde(flatten)]
    pub specialty: Specialty,
}

/// One specialty sub-record of a person
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Specialty {
    #[serde(default, deserialize_with = "null_as_default")]
    pub specialitate: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub numar_atestat: Option<i64>,
    #[serde(default)]
    pub data_eliberare_atestat: Option<String>,
    #[serde(default)]
    pub treapta_specializare: Option<String>,
    #[serde(default)]
    pub regim_exercitare: Option<String>,
    #[serde(default)]
    pub filiala: Option<String>,
    #[serde(default)]
    pub comisia_de_avizare: Option<String>,
}

impl Specialty {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some(ACTIVE_STATUS)
    }
}

/// One person with all of their specialties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsychologistRecord {
    pub cod_personal: String,
    pub nume: String,
    pub email: Option<String>,
    pub dgpc: bool,
    pub tsa: bool,
    pub expert: bool,
    pub specialitati: Vec<SpecialtyEntry>,
}

/// A specialty together with the id of the row it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialtyEntry {
    pub row_id: Option<i64>,
    #[serde(flatten)]
    pub specialty: Specialty,
}

impl PsychologistRecord {
    /// Start a record from the first row seen for a person
    pub fn from_row(row: PsychologistRow) -> Self {
        Self {
            cod_personal: row.cod_personal,
            nume: row.nume,
            email: row.email,
            dgpc: row.dgpc,
            tsa: row.tsa,
            expert: row.expert,
            specialitati: vec![SpecialtyEntry {
                row_id: row.id,
                specialty: row.specialty,
            }],
        }
    }

    /// Split back into flat rows, one per specialty
    pub fn to_rows(&self) -> Vec<PsychologistRow> {
        self.specialitati
            .iter()
            .map(|entry| PsychologistRow {
                id: entry.row_id,
                nume: self.nume.clone(),
                cod_personal: self.cod_personal.clone(),
                email: self.email.clone(),
                dgpc: self.dgpc,
                tsa: self.tsa,
                expert: self.expert,
                specialty: entry.specialty.clone(),
            })
            .collect()
    }
}

/// Distinct values offered by the filter dropdowns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub specialties: Vec<String>,
    pub branches: Vec<String>,
}

/// Raw row of the filter-options RPC; either column may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterOptionRow {
    #[serde(default)]
    pub specialitate: Option<String>,
    #[serde(default)]
    pub filiala: Option<String>,
}

impl FilterOptions {
    /// Collect distinct, non-empty, sorted values from option rows
    pub fn from_rows(rows: impl IntoIterator<Item = FilterOptionRow>) -> Self {
        let mut specialties = Vec::new();
        let mut branches = Vec::new();
        for row in rows {
            if let Some(s) = row.specialitate.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
                specialties.push(s);
            }
            if let Some(b) = row.filiala.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()) {
                branches.push(b);
            }
        }
        specialties.sort();
        specialties.dedup();
        branches.sort();
        branches.dedup();
        Self { specialties, branches }
    }
}

/// Postgres returns `null` for unset booleans and text; treat it as the default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
