//! Row Grouping
//!
//! Reshapes flat search rows into one record per person. First-seen order is
//! kept for persons and, within a person, for specialties. Every input row
//! ends up as exactly one specialty entry. Rows without a `cod_personal`
//! cannot be attributed to anyone else and each become a record of their own.

use std::collections::HashMap;

use super::model::{PsychologistRecord, PsychologistRow, SpecialtyEntry};

/// Ordered set of person records keyed by `cod_personal`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<PsychologistRecord>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group rows into records, adding to whatever is already held.
    /// Returns the number of records that were newly created.
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = PsychologistRow>) -> usize {
        let before = self.records.len();
        for row in rows {
            match self.position(&row.cod_personal) {
                Some(pos) => self.records[pos].specialitati.push(SpecialtyEntry {
                    row_id: row.id,
                    specialty: row.specialty,
                }),
                None => self.push(PsychologistRecord::from_row(row)),
            }
        }
        self.records.len() - before
    }

    /// Merge already-grouped records in, folding duplicates into the first
    /// record seen for the same person.
    pub fn extend_records(&mut self, records: impl IntoIterator<Item = PsychologistRecord>) {
        for record in records {
            match self.position(&record.cod_personal) {
                Some(pos) => self.records[pos].specialitati.extend(record.specialitati),
                None => self.push(record),
            }
        }
    }

    fn position(&self, cod_personal: &str) -> Option<usize> {
        self.index.get(cod_personal.trim()).copied()
    }

    fn push(&mut self, record: PsychologistRecord) {
        let key = record.cod_personal.trim();
        if !key.is_empty() {
            self.index.insert(key.to_string(), self.records.len());
        }
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn records(&self) -> &[PsychologistRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of specialty entries across all records
    pub fn specialty_count(&self) -> usize {
        self.records.iter().map(|r| r.specialitati.len()).sum()
    }

    pub fn into_records(self) -> Vec<PsychologistRecord> {
        self.records
    }
}

/// Group flat rows into person records
pub fn group_rows(rows: impl IntoIterator<Item = PsychologistRow>) -> Vec<PsychologistRecord> {
    let mut set = RecordSet::new();
    set.extend_rows(rows);
    set.into_records()
}

/// Expand records back into flat rows, in order
pub fn flatten(records: &[PsychologistRecord]) -> Vec<PsychologistRow> {
    records.iter().flat_map(PsychologistRecord::to_rows).collect()
}

/// Re-apply grouping to records. A no-op on records that are already grouped.
pub fn regroup(records: impl IntoIterator<Item = PsychologistRecord>) -> Vec<PsychologistRecord> {
    let mut set = RecordSet::new();
    set.extend_records(records);
    set.into_records()
}
