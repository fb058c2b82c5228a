//! Card Presentation
//!
//! Display helpers shared by the TUI and the plain-text output, plus the
//! expand/collapse state of a card.

use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::NaiveDate;

use super::model::{PsychologistRecord, Specialty};
use crate::utils::{truncate_text, TruncationPolicy};

pub const DGPC_BADGE: &str = "Din grijǎ pentru copii";
pub const TSA_BADGE: &str = "TSA";
pub const EXPERT_BADGE: &str = "Expert";

pub const LABEL_CODE: &str = "Cod personal";
pub const LABEL_SPECIALTIES: &str = "Specializări";
pub const LABEL_CONTACT: &str = "Contactează";

/// Longest detail value printed in plain-text cards
const DETAIL_BUDGET: usize = 160;

/// Avatar initials for a name
pub fn initials(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let picked: Vec<&str> = if parts.len() > 2 {
        vec![parts[0], parts[parts.len() - 1]]
    } else {
        parts
    };
    picked
        .iter()
        .filter_map(|p| p.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// The registry may hold several comma-separated addresses; the first is used
/// for contact.
pub fn first_email(email: Option<&str>) -> Option<&str> {
    email
        .and_then(|e| e.split(',').next())
        .map(str::trim)
        .filter(|e| !e.is_empty())
}

pub fn mailto(record: &PsychologistRecord) -> Option<String> {
    first_email(record.email.as_deref()).map(|e| format!("mailto:{}", e))
}

pub fn badges(record: &PsychologistRecord) -> Vec<&'static str> {
    let mut out = Vec::new();
    if record.dgpc {
        out.push(DGPC_BADGE);
    }
    if record.tsa {
        out.push(TSA_BADGE);
    }
    if record.expert {
        out.push(EXPERT_BADGE);
    }
    out
}

/// ISO dates are shown day-first; anything else is shown as stored
pub fn format_date(raw: &str) -> String {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Label/value pairs shown when a specialty is opened
pub fn specialty_details(specialty: &Specialty) -> Vec<(&'static str, String)> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        (
            "Număr atestat",
            specialty.numar_atestat.map(|n| n.to_string()).unwrap_or_default(),
        ),
        (
            "Data eliberare",
            specialty
                .data_eliberare_atestat
                .as_deref()
                .map(format_date)
                .unwrap_or_default(),
        ),
        ("Treaptă", text(&specialty.treapta_specializare)),
        ("Regim", text(&specialty.regim_exercitare)),
        ("Filiala", text(&specialty.filiala)),
        ("Comisia", text(&specialty.comisia_de_avizare)),
    ]
}

pub fn status_label(specialty: &Specialty) -> &str {
    specialty.status.as_deref().unwrap_or("")
}

/// Expand/collapse state of one card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardState {
    pub expanded: bool,
    open: HashSet<usize>,
    /// Specialty the keyboard points at inside the expanded card
    cursor: usize,
}

impl CardState {
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize, specialty_count: usize) {
        if specialty_count == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, specialty_count as isize - 1) as usize;
    }

    /// Open or close the specialty under the cursor
    pub fn toggle_cursor(&mut self, specialty_count: usize) {
        self.toggle_specialty(self.cursor, specialty_count);
    }

    /// Open or close a specialty's details; out of range indices are ignored
    pub fn toggle_specialty(&mut self, index: usize, specialty_count: usize) {
        if index >= specialty_count {
            return;
        }
        if !self.open.remove(&index) {
            self.open.insert(index);
        }
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open.contains(&index)
    }
}

/// Plain-text card, every specialty with its details
pub fn render_text(record: &PsychologistRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", initials(&record.nume), record.nume);

    let badges = badges(record);
    if !badges.is_empty() {
        let _ = writeln!(out, "  {}", badges.join(" | "));
    }
    if let Some(email) = first_email(record.email.as_deref()) {
        let _ = writeln!(out, "  {}: {}", LABEL_CONTACT, email);
    }
    let _ = writeln!(out, "  {}: {}", LABEL_CODE, record.cod_personal);
    let _ = writeln!(out, "  {}:", LABEL_SPECIALTIES);

    for entry in &record.specialitati {
        let spec = &entry.specialty;
        let _ = writeln!(out, "    - {} [{}]", spec.specialitate, status_label(spec));
        for (label, value) in specialty_details(spec) {
            if value.is_empty() {
                continue;
            }
            let value = truncate_text(&value, TruncationPolicy::Bytes(DETAIL_BUDGET));
            let _ = writeln!(out, "        {}: {}", label, value);
        }
    }
    out
}
