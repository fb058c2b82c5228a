//! Multi-select dropdown state

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownKind {
    Specialties,
    Branches,
}

impl DropdownKind {
    pub fn placeholder(self) -> &'static str {
        match self {
            DropdownKind::Specialties => "Toate specializările",
            DropdownKind::Branches => "Toate filialele",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            DropdownKind::Specialties => " Specializare ",
            DropdownKind::Branches => " Filiala ",
        }
    }
}

pub const SEARCH_PLACEHOLDER: &str = "Cauta...";
pub const NO_MATCH: &str = "Niciun rezultat gasit.";

/// An open dropdown: the query typed into it and the highlighted row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropdown {
    pub kind: DropdownKind,
    pub query: String,
    pub cursor: usize,
}

impl Dropdown {
    pub fn new(kind: DropdownKind) -> Self {
        Self {
            kind,
            query: String::new(),
            cursor: 0,
        }
    }

    /// Options matching the query, case-insensitively
    pub fn visible<'a>(&self, options: &'a [String]) -> Vec<&'a str> {
        let needle = self.query.trim().to_lowercase();
        options
            .iter()
            .map(String::as_str)
            .filter(|o| needle.is_empty() || o.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
        self.cursor = 0;
    }

    pub fn pop(&mut self) {
        self.query.pop();
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, delta: isize, visible_len: usize) {
        if visible_len == 0 {
            self.cursor = 0;
            return;
        }
        let max = visible_len as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }

    pub fn current<'a>(&self, options: &'a [String]) -> Option<&'a str> {
        self.visible(options).get(self.cursor).copied()
    }
}

/// Button text for a closed dropdown
pub fn summary(selected: &[String], kind: DropdownKind) -> String {
    if selected.is_empty() {
        kind.placeholder().to_string()
    } else {
        format!("{} selectii", selected.len())
    }
}
