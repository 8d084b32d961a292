//! Sortable table view-model.
//!
//! Each column header carries a tri-state [`SortState`]. Clicking a sortable
//! header advances its state (`None -> Ascending -> Descending -> None`),
//! resets every other header and, unless the new state is `None`, reorders
//! the rows with a numeric-aware stable sort. Rows are only ever permuted:
//! every [`RowId`] stays valid across sorts.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Sort indicator of a single column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortState {
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }

    pub fn direction(self) -> Option<SortDirection> {
        match self {
            Self::None => None,
            Self::Ascending => Some(SortDirection::Ascending),
            Self::Descending => Some(SortDirection::Descending),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Ascending => " ▲",
            Self::Descending => " ▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
    pub sortable: bool,
    state: SortState,
}

impl Column {
    pub fn new(label: impl Into<String>, sortable: bool) -> Self {
        Self {
            label: label.into(),
            sortable,
            state: SortState::None,
        }
    }

    pub fn state(&self) -> SortState {
        self.state
    }
}

/// Stable identity of a row, unaffected by sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: RowId,
    cells: Vec<String>,
}

impl Row {
    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell text at `column`, or `""` when the row is too short.
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Result of a header click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// Header missing or not sortable; nothing changed.
    Ignored,
    /// Indicator cycled back to `None`; rows keep their last sorted order.
    Cleared { column: usize },
    Sorted {
        column: usize,
        direction: SortDirection,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    id: String,
    pub title: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    next_row_id: u64,
}

impl TableView {
    pub fn new(id: impl Into<String>, title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            columns,
            rows: Vec::new(),
            next_row_id: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn push_row<I, S>(&mut self, cells: I) -> RowId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        self.rows.push(Row {
            id,
            cells: cells.into_iter().map(Into::into).collect(),
        });
        id
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Current display position of a row.
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// The column currently showing a sort indicator, if any.
    pub fn active_sort(&self) -> Option<(usize, SortDirection)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.state.direction().map(|d| (i, d)))
    }

    /// Handle a click on the header at `column`.
    pub fn click_header(&mut self, column: usize) -> SortOutcome {
        let next = match self.columns.get(column) {
            Some(header) if header.sortable => header.state.next(),
            _ => return SortOutcome::Ignored,
        };

        for header in &mut self.columns {
            header.state = SortState::None;
        }
        self.columns[column].state = next;

        match next.direction() {
            None => SortOutcome::Cleared { column },
            Some(direction) => {
                self.sort_by_column(column, direction);
                SortOutcome::Sorted { column, direction }
            }
        }
    }

    /// Reorder rows by `column` without touching any indicator.
    pub fn sort_by_column(&mut self, column: usize, direction: SortDirection) {
        if self.rows.len() < 2 {
            return;
        }

        let keys: Vec<CellKey> = self
            .rows
            .iter()
            .map(|row| CellKey::new(row.cell(column)))
            .collect();

        let order = stable_order(keys.len(), |a, b| match direction {
            SortDirection::Ascending => keys[a].compare(&keys[b]),
            SortDirection::Descending => keys[b].compare(&keys[a]),
        });

        let mut slots: Vec<Option<Row>> = self.rows.drain(..).map(Some).collect();
        self.rows
            .extend(order.into_iter().filter_map(|i| slots[i].take()));
    }
}

/// Compare two cell texts the way a header click does.
///
/// Both sides are trimmed. If both parse as numbers they compare
/// numerically, otherwise by [`locale_compare`]. The fallback is per pair,
/// so a column mixing numbers and words is not guaranteed to be ordered
/// transitively.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    CellKey::new(a).compare(&CellKey::new(b))
}

static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?)(Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("number prefix regex is valid")
});

/// Parse the leading decimal number of `s`, ignoring any trailing text.
///
/// `"42 hosts"` is 42, `"1e3"` is 1000, `"-Infinity"` is negative infinity;
/// text without a numeric prefix yields `None`.
pub fn parse_number(s: &str) -> Option<f64> {
    let caps = NUMBER_PREFIX.captures(s.trim_start())?;
    let negative = &caps[1] == "-";
    let magnitude = match &caps[2] {
        "Infinity" => f64::INFINITY,
        digits => digits.parse::<f64>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Locale-style string ordering: accent- and case-insensitive first, then
/// unaccented before accented, then lowercase before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    TextKey::new(a).compare(&TextKey::new(b))
}

#[derive(Debug)]
struct TextKey<'a> {
    raw: &'a str,
    base: String,
    accents: String,
    case: Vec<bool>,
}

impl<'a> TextKey<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            base: raw
                .nfkd()
                .filter(|c| !is_combining_mark(*c))
                .flat_map(char::to_lowercase)
                .collect(),
            accents: raw.nfkd().flat_map(char::to_lowercase).collect(),
            case: raw.chars().map(char::is_uppercase).collect(),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.base
            .cmp(&other.base)
            .then_with(|| self.accents.cmp(&other.accents))
            .then_with(|| self.case.cmp(&other.case))
            .then_with(|| self.raw.cmp(other.raw))
    }
}

#[derive(Debug)]
struct CellKey<'a> {
    number: Option<f64>,
    text: TextKey<'a>,
}

impl<'a> CellKey<'a> {
    fn new(cell: &'a str) -> Self {
        let trimmed = cell.trim();
        Self {
            number: parse_number(trimmed),
            text: TextKey::new(trimmed),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => self.text.compare(&other.text),
        }
    }
}

/// Stable bottom-up merge sort over indices `0..len`.
///
/// Unlike `slice::sort_by`, this never panics when `compare` is not a total
/// order; it just produces some deterministic permutation.
fn stable_order<F>(len: usize, mut compare: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut buf = order.clone();
    let mut width = 1;

    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j, mut k) = (start, mid, start);

            while i < mid && j < end {
                if compare(order[j], order[i]) == Ordering::Less {
                    buf[k] = order[j];
                    j += 1;
                } else {
                    buf[k] = order[i];
                    i += 1;
                }
                k += 1;
            }
            buf[k..k + (mid - i)].copy_from_slice(&order[i..mid]);
            k += mid - i;
            buf[k..k + (end - j)].copy_from_slice(&order[j..end]);

            start = end;
        }
        std::mem::swap(&mut order, &mut buf);
        width *= 2;
    }

    order
}
