//! Subsidy eligibility results.
//!
//! The eligibility service answers with an HTML table whose columns have fixed,
//! positional meaning. A row is eligible when its status column reads
//! `eligible` (case-insensitive, trimmed); the aggregate decision is eligible
//! only when every row is.

use serde::{Deserialize, Serialize};

/// Column headers of the eligibility table, in order.
pub const COLUMN_HEADERS: [&str; 9] = ["No", "NIK", "Nama", "Status", "Keterangan", "DTSEN", "BSPS", "FLPP", "BP2BT"];

/// Status column value of an eligible row.
const ELIGIBLE: &str = "eligible";

/// One row of the eligibility table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRow {
    pub no: String,
    pub national_id: String,
    pub name: String,
    pub status: String,
    pub note: String,
    pub dtsen: String,
    pub bsps: String,
    pub flpp: String,
    pub bp2bt: String,
}

impl EligibilityRow {
    /// Build a row from cell texts in column order. Missing trailing cells are
    /// empty; cells past the ninth column are ignored.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter().map(Into::into);
        let mut next = || cells.next().unwrap_or_default();
        Self {
            no: next(),
            national_id: next(),
            name: next(),
            status: next(),
            note: next(),
            dtsen: next(),
            bsps: next(),
            flpp: next(),
            bp2bt: next(),
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ELIGIBLE)
    }
}

/// Aggregate result of an eligibility lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EligibilityOutcome {
    /// Every row is eligible.
    Eligible { rows: Vec<EligibilityRow> },
    /// At least one row is not eligible.
    NotEligible { rows: Vec<EligibilityRow> },
    /// The page carried no result table.
    TableMissing,
    /// The result table had no data rows.
    NoRows,
}

impl EligibilityOutcome {
    /// Decide from parsed rows. An empty row set is [`EligibilityOutcome::NoRows`].
    pub fn from_rows(rows: Vec<EligibilityRow>) -> Self {
        if rows.is_empty() {
            EligibilityOutcome::NoRows
        } else if rows.iter().all(EligibilityRow::is_eligible) {
            EligibilityOutcome::Eligible { rows }
        } else {
            EligibilityOutcome::NotEligible { rows }
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityOutcome::Eligible { .. })
    }

    pub fn rows(&self) -> &[EligibilityRow] {
        match self {
            EligibilityOutcome::Eligible { rows } | EligibilityOutcome::NotEligible { rows } => rows,
            EligibilityOutcome::TableMissing | EligibilityOutcome::NoRows => &[],
        }
    }

    /// Localized headline for the outcome.
    pub fn headline(&self) -> &'static str {
        match self {
            EligibilityOutcome::Eligible { .. } => "Selamat! Anda Eligible",
            EligibilityOutcome::NotEligible { .. } => "Maaf, Anda Belum Layak",
            EligibilityOutcome::TableMissing => "Data tidak ditemukan untuk NIK tersebut.",
            EligibilityOutcome::NoRows => "Tidak ada data subsidi untuk NIK tersebut.",
        }
    }
}
