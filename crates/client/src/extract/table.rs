//! Eligibility result table parsing.
//!
//! The PKP eligibility page renders its answer under the element with id
//! `example1` (normally a `table`). Each `tbody tr` with at least one `td`
//! inside it is a row; cell texts are trimmed and read
//! positionally (see [`COLUMN_HEADERS`](rumahsubsidi_core::model::COLUMN_HEADERS)).

use rumahsubsidi_core::model::{EligibilityOutcome, EligibilityRow};
use scraper::{Html, Selector};

/// Parse an eligibility page into an outcome.
///
/// No table gives [`EligibilityOutcome::TableMissing`]; a table without data
/// rows gives [`EligibilityOutcome::NoRows`].
pub fn parse_eligibility_page(html: &str) -> EligibilityOutcome {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("#example1").expect("invalid selector");
    let row_selector = Selector::parse("tbody tr").expect("invalid selector");
    let cell_selector = Selector::parse("td").expect("invalid selector");

    let Some(table) = document.select(&table_selector).next() else {
        return EligibilityOutcome::TableMissing;
    };

    let rows: Vec<EligibilityRow> = table
        .select(&row_selector)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            (!cells.is_empty()).then(|| EligibilityRow::from_cells(cells))
        })
        .collect();

    EligibilityOutcome::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
            <table id="example1" class="table">
              <thead><tr><th>No</th><th>NIK</th><th>Nama</th><th>Status</th><th>Keterangan</th></tr></thead>
              <tbody>{rows}</tbody>
            </table>
            </body></html>"#
        )
    }

    fn row(no: u32, status: &str) -> String {
        format!(
            "<tr><td>{no}</td><td>3201234567890123</td><td> Budi </td><td>\n {status} \n</td><td>-</td>\
             <td>Ya</td><td>Tidak</td><td>Ya</td><td>Tidak</td></tr>"
        )
    }

    #[test]
    fn test_all_rows_eligible() {
        let html = page(&format!("{}{}", row(1, "Eligible"), row(2, "ELIGIBLE")));
        let outcome = parse_eligibility_page(&html);
        assert!(outcome.is_eligible());
        assert_eq!(outcome.rows().len(), 2);
        assert_eq!(outcome.rows()[0].name, "Budi");
        assert_eq!(outcome.rows()[1].bp2bt, "Tidak");
    }

    #[test]
    fn test_one_row_not_eligible() {
        let html = page(&format!("{}{}", row(1, "Eligible"), row(2, "Not Eligible")));
        let outcome = parse_eligibility_page(&html);
        assert!(matches!(outcome, EligibilityOutcome::NotEligible { ref rows } if rows.len() == 2));
    }

    #[test]
    fn test_table_missing() {
        let outcome = parse_eligibility_page("<html><body><p>NIK tidak terdaftar</p></body></html>");
        assert_eq!(outcome, EligibilityOutcome::TableMissing);
    }

    #[test]
    fn test_table_without_rows() {
        assert_eq!(parse_eligibility_page(&page("")), EligibilityOutcome::NoRows);
    }

    #[test]
    fn test_rows_without_cells_are_skipped() {
        let html = page(&format!("<tr></tr>{}", row(1, "Eligible")));
        let outcome = parse_eligibility_page(&html);
        assert_eq!(outcome.rows().len(), 1);
    }

    #[test]
    fn test_other_tables_ignored() {
        let html = format!(r#"<table id="other"><tbody>{}</tbody></table>"#, row(1, "Eligible"));
        assert_eq!(parse_eligibility_page(&html), EligibilityOutcome::TableMissing);
    }

    #[test]
    fn test_result_id_on_wrapper_element() {
        let html = format!(
            r#"<div id="example1"><table><tbody>{}</tbody></table></div>"#,
            row(1, "Eligible")
        );
        let outcome = parse_eligibility_page(&html);
        assert!(outcome.is_eligible());
        assert_eq!(outcome.rows().len(), 1);
    }
}
