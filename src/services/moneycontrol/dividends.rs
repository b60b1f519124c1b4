use super::errors::ScrapeError;
use super::html::{self, Row};
use crate::env_config::models::app_config::ScraperConfig;
use serde::Serialize;
use tracing::{debug, warn};

/// One dividend event as relayed to the sink. Dates are Unix seconds; zero
/// means the source date could not be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DividendRecord {
    pub announcement_date: i64,
    pub ex_date: i64,
    pub dividend_type: String,
    pub dividend_percentage: f64,
    pub dividend: f64,
    pub remark: String,
}

/// Reads every row of the dividend table, in page order. A bad cell becomes a
/// zero value in its record; only an unreadable page fails.
pub fn parse_dividend_table(
    body: &[u8],
    config: &ScraperConfig,
    company: &str,
) -> Result<Vec<DividendRecord>, ScrapeError> {
    let rows = html::extract_rows(body, &config.dividend_row_selector)?;

    let records: Vec<DividendRecord> = rows
        .iter()
        .filter(|row| {
            if row.is_empty() {
                debug!("Skipping dividend row without cells for {}", company);
            }
            !row.is_empty()
        })
        .map(|row| dividend_from_row(row, config, company))
        .collect();

    debug!("Parsed {} dividend rows for {}", records.len(), company);
    Ok(records)
}

fn dividend_from_row(row: &Row, config: &ScraperConfig, company: &str) -> DividendRecord {
    let columns = &config.dividend_columns;
    if row.len() <= columns.max_index() {
        debug!("Dividend row for {} has only {} cells", company, row.len());
    }

    let announcement_date = row
        .date(columns.announcement_date, &config.date_format)
        .unwrap_or_else(|| {
            warn!(
                "Error converting dividend announcement date {:?} for {}",
                row.text(columns.announcement_date),
                company
            );
            0
        });

    let ex_date = row
        .date(columns.ex_date, &config.date_format)
        .unwrap_or_else(|| {
            warn!(
                "Error converting dividend ex date {:?} for {}",
                row.text(columns.ex_date),
                company
            );
            0
        });

    let dividend_percentage = row.number(columns.percentage).unwrap_or_else(|| {
        warn!(
            "Error converting dividend percentage {:?} for {}",
            row.text(columns.percentage),
            company
        );
        0.0
    });

    let dividend = row.number(columns.amount).unwrap_or_else(|| {
        warn!(
            "Error converting dividend amount {:?} for {}",
            row.text(columns.amount),
            company
        );
        0.0
    });

    DividendRecord {
        announcement_date,
        ex_date,
        dividend_type: row.text(columns.dividend_type).to_string(),
        dividend_percentage,
        dividend,
        remark: row.text(columns.remark).to_string(),
    }
}
