//! Daily technical-analysis page: exchange quotes, indicator readings,
//! simple moving averages and pivot levels. Every table is read tolerantly;
//! an unreadable value is zero and the row is kept.

use super::errors::ScrapeError;
use super::html::{self, Row, parse_number};
use crate::env_config::models::app_config::TechnicalSelectors;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PriceQuote {
    pub price: f64,
    pub previous_close: f64,
    pub open: f64,
    pub variation: f64,
    pub percentage: f64,
    pub volume: i64,
}

/// Latest quote on both exchanges. An exchange missing from the page reads as
/// an all-zero quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockPrice {
    #[serde(rename = "BSE")]
    pub bse: PriceQuote,
    #[serde(rename = "NSE")]
    pub nse: PriceQuote,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TechnicalValue {
    pub level: f64,
    pub indication: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovingAverageValue {
    #[serde(rename = "SMA")]
    pub sma: f64,
    pub indication: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotPoints {
    #[serde(rename = "R1")]
    pub r1: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
    #[serde(rename = "R3")]
    pub r3: f64,
    #[serde(rename = "Pivot")]
    pub pivot: f64,
    #[serde(rename = "S1")]
    pub s1: f64,
    #[serde(rename = "S2")]
    pub s2: f64,
    #[serde(rename = "S3")]
    pub s3: f64,
}

/// Indicator name (without its parameters) to reading.
pub type StockTechnicals = BTreeMap<String, TechnicalValue>;
/// Period in days to moving average.
pub type StockMovingAverages = BTreeMap<u32, MovingAverageValue>;
/// Pivot method (Classic, Fibonacci, ...) to levels.
pub type StockPivotLevels = BTreeMap<String, PivotPoints>;

pub fn parse_price(body: &[u8], selectors: &TechnicalSelectors) -> Result<StockPrice, ScrapeError> {
    let fields = [
        selectors.price.as_str(),
        selectors.previous_close.as_str(),
        selectors.open.as_str(),
        selectors.change.as_str(),
        selectors.volume.as_str(),
    ];

    let quote = |block_css: &str| -> Result<PriceQuote, ScrapeError> {
        Ok(html::extract_blocks(body, block_css, &fields)?
            .last()
            .map(|values| quote_from_fields(values))
            .unwrap_or_default())
    };

    Ok(StockPrice {
        bse: quote(&selectors.bse_block)?,
        nse: quote(&selectors.nse_block)?,
    })
}

fn quote_from_fields(values: &[String]) -> PriceQuote {
    let field = |index: usize| values.get(index).map(String::as_str).unwrap_or("");
    let change = field(3);

    PriceQuote {
        price: parse_number(field(0)).unwrap_or(0.0),
        previous_close: parse_number(field(1)).unwrap_or(0.0),
        open: parse_number(field(2)).unwrap_or(0.0),
        variation: change
            .split_whitespace()
            .next()
            .and_then(parse_number)
            .unwrap_or(0.0),
        percentage: change
            .split('(')
            .nth(1)
            .and_then(|rest| rest.split('%').next())
            .and_then(parse_number)
            .unwrap_or(0.0),
        volume: parse_volume(field(4)).unwrap_or(0),
    }
}

fn parse_volume(text: &str) -> Option<i64> {
    text.trim().replace(',', "").parse::<i64>().ok()
}

pub fn parse_indicators(body: &[u8], row_css: &str) -> Result<StockTechnicals, ScrapeError> {
    let rows = html::extract_rows(body, row_css)?;

    let technicals = rows
        .iter()
        .filter_map(|row| {
            let label = row.text(0);
            // the band spans several values and has no single level
            if label.starts_with("Bollinger Band") {
                return None;
            }

            let name = indicator_name(label);
            if name.is_empty() {
                return None;
            }

            Some((
                name.to_string(),
                TechnicalValue {
                    level: emphasised_number(row, name),
                    indication: row.last_emphasis().to_string(),
                },
            ))
        })
        .collect();

    Ok(technicals)
}

/// `RSI(14)` -> `RSI`, `Williams %R(14)` -> `Williams`.
fn indicator_name(label: &str) -> &str {
    let without_params = label.split('(').next().unwrap_or("");
    without_params.split('%').next().unwrap_or("").trim()
}

pub fn parse_moving_averages(
    body: &[u8],
    row_css: &str,
) -> Result<StockMovingAverages, ScrapeError> {
    let rows = html::extract_rows(body, row_css)?;

    let averages = rows
        .iter()
        .filter_map(|row| {
            let period = row.text(0).parse::<u32>().ok().filter(|days| *days > 0)?;
            Some((
                period,
                MovingAverageValue {
                    sma: emphasised_number(row, row.text(0)),
                    indication: row.last_emphasis().to_string(),
                },
            ))
        })
        .collect();

    Ok(averages)
}

pub fn parse_pivot_levels(body: &[u8], row_css: &str) -> Result<StockPivotLevels, ScrapeError> {
    let rows = html::extract_rows(body, row_css)?;

    let levels = rows
        .iter()
        .filter(|row| !row.text(0).is_empty())
        .map(|row| {
            let level = |index: usize| row.number(index).unwrap_or(0.0);
            (
                row.text(0).to_string(),
                PivotPoints {
                    r1: level(1),
                    r2: level(2),
                    r3: level(3),
                    pivot: level(4),
                    s1: level(5),
                    s2: level(6),
                    s3: level(7),
                },
            )
        })
        .collect();

    Ok(levels)
}

fn emphasised_number(row: &Row, label: &str) -> f64 {
    parse_number(row.first_emphasis()).unwrap_or_else(|| {
        debug!("No readable level for {:?}", label);
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAILY_PAGE: &str = r#"
        <html><body>
            <div class="bsedata_bx">
                <span class="span_price_wrap">2,401.50</span>
                <span class="priceprevclose">2389.10</span>
                <span class="priceopen">2392.00</span>
                <span class="span_price_change_prcnt">12.40 (0.52%)</span>
                <span class="volume_data">1,23,456</span>
            </div>
            <div class="nsedata_bx">
                <span class="span_price_wrap">2402.00</span>
                <span class="span_price_change_prcnt">-3.05 (-0.13%)</span>
                <span class="volume_data">n/a</span>
            </div>

            <table id="techindd"><tbody>
                <tr><td>RSI(14)</td><td><strong>55.21</strong></td><td><strong>Neutral</strong></td></tr>
                <tr><td>Williams %R(14)</td><td><strong>-32.5</strong></td><td><strong>Bullish</strong></td></tr>
                <tr><td>Bollinger Band(20,2)</td><td>2350 - 2450</td><td><strong>Neutral</strong></td></tr>
                <tr><td>MACD(12,26,9)</td><td>-</td><td><strong>Bearish</strong></td></tr>
                <tr><td></td><td><strong>1</strong></td></tr>
            </tbody></table>

            <table id="movingavgd"><tbody>
                <tr><th>Period</th><th>Simple</th></tr>
                <tr><td>5</td><td><strong>2,398.20</strong></td><td><strong>Bullish</strong></td></tr>
                <tr><td>200</td><td><strong>2310.75</strong></td><td><strong>Bullish</strong></td></tr>
                <tr><td>Total</td><td><strong>9</strong></td></tr>
            </tbody></table>

            <div id="pevotld">
                <table><tbody>
                    <tr><td>Classic</td><td>2,420</td><td>2440</td><td>2460</td><td>2400</td><td>2380</td><td>2360</td><td>2340</td></tr>
                    <tr><td>Fibonacci</td><td>2415</td><td>2430</td></tr>
                </tbody></table>
            </div>
        </body></html>
    "#;

    fn selectors() -> TechnicalSelectors {
        TechnicalSelectors::default()
    }

    #[test]
    fn test_price_for_both_exchanges() {
        let price = parse_price(DAILY_PAGE.as_bytes(), &selectors()).unwrap();

        assert_eq!(
            price.bse,
            PriceQuote {
                price: 2401.5,
                previous_close: 2389.1,
                open: 2392.0,
                variation: 12.4,
                percentage: 0.52,
                volume: 123456,
            }
        );
        assert_eq!(price.nse.price, 2402.0);
        assert_eq!(price.nse.previous_close, 0.0);
        assert_eq!(price.nse.variation, -3.05);
        assert_eq!(price.nse.percentage, -0.13);
        assert_eq!(price.nse.volume, 0);
    }

    #[test]
    fn test_price_missing_exchange_is_zero() {
        let price = parse_price(b"<html><body><p>closed</p></body></html>", &selectors()).unwrap();
        assert_eq!(price, StockPrice::default());
    }

    #[test]
    fn test_indicators_strip_parameters_and_skip_band() {
        let technicals =
            parse_indicators(DAILY_PAGE.as_bytes(), &selectors().indicator_rows).unwrap();

        assert_eq!(technicals.len(), 3);
        assert_eq!(
            technicals["RSI"],
            TechnicalValue {
                level: 55.21,
                indication: "Neutral".to_string(),
            }
        );
        assert_eq!(technicals["Williams"].level, -32.5);
        assert!(!technicals.contains_key("Bollinger Band"));
    }

    #[test]
    fn test_indicator_without_level_reads_zero() {
        let technicals =
            parse_indicators(DAILY_PAGE.as_bytes(), &selectors().indicator_rows).unwrap();

        // the only strong in the row is the indication
        assert_eq!(technicals["MACD"].indication, "Bearish");
        assert_eq!(technicals["MACD"].level, 0.0);
    }

    #[test]
    fn test_moving_averages_keyed_by_period() {
        let averages =
            parse_moving_averages(DAILY_PAGE.as_bytes(), &selectors().moving_average_rows)
                .unwrap();

        assert_eq!(averages.keys().copied().collect::<Vec<_>>(), vec![5, 200]);
        assert_eq!(
            averages[&5],
            MovingAverageValue {
                sma: 2398.2,
                indication: "Bullish".to_string(),
            }
        );
        assert_eq!(averages[&200].sma, 2310.75);
    }

    #[test]
    fn test_pivot_levels_in_page_order() {
        let levels = parse_pivot_levels(DAILY_PAGE.as_bytes(), &selectors().pivot_rows).unwrap();

        assert_eq!(
            levels["Classic"],
            PivotPoints {
                r1: 2420.0,
                r2: 2440.0,
                r3: 2460.0,
                pivot: 2400.0,
                s1: 2380.0,
                s2: 2360.0,
                s3: 2340.0,
            }
        );
        // short row keeps what it has, the rest is zero
        assert_eq!(levels["Fibonacci"].r2, 2430.0);
        assert_eq!(levels["Fibonacci"].s3, 0.0);
    }

    #[test]
    fn test_serialized_shapes() {
        let price = serde_json::to_value(StockPrice::default()).unwrap();
        assert!(price["BSE"]["PreviousClose"].is_number());

        let average = serde_json::to_value(MovingAverageValue::default()).unwrap();
        assert!(average["SMA"].is_number());

        let pivots = serde_json::to_value(PivotPoints::default()).unwrap();
        assert!(pivots["Pivot"].is_number());
        assert!(pivots["S3"].is_number());
    }
}
