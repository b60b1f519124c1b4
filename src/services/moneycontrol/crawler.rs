use super::errors::ScrapeError;
use super::html::{self, Anchor};
use super::transport::HttpTransport;
use crate::db::postgres::models::company_info::CompanyInfo;
use crate::env_config::models::app_config::{AnchorLayout, ScraperConfig};
use std::collections::HashSet;
use tracing::{debug, error, info, trace};
use url::Url;

/// Fetches one listing page per index entry and collects every company found,
/// in discovery order. A page that fails contributes nothing; the crawl goes on.
pub async fn crawl(
    transport: &dyn HttpTransport,
    listing_url: &str,
    config: &ScraperConfig,
) -> Vec<CompanyInfo> {
    let mut companies = Vec::new();

    for (index, letter) in config.alphabet.iter().enumerate() {
        let url = format!("{}{}", listing_url, letter);
        debug!(
            "Fetching listing page {}/{}: {}",
            index + 1,
            config.alphabet.len(),
            url
        );

        let body = match transport.get(&url, &[]).await {
            Ok(body) => body,
            Err(e) => {
                error!("Error fetching listing page for {}: {}", letter, e);
                continue;
            }
        };

        match parse_listing(&body, config) {
            Ok(found) => {
                debug!("Listing page {} yielded {} companies", letter, found.len());
                companies.extend(found);
            }
            Err(e) => error!("Error parsing listing page for {}: {}", letter, e),
        }
    }

    info!(
        "Crawl finished: {} companies from {} listing pages",
        companies.len(),
        config.alphabet.len()
    );
    companies
}

/// Companies on one listing page. Anchors of the wrong shape are skipped silently.
pub fn parse_listing(body: &[u8], config: &ScraperConfig) -> Result<Vec<CompanyInfo>, ScrapeError> {
    let anchors = html::extract_anchors(body, &config.listing_anchor_selector)?;

    Ok(anchors
        .iter()
        .filter_map(|anchor| company_from_anchor(anchor, &config.anchor_layout))
        .collect())
}

fn company_from_anchor(anchor: &Anchor, layout: &AnchorLayout) -> Option<CompanyInfo> {
    if !has_link_shape(&anchor.href) {
        trace!("Skipping anchor with unexpected link: {}", anchor.href);
        return None;
    }

    let segments: Vec<&str> = anchor.href.split('/').collect();
    if segments.len() < layout.min_segments() {
        trace!("Skipping anchor with too few segments: {}", anchor.href);
        return None;
    }

    let sector = segments[layout.sector];
    let company_name = segments[layout.company_name];
    let symbol = segments[layout.symbol];
    if sector.is_empty() || company_name.is_empty() || symbol.is_empty() {
        trace!("Skipping anchor with empty segment: {}", anchor.href);
        return None;
    }

    let company = CompanyInfo::new(&anchor.text, sector, company_name, symbol);
    if !company.is_insertable() {
        trace!("Skipping anchor without a name: {}", anchor.href);
        return None;
    }

    Some(company)
}

/// Absolute http(s) URL with a host.
fn has_link_shape(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

/// Keeps the first record of every symbol.
pub fn dedupe_by_symbol(companies: Vec<CompanyInfo>) -> Vec<CompanyInfo> {
    let mut seen = HashSet::new();
    companies
        .into_iter()
        .filter(|company| seen.insert(company.symbol.clone()))
        .collect()
}
