//! Search & Filter Engine
//!
//! Pure in-memory filtering over the available listing set. Parameters
//! arrive as raw query strings and are parsed leniently: malformed
//! numbers and out-of-enum values are treated as absent, never as
//! errors.

mod params;
mod text;

pub use params::{SearchFilters, SearchParams};
pub use text::{fold_accents, matches_all_tokens, tokenize};

use crate::db::models::Listing;
use serde::Serialize;

/// Fixed page size for public search results
pub const SEARCH_PAGE_SIZE: usize = 12;

/// One page of search results
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub listings: Vec<Listing>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Run the full pipeline over the available set: structured filters,
/// token matching with accent fallback, then pagination.
pub fn run_search(listings: Vec<Listing>, params: &SearchParams) -> SearchPage {
    let filters = params.parse();
    let filtered = apply_filters(listings, &filters);
    paginate(filtered, filters.page)
}

fn apply_filters(listings: Vec<Listing>, filters: &SearchFilters) -> Vec<Listing> {
    let structured: Vec<Listing> = listings
        .into_iter()
        .filter(|l| filters.matches_structured(l))
        .collect();

    let tokens = &filters.tokens;
    if tokens.is_empty() {
        return structured;
    }

    let exact: Vec<Listing> = structured
        .iter()
        .filter(|l| matches_all_tokens(l, tokens, false))
        .cloned()
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    // Accent-insensitive retry when the literal pass finds nothing
    structured
        .into_iter()
        .filter(|l| matches_all_tokens(l, tokens, true))
        .collect()
}

/// Slice out one page. An out-of-range page clamps to the nearest valid
/// page instead of erroring.
fn paginate(listings: Vec<Listing>, requested_page: usize) -> SearchPage {
    let total_count = listings.len();
    let total_pages = total_count.div_ceil(SEARCH_PAGE_SIZE).max(1);
    let page = requested_page.clamp(1, total_pages);

    let start = (page - 1) * SEARCH_PAGE_SIZE;
    let listings = listings
        .into_iter()
        .skip(start)
        .take(SEARCH_PAGE_SIZE)
        .collect();

    SearchPage {
        listings,
        page,
        total_pages,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{FinancingType, ListingStatus, OperationType};
    use rust_decimal::Decimal;

    fn listing(title: &str, city: &str, neighborhood: &str) -> Listing {
        Listing {
            id: None,
            owner: "user:ana".parse().unwrap(),
            title: title.to_string(),
            description: String::new(),
            price: Decimal::new(1_000_000, 0),
            operation: OperationType::Sale,
            bedrooms: 3,
            bathrooms: 2.0,
            parking: 1,
            built_area: 120,
            lot_area: 150,
            financing: FinancingType::Either,
            street: "Calle 5".to_string(),
            number: "10".to_string(),
            neighborhood: neighborhood.to_string(),
            city: city.to_string(),
            state: "Chihuahua".to_string(),
            postal_code: "31000".to_string(),
            latitude: None,
            longitude: None,
            status: ListingStatus::Available,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn params(q: &str) -> SearchParams {
        SearchParams {
            q: Some(q.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn all_tokens_must_match_somewhere() {
        let listings = vec![
            listing("Casa amplia", "Chihuahua", "Centro"),
            listing("Casa chica", "Juarez", "Centro"),
            listing("Departamento", "Chihuahua", "Norte"),
        ];

        let page = run_search(listings, &params("casa chihuahua"));
        assert_eq!(page.total_count, 1);
        assert_eq!(page.listings[0].title, "Casa amplia");
    }

    #[test]
    fn short_tokens_are_dropped() {
        let listings = vec![listing("Casa amplia", "Chihuahua", "Centro")];
        // "a" and "d" drop out, leaving only "casa"
        let page = run_search(listings, &params("a casa d"));
        assert_eq!(page.total_count, 1);
    }

    #[test]
    fn accent_fallback_only_when_exact_pass_is_empty() {
        let listings = vec![
            listing("Casa", "Mérida", "Centro"),
            listing("Casa", "Merida Norte", "Centro"),
        ];

        // Exact pass finds the unaccented city, no fallback
        let page = run_search(listings.clone(), &params("merida"));
        assert_eq!(page.total_count, 1);
        assert_eq!(page.listings[0].city, "Merida Norte");

        // Nothing matches "mérida" literally against "Merida Norte" only set
        let only_accented = vec![listing("Casa", "Mérida", "Centro")];
        let page = run_search(only_accented, &params("merida"));
        assert_eq!(page.total_count, 1);
        assert_eq!(page.listings[0].city, "Mérida");
    }

    #[test]
    fn pagination_clamps_out_of_range_pages() {
        let listings: Vec<Listing> = (0..30)
            .map(|i| listing(&format!("Casa {i}"), "Chihuahua", "Centro"))
            .collect();

        let mut p = SearchParams::default();
        p.page = Some("99".to_string());
        let page = run_search(listings.clone(), &p);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.listings.len(), 30 - 2 * SEARCH_PAGE_SIZE);

        let mut p = SearchParams::default();
        p.page = Some("0".to_string());
        let page = run_search(listings, &p);
        assert_eq!(page.page, 1);
        assert_eq!(page.listings.len(), SEARCH_PAGE_SIZE);
    }

    #[test]
    fn empty_result_set_reports_one_page() {
        let page = run_search(vec![], &params("casa"));
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let listings = vec![listing("Casa", "Chihuahua", "Centro")];
        let mut p = SearchParams::default();
        p.min_price = Some("not-a-number".to_string());
        p.min_bedrooms = Some("".to_string());
        let page = run_search(listings, &p);
        assert_eq!(page.total_count, 1);
    }

    #[test]
    fn structured_filters_and_combine() {
        let mut cheap = listing("Casa", "Chihuahua", "Centro");
        cheap.price = Decimal::new(500_000, 0);
        let mut rent = listing("Depa", "Chihuahua", "Centro");
        rent.operation = OperationType::Rent;

        let listings = vec![cheap, rent, listing("Casa cara", "Chihuahua", "Centro")];

        let mut p = SearchParams::default();
        p.operation = Some("sale".to_string());
        p.min_price = Some("800000".to_string());
        let page = run_search(listings, &p);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.listings[0].title, "Casa cara");
    }

    #[test]
    fn city_filter_is_accent_insensitive() {
        let listings = vec![
            listing("Casa", "Mérida", "Centro"),
            listing("Casa", "Chihuahua", "Centro"),
        ];
        let mut p = SearchParams::default();
        p.city = Some("merida".to_string());
        let page = run_search(listings, &p);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.listings[0].city, "Mérida");
    }
}
