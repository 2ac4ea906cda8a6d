//! Token matching over listing text fields.

use crate::db::models::Listing;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Split a query into lowercase tokens on whitespace and commas,
/// dropping tokens shorter than two characters.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
        .collect()
}

/// Strip diacritics via canonical decomposition, so "México" folds to
/// "Mexico".
pub fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn haystack_fields(listing: &Listing) -> [&str; 8] {
    [
        &listing.title,
        &listing.description,
        &listing.street,
        &listing.number,
        &listing.neighborhood,
        &listing.city,
        &listing.state,
        &listing.postal_code,
    ]
}

/// Case-insensitive substring match of one token against any field.
fn matches_token(listing: &Listing, token: &str, fold: bool) -> bool {
    haystack_fields(listing).iter().any(|field| {
        let mut field = field.to_lowercase();
        let mut token = token.to_string();
        if fold {
            field = fold_accents(&field);
            token = fold_accents(&token);
        }
        field.contains(&token)
    })
}

/// Every token must match at least one field.
pub fn matches_all_tokens(listing: &Listing, tokens: &[String], fold: bool) -> bool {
    tokens.iter().all(|t| matches_token(listing, t, fold))
}

/// Accent- and case-insensitive substring test used by the state/city
/// filters.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_accents(&haystack.to_lowercase()).contains(&fold_accents(&needle.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_whitespace_and_commas() {
        assert_eq!(
            tokenize("casa, chihuahua  centro"),
            vec!["casa", "chihuahua", "centro"]
        );
    }

    #[test]
    fn tokenize_drops_short_tokens() {
        assert_eq!(tokenize("a casa y"), vec!["casa"]);
        assert!(tokenize("a , b").is_empty());
    }

    #[test]
    fn fold_accents_strips_diacritics() {
        assert_eq!(fold_accents("México"), "Mexico");
        assert_eq!(fold_accents("Mérida"), "Merida");
        // ñ decomposes to n + combining tilde
        assert_eq!(fold_accents("Año"), "Ano");
    }

    #[test]
    fn contains_folded_matches_both_directions() {
        assert!(contains_folded("Mérida", "merida"));
        assert!(contains_folded("Merida", "mérida"));
        assert!(!contains_folded("Chihuahua", "merida"));
    }
}
