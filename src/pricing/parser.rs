//! Price extraction from unstructured text.
//!
//! A best-effort heuristic over prose (listing titles, snippets,
//! summaries), not a validated price grammar. It looks for a currency
//! marker followed by an adjacent numeric token and preserves partial
//! evidence rather than discarding it.

use super::PriceCandidate;
use regex::Regex;

/// Extracts price candidates from free text.
pub struct PriceParser {
    pattern: Regex,
}

impl PriceParser {
    pub fn new() -> Self {
        // Currency code or symbol, optional whitespace, then a numeric
        // token that may carry thousands separators and a decimal point.
        let pattern = Regex::new(
            r"(?i)(USD|EUR|GBP|CHF|JPY|HKD|SGD|AUD|CAD|[$€£¥])\s*([0-9][0-9,.']*)",
        )
        .expect("Invalid regex");

        Self { pattern }
    }

    /// Extract the first currency-adjacent numeric token from `text`.
    ///
    /// Returns `None` when no such pattern exists. When the currency
    /// marker is present but the numeric token does not parse, the
    /// candidate is returned with `value` absent so the caller can
    /// decide whether the partial signal is useful.
    pub fn parse(&self, text: &str) -> Option<PriceCandidate> {
        let caps = self.pattern.captures(text)?;

        let currency_raw = caps.get(1)?.as_str();
        let number_raw = caps.get(2)?.as_str();

        // Alphabetic codes are normalized to uppercase; symbols pass through.
        let currency = if currency_raw.chars().any(|c| c.is_ascii_alphabetic()) {
            currency_raw.to_uppercase()
        } else {
            currency_raw.to_string()
        };

        let value = Self::parse_number(number_raw);

        Some(PriceCandidate {
            value,
            currency: Some(currency),
            raw: format!("{} {}", currency_raw, number_raw),
            source: None,
        })
    }

    /// Parse a numeric token, tolerating thousands separators.
    fn parse_number(token: &str) -> Option<f64> {
        let cleaned: String = token.chars().filter(|c| *c != ',' && *c != '\'').collect();
        cleaned.parse::<f64>().ok()
    }
}

impl Default for PriceParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_with_thousands_separator() {
        let parser = PriceParser::new();
        let candidate = parser
            .parse("Rolex Submariner listed at $9,500 on Chrono24")
            .unwrap();

        assert_eq!(candidate.value, Some(9500.0));
        assert_eq!(candidate.currency.as_deref(), Some("$"));
        assert_eq!(candidate.raw, "$ 9,500");
    }

    #[test]
    fn test_currency_code() {
        let parser = PriceParser::new();
        let candidate = parser.parse("Asking CHF 12'800 for this one").unwrap();

        assert_eq!(candidate.value, Some(12800.0));
        assert_eq!(candidate.currency.as_deref(), Some("CHF"));
    }

    #[test]
    fn test_lowercase_code_is_normalized() {
        let parser = PriceParser::new();
        let candidate = parser.parse("around usd 4,200 shipped").unwrap();

        assert_eq!(candidate.currency.as_deref(), Some("USD"));
        assert_eq!(candidate.value, Some(4200.0));
    }

    #[test]
    fn test_decimal_point() {
        let parser = PriceParser::new();
        let candidate = parser.parse("now €1,299.99 at retail").unwrap();

        assert_eq!(candidate.value, Some(1299.99));
        assert_eq!(candidate.currency.as_deref(), Some("€"));
    }

    #[test]
    fn test_malformed_number_keeps_partial_evidence() {
        let parser = PriceParser::new();
        let candidate = parser.parse("priced at $9.500.00.1.2").unwrap();

        assert!(candidate.value.is_none());
        assert_eq!(candidate.currency.as_deref(), Some("$"));
        assert!(!candidate.raw.is_empty());
    }

    #[test]
    fn test_no_price_yields_none() {
        let parser = PriceParser::new();
        assert!(parser.parse("A lovely dive watch with a ceramic bezel").is_none());
        assert!(parser.parse("").is_none());
    }

    #[test]
    fn test_number_without_currency_yields_none() {
        let parser = PriceParser::new();
        assert!(parser.parse("The 126610 has a 41mm case").is_none());
    }

    #[test]
    fn test_round_trip_on_raw() {
        let parser = PriceParser::new();
        let first = parser.parse("snagged mine for $ 9,500 last week").unwrap();
        let second = parser.parse(&first.raw).unwrap();

        assert_eq!(second.value, first.value);
        assert_eq!(second.currency, first.currency);
        assert_eq!(second.raw, first.raw);
    }
}
