//! Price-intent classification.
//!
//! A deliberately cheap lexical gate: a question either needs live price
//! augmentation or it doesn't. False positives are harmless because the
//! resolver degrades to "no live price found"; false negatives only
//! under-serve the answer.

/// Vocabulary that marks a question as price-seeking.
const PRICE_TERMS: &[&str] = &[
    "price",
    "cost",
    "market",
    "listing",
    "resale",
    "retail",
    "sell",
    "selling",
    "how much",
    "worth",
    "value",
    "going for",
];

/// Classification outcome for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intent {
    /// Whether the question asks about current market price.
    pub needs_live_price: bool,
}

/// Classify a question against the price vocabulary.
///
/// Case-insensitive substring match; total, never fails.
pub fn classify(question: &str) -> Intent {
    let lowered = question.to_lowercase();
    let needs_live_price = PRICE_TERMS.iter().any(|term| lowered.contains(term));
    Intent { needs_live_price }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_questions() {
        assert!(classify("What's the current price of a Submariner?").needs_live_price);
        assert!(classify("How much does a Speedmaster cost?").needs_live_price);
        assert!(classify("what is the NAUTILUS going for").needs_live_price);
        assert!(classify("Is the Daytona worth it on the resale market?").needs_live_price);
    }

    #[test]
    fn test_catalog_questions() {
        assert!(!classify("What movement does the Submariner use?").needs_live_price);
        assert!(!classify("Tell me about the Speedmaster caliber").needs_live_price);
        assert!(!classify("").needs_live_price);
    }

    #[test]
    fn test_case_insensitive() {
        assert!(classify("CURRENT PRICE?").needs_live_price);
        assert!(classify("How Much Is It").needs_live_price);
    }
}
