//! Category classification by keyword-weighted scoring
//!
//! A pure function of the input text: no learning, no persistence, no
//! external calls. Each category owns a fixed keyword list; a category's
//! weight is the total number of case-insensitive substring occurrences of
//! its keywords in `topic + context + source_url`. The highest weight wins.
//!
//! Table order is part of the contract: the winner is the first category
//! whose weight strictly exceeds the best seen so far, so ties resolve to
//! the earliest entry. Two different fallbacks cover the zero-weight case —
//! generic blockchain vocabulary routes to `midnight`, anything else to the
//! `research` catch-all.

use indexmap::IndexMap;
use mkb_store::Category;

/// Generic blockchain vocabulary that routes a no-signal input to
/// [`Category::Midnight`] instead of the catch-all.
const BLOCKCHAIN_HINTS: [&str; 4] = ["blockchain", "crypto", "token", "wallet"];

/// Keyword-weighted category classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    table: IndexMap<Category, Vec<&'static str>>,
}

impl Classifier {
    /// Build the classifier with the canonical keyword table.
    #[must_use]
    pub fn new() -> Self {
        let mut table = IndexMap::new();
        table.insert(
            Category::Cardano,
            vec![
                "cardano",
                "ada",
                "plutus",
                "stake pool",
                "catalyst",
                "daedalus",
                "yoroi",
                "shelley",
                "voltaire",
                "goguen",
                "docs.cardano.org",
                "cardano.org",
            ],
        );
        table.insert(
            Category::Midnight,
            vec![
                "midnight",
                "midnight network",
                "dust",
                "compact",
                "midnight.network",
                "privacy blockchain",
            ],
        );
        table.insert(
            Category::Healthcare,
            vec![
                "healthcare",
                "health",
                "medical",
                "patient",
                "hipaa",
                "fhir",
                "hl7",
                "ehr",
                "emr",
                "clinical",
                "hospital",
                "doctor",
                "pharma",
                "drug",
                "diagnosis",
            ],
        );
        table.insert(
            Category::Zkproofs,
            vec![
                "zero knowledge",
                "zk-proof",
                "zkp",
                "zk-snark",
                "zk-stark",
                "zero-knowledge",
                "proof system",
                "cryptographic proof",
                "privacy proof",
            ],
        );
        table.insert(
            Category::SmartContracts,
            vec![
                "smart contract",
                "solidity",
                "vyper",
                "contract",
                "dapp",
                "decentralized app",
                "on-chain",
            ],
        );
        table.insert(
            Category::Architecture,
            vec![
                "architecture",
                "design pattern",
                "system design",
                "infrastructure",
                "scalability",
                "distributed system",
                "consensus",
                "protocol",
            ],
        );
        table.insert(
            Category::Competitors,
            vec![
                "ethereum",
                "polkadot",
                "cosmos",
                "avalanche",
                "solana",
                "algorand",
                "near",
                "comparison",
                "vs",
            ],
        );
        Self { table }
    }

    /// Classify a topic into its best-matching category.
    ///
    /// Deterministic and side-effect-free; see the module docs for the
    /// tie-break and fallback rules.
    #[must_use]
    pub fn classify(&self, topic: &str, context: &str, source_url: &str) -> Category {
        let combined = format!("{topic} {context} {source_url}").to_lowercase();

        let mut best = Category::Research;
        let mut best_weight = 0usize;
        for (&category, keywords) in &self.table {
            let weight: usize = keywords
                .iter()
                .map(|k| occurrences(&combined, k))
                .sum();
            if weight > best_weight {
                best_weight = weight;
                best = category;
            }
        }

        if best_weight == 0 && BLOCKCHAIN_HINTS.iter().any(|h| combined.contains(h)) {
            best = Category::Midnight;
        }

        tracing::debug!(%best, confidence = best_weight, "category detected");
        best
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
fn occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut rest = haystack;
    while let Some(pos) = rest.find(needle) {
        count += 1;
        rest = &rest[pos + needle.len()..];
    }
    count
}
