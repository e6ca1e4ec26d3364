//! Fixed category set partitioning the knowledge base
//!
//! Categories are a closed enumeration: each maps to exactly one folder
//! under the store root. Unknown names are rejected with
//! [`StoreError::InvalidCategory`], never corrected or created on the fly.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed knowledge base categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Midnight blockchain documentation
    Midnight,
    /// Cardano technical specs
    Cardano,
    /// Healthcare standards and regulations
    Healthcare,
    /// Zero-knowledge proof research
    Zkproofs,
    /// Competitive analysis
    Competitors,
    /// System architecture and design
    Architecture,
    /// Smart contract patterns and code
    SmartContracts,
    /// Raw research findings (catch-all)
    Research,
}

impl Category {
    /// All categories in their canonical folder order
    pub const ALL: [Category; 8] = [
        Category::Midnight,
        Category::Cardano,
        Category::Healthcare,
        Category::Zkproofs,
        Category::Competitors,
        Category::Architecture,
        Category::SmartContracts,
        Category::Research,
    ];

    /// Folder name under the store root
    #[inline]
    #[must_use]
    pub fn folder(&self) -> &'static str {
        match self {
            Category::Midnight => "midnight",
            Category::Cardano => "cardano",
            Category::Healthcare => "healthcare",
            Category::Zkproofs => "zkproofs",
            Category::Competitors => "competitors",
            Category::Architecture => "architecture",
            Category::SmartContracts => "smart_contracts",
            Category::Research => "research",
        }
    }

    /// Human-readable description, used in the index and stats output
    #[inline]
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Category::Midnight => "Midnight blockchain documentation",
            Category::Cardano => "Cardano technical specs",
            Category::Healthcare => "Healthcare standards and regulations",
            Category::Zkproofs => "Zero-knowledge proof research",
            Category::Competitors => "Competitive analysis",
            Category::Architecture => "System architecture and design",
            Category::SmartContracts => "Smart contract patterns and code",
            Category::Research => "Raw research findings",
        }
    }

    /// Heading used for the per-category index sections
    #[must_use]
    pub fn heading(&self) -> String {
        let mut out = String::new();
        for (i, word) in self.folder().split('_').enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        out
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.folder() == s)
            .copied()
            .ok_or_else(|| StoreError::InvalidCategory(s.to_string()))
    }
}
