//! Fuzzy company resolver — free-text provider name → registry entry.

use tracing::debug;

use crate::registry::{ProviderEntry, DEFAULT_REGISTRY};
use crate::similarity::{ratio, sorted_tokens};

/// Minimum score for a match to be accepted.
pub const MATCH_THRESHOLD: u8 = 70;

/// Resolves provider references against an injected registry.
///
/// Pure: the result depends only on the registry and the input. When several
/// keys share the best score, the one listed first in the registry wins.
#[derive(Debug, Clone)]
pub struct CompanyResolver {
    registry: &'static [ProviderEntry],
    /// Registry keys, uppercased and token-sorted once.
    keys: Vec<String>,
}

impl CompanyResolver {
    pub fn new(registry: &'static [ProviderEntry]) -> Self {
        let keys = registry
            .iter()
            .map(|e| sorted_tokens(&e.reference_name.trim().to_uppercase()))
            .collect();
        Self { registry, keys }
    }

    pub fn registry(&self) -> &'static [ProviderEntry] {
        self.registry
    }

    /// Highest-scoring entry and its score, regardless of threshold.
    pub fn best_match(&self, reference: &str) -> Option<(&'static ProviderEntry, u8)> {
        let normalized = reference.trim().to_uppercase();
        if normalized.is_empty() {
            return None;
        }
        let query = sorted_tokens(&normalized);

        let mut best: Option<(usize, u8)> = None;
        for (i, key) in self.keys.iter().enumerate() {
            let score = ratio(&query, key);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((i, score));
            }
        }
        best.map(|(i, score)| (&self.registry[i], score))
    }

    /// Entry for `reference` if its best score reaches [`MATCH_THRESHOLD`].
    pub fn resolve(&self, reference: &str) -> Option<&'static ProviderEntry> {
        let (entry, score) = self.best_match(reference)?;
        if score >= MATCH_THRESHOLD {
            debug!(
                "Resolved '{}' to '{}' (score {})",
                reference.trim(),
                entry.reference_name,
                score
            );
            Some(entry)
        } else {
            debug!(
                "No provider for '{}' (best '{}' at {})",
                reference.trim(),
                entry.reference_name,
                score
            );
            None
        }
    }
}

impl Default for CompanyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TIED_REGISTRY: &[ProviderEntry] = &[
        ProviderEntry {
            reference_name: "ALFA AB",
            legal_name: "ALFA AB LTDA.",
            tax_id: "1",
        },
        ProviderEntry {
            reference_name: "ALFA AC",
            legal_name: "ALFA AC LTDA.",
            tax_id: "2",
        },
    ];

    #[test]
    fn test_every_key_resolves_to_itself() {
        let resolver = CompanyResolver::default();
        for entry in DEFAULT_REGISTRY {
            let found = resolver.resolve(entry.reference_name).unwrap();
            assert_eq!(found, entry);
            assert_eq!(resolver.best_match(entry.reference_name).unwrap().1, 100);
        }
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let resolver = CompanyResolver::default();
        let found = resolver.resolve("  gf serviços ").unwrap();
        assert_eq!(found.legal_name, "GF SERVIÇOS ADMINISTRATIVOS LTDA.");
    }

    #[test]
    fn test_tolerates_spelling_and_order() {
        let resolver = CompanyResolver::default();
        assert_eq!(
            resolver.resolve("GF SERVICOS").unwrap().reference_name,
            "GF SERVIÇOS"
        );
        assert_eq!(resolver.resolve("Hill HR").unwrap().reference_name, "HR HILL");
    }

    #[test]
    fn test_blank_is_not_found() {
        let resolver = CompanyResolver::default();
        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("   ").is_none());
        assert!(resolver.best_match("  ").is_none());
    }

    #[test]
    fn test_below_threshold_is_not_found() {
        let resolver = CompanyResolver::default();
        let (_, score) = resolver.best_match("XYZ QWERTY").unwrap();
        assert!(score < MATCH_THRESHOLD);
        assert!(resolver.resolve("XYZ QWERTY").is_none());
    }

    #[test]
    fn test_deterministic() {
        let resolver = CompanyResolver::default();
        let first = resolver.best_match("norte financeiro");
        for _ in 0..5 {
            assert_eq!(resolver.best_match("norte financeiro"), first);
        }
    }

    #[test]
    fn test_tie_prefers_first_entry() {
        let resolver = CompanyResolver::new(TIED_REGISTRY);
        assert_eq!(ratio("ALFA AX", "AB ALFA"), ratio("ALFA AX", "AC ALFA"));
        let (entry, _) = resolver.best_match("ALFA AX").unwrap();
        assert_eq!(entry.tax_id, "1");
    }
}
