//! The validated set of tests for one build.
//!
//! A [`TestSet`] is the single value handed to both the dispatcher generator and the registrar. Building it runs the
//! normalizer and the mangler over every location and rejects the whole batch if two locations land on the same symbol,
//! so a dispatcher can never be generated for a set the registrar would disagree with.

use std::collections::HashMap;

use symtest_core::{CanonicalName, MangledSymbol, NamingRules, Platform};

use crate::errors::GenerateError;

/// One test: where it lives, its canonical name and its linker symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPair {
    pub location: String,
    pub canonical: CanonicalName,
    pub symbol: MangledSymbol,
}

/// Ordered, collision-free test pairs sharing one mangling convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSet {
    platform: Platform,
    pairs: Vec<TestPair>,
}

impl TestSet {
    /// Normalize and mangle every location, preserving input order.
    ///
    /// ## Errors
    ///
    /// - `GenerateError::Naming` for the first location that cannot be normalized.
    /// - `GenerateError::Collision` when two locations produce the same symbol. This also catches locations that only
    ///   differ in case, since both conventions fold case.
    #[tracing::instrument(skip_all, fields(platform = %platform))]
    pub fn build<I, S>(locations: I, rules: &NamingRules, platform: Platform) -> Result<Self, GenerateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pairs: Vec<TestPair> = Vec::new();
        let mut owners: HashMap<MangledSymbol, usize> = HashMap::new();

        for location in locations {
            let location = location.as_ref();
            let canonical = rules.normalize(location)?;
            let symbol = platform.mangle(&canonical);

            if let Some(&index) = owners.get(&symbol) {
                return Err(GenerateError::Collision {
                    symbol: symbol.into_string(),
                    first: pairs[index].location.clone(),
                    second: location.to_string(),
                });
            }

            tracing::debug!(location, canonical = %canonical, symbol = %symbol, "registered test");
            owners.insert(symbol.clone(), pairs.len());
            pairs.push(TestPair {
                location: location.to_string(),
                canonical,
                symbol,
            });
        }

        Ok(Self { platform, pairs })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn pairs(&self) -> &[TestPair] {
        &self.pairs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestPair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Look up the pair compiled under `symbol`.
    pub fn find_symbol(&self, symbol: &str) -> Option<&TestPair> {
        self.pairs.iter().find(|pair| pair.symbol.as_str() == symbol)
    }
}

impl<'a> IntoIterator for &'a TestSet {
    type Item = &'a TestPair;
    type IntoIter = std::slice::Iter<'a, TestPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
