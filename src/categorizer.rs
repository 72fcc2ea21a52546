use tracing::{debug, info};

use crate::error::{Result, SpendError};
use crate::models::{CategoryMap, Transaction, UNCATEGORIZED};
use crate::store::CategoryStore;

fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Assign every transaction a category by exact, case-insensitive match of its
/// details against the map's keywords. Categories are tried in map order and
/// the first match wins; no match leaves the transaction `Uncategorized`.
pub fn classify(transactions: &mut [Transaction], map: &CategoryMap) {
    let rules: Vec<(&str, Vec<String>)> = map
        .iter()
        .filter(|(name, keywords)| *name != UNCATEGORIZED && !keywords.is_empty())
        .map(|(name, keywords)| (name, keywords.iter().map(|k| fold(k)).collect()))
        .collect();

    for txn in transactions.iter_mut() {
        let details = fold(&txn.details);
        txn.category = rules
            .iter()
            .find(|(_, keywords)| keywords.contains(&details))
            .map_or(UNCATEGORIZED, |(name, _)| *name)
            .to_string();
    }
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub uncategorized: usize,
}

pub fn count_categorized(transactions: &[Transaction]) -> CategorizeResult {
    let uncategorized = transactions
        .iter()
        .filter(|t| t.category == UNCATEGORIZED)
        .count();
    CategorizeResult {
        categorized: transactions.len() - uncategorized,
        uncategorized,
    }
}

/// Owns the category map and writes every change straight through to its store.
pub struct Categorizer<S: CategoryStore> {
    map: CategoryMap,
    store: S,
}

impl<S: CategoryStore> Categorizer<S> {
    pub fn open(store: S) -> Result<Self> {
        let map = store.load()?;
        info!(categories = map.len(), "Loaded category map");
        Ok(Self { map, store })
    }

    pub fn map(&self) -> &CategoryMap {
        &self.map
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn classify(&self, transactions: &mut [Transaction]) -> CategorizeResult {
        classify(transactions, &self.map);
        let result = count_categorized(transactions);
        debug!(
            categorized = result.categorized,
            uncategorized = result.uncategorized,
            "Classified batch"
        );
        result
    }

    fn commit(&mut self, next: CategoryMap) -> Result<()> {
        self.store.save(&next)?;
        self.map = next;
        Ok(())
    }

    pub fn add_category(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SpendError::InvalidCategoryName(name.to_string()));
        }
        if self.map.contains(name) {
            return Err(SpendError::DuplicateCategory(name.to_string()));
        }
        let mut next = self.map.clone();
        next.insert_category(name);
        self.commit(next)?;
        info!(category = name, "Added category");
        Ok(())
    }

    /// Record `keyword` for `category`. Returns `Ok(false)` when there is
    /// nothing to learn: a blank keyword, one already stored verbatim, or a
    /// keyword aimed at the reserved fallback category.
    pub fn learn(&mut self, category: &str, keyword: &str) -> Result<bool> {
        let Some(existing) = self.map.keywords(category) else {
            return Err(SpendError::UnknownCategory(category.to_string()));
        };
        let keyword = keyword.trim();
        // Containment is case-sensitive even though matching is not.
        if category == UNCATEGORIZED || keyword.is_empty() || existing.iter().any(|k| k == keyword) {
            return Ok(false);
        }
        let mut next = self.map.clone();
        next.push_keyword(category, keyword);
        self.commit(next)?;
        debug!(category, keyword, "Learned keyword");
        Ok(true)
    }

    /// Apply user corrections `(row index, new category)`. Each row whose
    /// category actually changes teaches the map its details. Every override
    /// is validated before anything is changed. Returns the number of rows
    /// changed.
    pub fn recategorize(
        &mut self,
        transactions: &mut [Transaction],
        overrides: &[(usize, String)],
    ) -> Result<usize> {
        for (index, category) in overrides {
            if !transactions.iter().any(|t| t.index == *index) {
                return Err(SpendError::UnknownRow(*index));
            }
            if !self.map.contains(category) {
                return Err(SpendError::UnknownCategory(category.clone()));
            }
        }

        let mut changed = 0usize;
        for (index, category) in overrides {
            let Some(txn) = transactions.iter_mut().find(|t| t.index == *index) else {
                continue;
            };
            if txn.category == *category {
                continue;
            }
            txn.category = category.clone();
            let details = txn.details.clone();
            self.learn(category, &details)?;
            changed += 1;
        }
        info!(changed, "Applied category overrides");
        Ok(changed)
    }
}
