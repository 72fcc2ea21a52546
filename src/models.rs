use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Reserved fallback category. Always present, never matched by keyword.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Debit,
    Credit,
}

impl Flow {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Debit" => Some(Self::Debit),
            "Credit" => Some(Self::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "Debit",
            Self::Credit => "Credit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// 1-based row position within the uploaded batch.
    pub index: usize,
    pub date: NaiveDate,
    pub details: String,
    pub amount: f64,
    pub flow: Flow,
    pub category: String,
}

/// Calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: YearMonth,
    pub category: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Overspending,
    SpendingLess,
    WithinRange,
}

impl BudgetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overspending => "Overspending",
            Self::SpendingLess => "Spending Less",
            Self::WithinRange => "Within Range",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviationRow {
    pub category: String,
    pub last_month_amount: f64,
    pub average_amount: f64,
    /// `None` when the category's average is zero.
    pub deviation_pct: Option<f64>,
    pub suggested_budget: f64,
    pub status: BudgetStatus,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub category: String,
    pub predicted_amount: f64,
}

/// Outcome of an analysis that can legitimately come up empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Report<T> {
    InsufficientData,
    Rows(Vec<T>),
}

impl<T> Report<T> {
    pub fn rows(&self) -> &[T] {
        match self {
            Self::InsufficientData => &[],
            Self::Rows(rows) => rows,
        }
    }
}

/// Ordered category -> keyword mapping. Category order is insertion order and
/// decides which category wins when several match the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMap {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        Self {
            entries: vec![(UNCATEGORIZED.to_string(), Vec::new())],
        }
    }
}

impl CategoryMap {
    /// Build a map from stored entries, making sure the reserved category exists.
    pub fn from_entries(entries: Vec<(String, Vec<String>)>) -> Self {
        let mut map = Self { entries };
        if !map.contains(UNCATEGORIZED) {
            map.entries.insert(0, (UNCATEGORIZED.to_string(), Vec::new()));
        }
        map
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == category)
    }

    pub fn keywords(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, kws)| kws.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(name, kws)| (name.as_str(), kws.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn insert_category(&mut self, category: &str) {
        self.entries.push((category.to_string(), Vec::new()));
    }

    pub(crate) fn push_keyword(&mut self, category: &str, keyword: &str) -> bool {
        match self.entries.iter_mut().find(|(name, _)| name == category) {
            Some((_, kws)) => {
                kws.push(keyword.to_string());
                true
            }
            None => false,
        }
    }
}

// Serialized as a JSON object whose key order is the category order.
impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, kws) in &self.entries {
            map.serialize_entry(name, kws)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Vec<(String, Vec<String>)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to keyword list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, Vec<String>)> = Vec::new();
                while let Some((name, kws)) = access.next_entry::<String, Vec<String>>()? {
                    match entries.iter_mut().find(|(n, _)| *n == name) {
                        Some(existing) => existing.1 = kws,
                        None => entries.push((name, kws)),
                    }
                }
                Ok(entries)
            }
        }

        deserializer
            .deserialize_map(EntriesVisitor)
            .map(CategoryMap::from_entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_display_and_order() {
        let jan = YearMonth::of(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        let dec = YearMonth::of(NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(jan.to_string(), "2024-01");
        assert!(dec < jan);
    }

    #[test]
    fn test_flow_parse() {
        assert_eq!(Flow::parse(" Debit "), Some(Flow::Debit));
        assert_eq!(Flow::parse("Credit"), Some(Flow::Credit));
        assert_eq!(Flow::parse("debit"), None);
    }

    #[test]
    fn test_default_map_has_uncategorized() {
        let map = CategoryMap::default();
        assert_eq!(map.len(), 1);
        assert!(map.contains(UNCATEGORIZED));
    }

    #[test]
    fn test_from_entries_adds_uncategorized_first() {
        let map = CategoryMap::from_entries(vec![("Food".to_string(), vec!["cafe".to_string()])]);
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec![UNCATEGORIZED, "Food"]);
    }

    #[test]
    fn test_json_preserves_key_order() {
        let json = r#"{"Uncategorized": [], "Zoo": ["a"], "Bills": ["b", "c"], "Alpha": []}"#;
        let map: CategoryMap = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["Uncategorized", "Zoo", "Bills", "Alpha"]);
        assert_eq!(map.keywords("Bills").unwrap(), ["b", "c"]);

        let out = serde_json::to_string(&map).unwrap();
        assert_eq!(out, r#"{"Uncategorized":[],"Zoo":["a"],"Bills":["b","c"],"Alpha":[]}"#);
    }

    #[test]
    fn test_report_rows() {
        let empty: Report<ForecastRow> = Report::InsufficientData;
        assert!(empty.rows().is_empty());
    }
}
