use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::money::Money;

/// Free-form label attached to a spending class. `Recurring` and `Crucial`
/// are conventions, not an exhaustive set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag(name.into())
    }

    pub fn recurring() -> Self {
        Tag::new("Recurring")
    }

    pub fn crucial() -> Self {
        Tag::new("Crucial")
    }

    /// Bucket key for expenses that carry no tags at all.
    pub fn none() -> Self {
        Tag::new("None")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reportable record derived from one transaction. `class` falls back to
/// the raw description when the classifier found no match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub date: NaiveDate,
    pub amount: Money,
    pub class: String,
    pub tags: Vec<Tag>,
}

/// All expenses built from one load, split by whether the classifier
/// recognised the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expenses {
    pub classified: Vec<Expense>,
    pub unclassified: Vec<Expense>,
}

impl Expenses {
    pub fn is_empty(&self) -> bool {
        self.classified.is_empty() && self.unclassified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classified.len() + self.unclassified.len()
    }

    /// Combined view of both lists, stably sorted by date. Derived on
    /// demand, never stored.
    pub fn merged(&self) -> Vec<Expense> {
        let mut all: Vec<Expense> = self
            .classified
            .iter()
            .chain(self.unclassified.iter())
            .cloned()
            .collect();
        all.sort_by_key(|e| e.date);
        all
    }

    pub fn total(&self) -> Money {
        self.merged().iter().map(|e| e.amount).sum()
    }

    /// Partition by month-of-year. Records from different years that share
    /// a month share a bucket; callers that need year-aware grouping must
    /// pre-filter by date range.
    pub fn group_by_month(&self) -> HashMap<Month, Vec<Expense>> {
        let mut groups: HashMap<Month, Vec<Expense>> = HashMap::new();
        for expense in self.merged() {
            let month = Month::try_from(expense.date.month() as u8).unwrap();
            groups.entry(month).or_default().push(expense);
        }
        groups
    }

    /// Partition by exact class string.
    pub fn group_by_class(&self) -> HashMap<String, Vec<Expense>> {
        let mut groups: HashMap<String, Vec<Expense>> = HashMap::new();
        for expense in self.merged() {
            groups
                .entry(expense.class.clone())
                .or_default()
                .push(expense);
        }
        groups
    }

    /// Fan-out by tag: an expense appears once per tag it carries, and
    /// untagged expenses land in the `Tag::none()` bucket.
    pub fn group_by_tag(&self) -> HashMap<Tag, Vec<Expense>> {
        let mut groups: HashMap<Tag, Vec<Expense>> = HashMap::new();
        for expense in self.merged() {
            if expense.tags.is_empty() {
                groups
                    .entry(Tag::none())
                    .or_default()
                    .push(expense);
            } else {
                for tag in &expense.tags {
                    groups
                        .entry(tag.clone())
                        .or_default()
                        .push(expense.clone());
                }
            }
        }
        groups
    }
}
