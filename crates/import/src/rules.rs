use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use cstreet_core::Tag;

struct Rule<V> {
    regex: Option<Regex>,
    value: V,
}

/// Ordered pattern → value lookup shared by the classifier and the tagger.
///
/// Resolution is exact-match first, then the first rule in insertion order
/// whose pattern matches the key as an unanchored regex. The ordered scan
/// replaces map-iteration fallback, so overlapping patterns resolve the
/// same way on every run. A pattern that fails to compile never matches
/// and never aborts a scan.
pub struct RuleSet<V> {
    exact: HashMap<String, usize>,
    rules: Vec<Rule<V>>,
}

impl<V> RuleSet<V> {
    pub fn new(pairs: impl IntoIterator<Item = (String, V)>) -> Self {
        let mut exact: HashMap<String, usize> = HashMap::new();
        let mut rules: Vec<Rule<V>> = Vec::new();
        for (pattern, value) in pairs {
            let regex = Regex::new(&pattern).ok();
            // Last write wins when the same pattern appears twice: the
            // superseded rule is replaced in place, so the ordered scan
            // never sees it either.
            if let Some(&idx) = exact.get(&pattern) {
                rules[idx] = Rule { regex, value };
            } else {
                exact.insert(pattern, rules.len());
                rules.push(Rule { regex, value });
            }
        }
        RuleSet { exact, rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn resolve(&self, key: &str) -> Option<&V> {
        if let Some(&idx) = self.exact.get(key) {
            return Some(&self.rules[idx].value);
        }
        self.rules
            .iter()
            .find(|r| r.regex.as_ref().is_some_and(|re| re.is_match(key)))
            .map(|r| &r.value)
    }
}

impl<V> Default for RuleSet<V> {
    fn default() -> Self {
        RuleSet::new(std::iter::empty())
    }
}

/// Maps a transaction description to a spending class.
#[derive(Default)]
pub struct Classifier {
    rules: RuleSet<String>,
}

impl Classifier {
    /// Inverts `class → [description patterns]` into `pattern → class`.
    /// Pattern uniqueness across classes is assumed; the exact-match index
    /// keeps the last class written for a duplicated pattern.
    pub fn new(classes: &BTreeMap<String, Vec<String>>) -> Self {
        let pairs = classes.iter().flat_map(|(class, patterns)| {
            patterns.iter().map(move |p| (p.clone(), class.clone()))
        });
        Classifier {
            rules: RuleSet::new(pairs),
        }
    }

    /// `None` means unclassified. That is a degraded success, not a
    /// failure: callers fall back to the raw description as the class.
    pub fn classify(&self, description: &str) -> Option<&str> {
        self.rules.resolve(description).map(String::as_str)
    }
}

/// Attaches tags to a resolved spending class.
#[derive(Default)]
pub struct Tagger {
    rules: RuleSet<Vec<Tag>>,
}

impl Tagger {
    pub fn new(tags_by_class: &BTreeMap<String, Vec<String>>) -> Self {
        let pairs = tags_by_class.iter().map(|(class, tags)| {
            let tags: Vec<Tag> = tags.iter().cloned().map(Tag::new).collect();
            (class.clone(), tags)
        });
        Tagger {
            rules: RuleSet::new(pairs),
        }
    }

    /// No match is never an error: unknown classes carry no tags.
    pub fn tags(&self, class: &str) -> Vec<Tag> {
        self.rules.resolve(class).cloned().unwrap_or_default()
    }
}
