use cstreet_core::{Expense, Expenses, Transaction};
use tracing::warn;

use crate::rules::{Classifier, Tagger};

/// Combines extracted transactions with the classifier and tagger.
///
/// A classifier miss is a degraded success: the raw description becomes
/// the class and the expense is routed to the unclassified list so the
/// report can warn about it. Tags are looked up against the resolved
/// class either way; against a raw description they normally come back
/// empty. Order within each list matches transaction order.
pub fn build_expenses(
    transactions: &[Transaction],
    classifier: &Classifier,
    tagger: &Tagger,
) -> Expenses {
    let mut expenses = Expenses::default();
    for tx in transactions {
        let matched = classifier.classify(&tx.description);
        let class = matched.unwrap_or(&tx.description).to_string();
        let tags = tagger.tags(&class);
        let expense = Expense {
            date: tx.date,
            amount: tx.signed_amount(),
            class,
            tags,
        };
        if matched.is_some() {
            expenses.classified.push(expense);
        } else {
            expenses.unclassified.push(expense);
        }
    }
    if !expenses.unclassified.is_empty() {
        warn!(
            count = expenses.unclassified.len(),
            "some transactions did not match any class"
        );
    }
    expenses
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cstreet_core::{Money, Tag};
    use std::collections::BTreeMap;

    fn tx(description: &str, credit_cents: i64) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2021, 3, 18).unwrap(),
            description: description.to_string(),
            credit: Money::from_cents(credit_cents),
            refund: Money::zero(),
            balance: Money::from_cents(15000),
        }
    }

    fn rules(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn classified_expense_round_trip() {
        let classifier = Classifier::new(&rules(&[("Eating outside", &["^pizza"])]));
        let expenses = build_expenses(&[tx("pizza1", 500)], &classifier, &Tagger::default());
        assert_eq!(expenses.unclassified.len(), 0);
        assert_eq!(
            expenses.classified,
            vec![Expense {
                date: NaiveDate::from_ymd_opt(2021, 3, 18).unwrap(),
                amount: Money::from_cents(500),
                class: "Eating outside".to_string(),
                tags: vec![],
            }]
        );
    }

    #[test]
    fn miss_falls_back_to_description_in_unclassified() {
        let classifier = Classifier::new(&rules(&[("Eating outside", &["^pizza"])]));
        let expenses = build_expenses(&[tx("haircut", 300)], &classifier, &Tagger::default());
        assert!(expenses.classified.is_empty());
        assert_eq!(expenses.unclassified[0].class, "haircut");
    }

    #[test]
    fn tags_come_from_the_resolved_class() {
        let classifier = Classifier::new(&rules(&[("Living", &["^rent"])]));
        let tagger = Tagger::new(&rules(&[("Living", &["Crucial"])]));
        let expenses = build_expenses(&[tx("rent march", 350_000)], &classifier, &tagger);
        assert_eq!(expenses.classified[0].tags, vec![Tag::crucial()]);
    }

    #[test]
    fn tagging_is_attempted_against_the_fallback_class() {
        // An unclassified expense still consults the tagger with its raw
        // description as the class.
        let tagger = Tagger::new(&rules(&[("^gym", &["Recurring"])]));
        let expenses = build_expenses(&[tx("gym membership", 2000)], &Classifier::default(), &tagger);
        assert_eq!(expenses.unclassified[0].tags, vec![Tag::recurring()]);
    }

    #[test]
    fn input_order_is_preserved_within_each_list() {
        let classifier = Classifier::new(&rules(&[("Eating outside", &["^pizza"])]));
        let txs = vec![
            tx("pizza0", 100),
            tx("mystery0", 200),
            tx("pizza1", 300),
            tx("mystery1", 400),
        ];
        let expenses = build_expenses(&txs, &classifier, &Tagger::default());
        let classified: Vec<i64> = expenses.classified.iter().map(|e| e.amount.to_cents()).collect();
        let unclassified: Vec<i64> = expenses
            .unclassified
            .iter()
            .map(|e| e.amount.to_cents())
            .collect();
        assert_eq!(classified, vec![100, 300]);
        assert_eq!(unclassified, vec![200, 400]);
    }

    #[test]
    fn refund_transactions_carry_negative_amounts() {
        let mut refund = tx("pizza refund", 0);
        refund.refund = Money::from_cents(500);
        let classifier = Classifier::new(&rules(&[("Eating outside", &["^pizza"])]));
        let expenses = build_expenses(&[refund], &classifier, &Tagger::default());
        assert_eq!(expenses.classified[0].amount.to_cents(), -500);
    }

    #[test]
    fn empty_inputs_build_empty_expenses() {
        let expenses = build_expenses(&[], &Classifier::default(), &Tagger::default());
        assert!(expenses.is_empty());
    }
}
