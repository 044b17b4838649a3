use comfy_table::Table;

use cstreet_core::{Expense, Expenses, Money, Tag};

/// Renders the merged expense table with a footer total. When any expense
/// went unclassified, a warning and a second table listing those records
/// follow, so degraded classifications are never hidden.
pub fn render(expenses: &Expenses) -> String {
    let mut out = expense_table("Expenses", &expenses.merged(), expenses.total());
    if !expenses.unclassified.is_empty() {
        out.push_str(&format!(
            "\n\nWARNING: {} expense(s) did not match any class; their raw descriptions are used instead.\n",
            expenses.unclassified.len()
        ));
        let unclassified_total = expenses.unclassified.iter().map(|e| e.amount).sum();
        out.push_str(&expense_table(
            "Unclassified",
            &expenses.unclassified,
            unclassified_total,
        ));
    }
    out
}

fn expense_table(title: &str, rows: &[Expense], total: Money) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Amount", "Class", "Tags"]);
    for (i, expense) in rows.iter().enumerate() {
        let tags = expense
            .tags
            .iter()
            .map(Tag::as_str)
            .collect::<Vec<_>>()
            .join(",");
        table.add_row(vec![
            i.to_string(),
            expense.date.to_string(),
            expense.amount.to_string(),
            expense.class.clone(),
            tags,
        ]);
    }
    table.add_row(vec![
        String::new(),
        "Total".to_string(),
        total.to_string(),
        String::new(),
        String::new(),
    ]);
    format!("{title}\n{table}")
}
