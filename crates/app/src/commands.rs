use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use cstreet_core::Expenses;
use cstreet_import::{build_expenses, extract, reader_for};
use cstreet_storage::{fetch_expenses, insert_expenses, DbPool};

use crate::config::Config;
use crate::report;

/// Loads one statement file: reads the grid, extracts each configured
/// card, classifies, persists, and returns the rendered report.
///
/// Configuration problems (no entry for the file, unsupported extension,
/// bad window or column mapping) abort this file; they never corrupt what
/// is already stored.
pub async fn load(config: &Config, pool: &DbPool, path: &Path) -> Result<String> {
    if !path.is_file() {
        bail!("no such file: {}", path.display());
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("path has no usable file name: {}", path.display()))?;
    let file_config = config
        .file(file_name)
        .with_context(|| format!("no configuration found for file {file_name}"))?;

    let reader = reader_for(path)?;
    let grid = reader.read(path)?;

    let classifier = config.classifier();
    let tagger = config.tagger();

    let mut all = Expenses::default();
    for (card_name, card) in &file_config.cards {
        let transactions = extract(
            &grid,
            &card.column_mapping(),
            card.row_window(),
            &card.date_layout,
        )
        .with_context(|| format!("extracting card {card_name} from {file_name}"))?;
        info!(
            card = %card_name,
            count = transactions.len(),
            "extracted transactions"
        );
        let expenses = build_expenses(&transactions, &classifier, &tagger);
        all.classified.extend(expenses.classified);
        all.unclassified.extend(expenses.unclassified);
    }

    insert_expenses(pool, &all).await?;
    Ok(report::render(&all))
}

/// Renders everything currently stored.
pub async fn show_report(pool: &DbPool) -> Result<String> {
    let expenses = fetch_expenses(pool).await?;
    Ok(report::render(&expenses))
}

/// Writes the stored expenses to a flat CSV file.
pub async fn export(pool: &DbPool, out: &Path) -> Result<()> {
    let expenses = fetch_expenses(pool).await?;
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("cannot create export file {}", out.display()))?;
    writer.write_record(["Date", "Amount", "Class", "Tags"])?;
    for expense in expenses.merged() {
        let tags = expense
            .tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",");
        writer.write_record([
            expense.date.to_string(),
            // Two decimal places regardless of the stored scale, matching
            // the report rendering.
            format!("{:.2}", expense.amount.to_decimal()),
            expense.class,
            tags,
        ])?;
    }
    writer.flush()?;
    info!(path = %out.display(), count = expenses.len(), "expenses exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const STATEMENT: &str = "\
date,description,c,d,credit,refund,balance
18.03.2021,pizza1,x,y,5.0,,150.0
19.03.2021,rent march,x,y,3500.0,,150.0
20.03.2021,mystery,x,y,20.0,,150.0
";

    fn config_toml(db_path: &Path) -> String {
        format!(
            r#"
[database]
path = "{}"

[files."statement.csv".cards.main]
date_layout = "%d.%m.%Y"

[files."statement.csv".cards.main.columns]
date = 0
description = 1
credit = 4
refund = 5
balance = 6

[classes]
"Eating outside" = ["^pizza"]
Living = ["^rent"]

[tags]
Living = ["Crucial"]
"#,
            db_path.display()
        )
    }

    async fn setup() -> (tempfile::TempDir, Config, DbPool, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("expenses.db");
        let config_path = dir.path().join("cstreet.toml");
        fs::write(&config_path, config_toml(&db_path)).unwrap();
        let statement_path = dir.path().join("statement.csv");
        fs::write(&statement_path, STATEMENT).unwrap();

        let config = Config::load(&config_path).unwrap();
        let pool = cstreet_storage::create_db(&config.database.path)
            .await
            .unwrap();
        (dir, config, pool, statement_path)
    }

    #[tokio::test]
    async fn load_classifies_persists_and_reports() {
        let (_dir, config, pool, statement) = setup().await;
        let rendered = load(&config, &pool, &statement).await.unwrap();
        assert!(rendered.contains("Eating outside"));
        assert!(rendered.contains("Living"));
        assert!(rendered.contains("Crucial"));
        assert!(rendered.contains("WARNING: 1 expense(s)"));
        assert!(rendered.contains("mystery"));

        let stored = fetch_expenses(&pool).await.unwrap();
        assert_eq!(stored.classified.len(), 2);
        assert_eq!(stored.unclassified.len(), 1);
    }

    #[tokio::test]
    async fn load_rejects_unconfigured_file() {
        let (dir, config, pool, _statement) = setup().await;
        let other = dir.path().join("other.csv");
        fs::write(&other, STATEMENT).unwrap();
        let err = load(&config, &pool, &other).await.unwrap_err();
        assert!(err.to_string().contains("no configuration found"));
    }

    #[tokio::test]
    async fn load_rejects_missing_file() {
        let (dir, config, pool, _statement) = setup().await;
        let missing = dir.path().join("statement.csv.gone");
        let err = load(&config, &pool, &missing).await.unwrap_err();
        assert!(err.to_string().contains("no such file"));
    }

    #[tokio::test]
    async fn export_writes_flat_csv() {
        let (dir, config, pool, statement) = setup().await;
        load(&config, &pool, &statement).await.unwrap();

        let out = dir.path().join("export.csv");
        export(&pool, &out).await.unwrap();
        let contents = fs::read_to_string(&out).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "Date,Amount,Class,Tags");
        assert!(contents.contains("2021-03-18,5.00,Eating outside,"));
        assert!(contents.contains("2021-03-19,3500.00,Living,Crucial"));
    }
}
