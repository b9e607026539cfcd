use crate::aggregate;
use crate::args::{ListArgs, OutputFormat};
use crate::commands::{plural, to_csv, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::store::Store;
use crate::{Config, Result};
use anyhow::Context;
use std::fmt::{Debug, Display, Formatter};

/// Transactions rendered in the requested output format.
#[derive(Clone)]
pub enum Rows {
    /// A pretty-printed JSON array.
    Json(String),
    /// Aligned columns with a header row.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Rows {
    /// Renders `transactions` as `format`, showing amounts with `currency_symbol` in a table.
    pub fn render(
        transactions: &[Transaction],
        format: OutputFormat,
        currency_symbol: &str,
    ) -> Result<Self> {
        Ok(match format {
            OutputFormat::Json => Rows::Json(
                serde_json::to_string_pretty(transactions)
                    .context("Unable to serialize transactions")?,
            ),
            OutputFormat::Table => Rows::Table(table(transactions, currency_symbol)),
            OutputFormat::Csv => Rows::Csv(to_csv(transactions)?),
        })
    }
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(s) => write!(f, "Rows::Json({} chars)", s.len()),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(s) | Rows::Table(s) | Rows::Csv(s) => write!(f, "{}", s),
        }
    }
}

/// Lists the transactions that match the filter, newest first, and renders them to stdout.
///
/// # Errors
/// - `ErrorType::Request` if the filter is invalid.
/// - `ErrorType::Store` if the data file cannot be read.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Vec<Transaction>>> {
    let criteria = args.filter().criteria().pub_result(ErrorType::Request)?;
    let all = config.store().list().await.pub_result(ErrorType::Store)?;
    let transactions = newest_first(aggregate::filter(&all, &criteria));

    let rows = Rows::render(
        &transactions,
        args.format(),
        &config.preferences().currency_symbol,
    )
    .pub_result(ErrorType::Request)?;
    let message = format!(
        "Found {} transaction{} of {}",
        transactions.len(),
        plural(transactions.len()),
        all.len()
    );
    Ok(Out::new(message, transactions).with_display(rows.to_string()))
}

/// Sorts by date, newest first. Transactions with a malformed date go last and otherwise keep
/// their order.
pub fn newest_first(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by(|a, b| b.date().date().cmp(&a.date().date()));
    transactions
}

const HEADERS: [&str; 6] = ["ID", "Date", "Type", "Category", "Amount", "Description"];

fn table(transactions: &[Transaction], currency_symbol: &str) -> String {
    let rows: Vec<[String; 6]> = transactions
        .iter()
        .map(|t| {
            [
                t.id().to_string(),
                t.date().to_string(),
                t.kind().to_string(),
                t.category().unwrap_or_default().to_string(),
                t.amount().display_with(currency_symbol),
                t.description().to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(HEADERS.map(String::from), &widths));
    lines.push(line(widths.map(|w| "-".repeat(w)), &widths));
    for row in rows {
        lines.push(line(row, &widths));
    }
    lines.join("\n")
}

/// Joins cells padded to `widths`. The amount column is right-aligned.
fn line(cells: [String; 6], widths: &[usize; 6]) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &w))| {
            if i == 4 {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::FilterArgs;
    use crate::model::{NewTransaction, TransactionType};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_list_newest_first() {
        let env = TestEnv::new().await;
        let inserted = env.insert_sample().await;

        let out = list(env.config(), ListArgs::default()).await.unwrap();
        let ids: Vec<_> = out.structure().unwrap().iter().map(|t| t.id()).collect();
        assert_eq!(
            ids,
            vec![inserted[2].id(), inserted[1].id(), inserted[0].id()]
        );
        assert_eq!(out.message(), "Found 3 transactions of 3");
    }

    #[tokio::test]
    async fn test_list_filtered_table() {
        let env = TestEnv::new().await;
        env.insert_sample().await;

        let args = ListArgs::new(
            FilterArgs::new(Some(1), Some(2024), Some("cement".to_string())),
            OutputFormat::Table,
        );
        let out = list(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 1);
        let display = out.display().unwrap();
        let lines: Vec<_> = display.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[2].contains("Materials"));
        assert!(lines[2].contains("₹500.00"));
    }

    #[tokio::test]
    async fn test_list_json_and_csv() {
        let env = TestEnv::new().await;
        env.insert_sample().await;

        let json = list(
            env.config(),
            ListArgs::new(FilterArgs::default(), OutputFormat::Json),
        )
        .await
        .unwrap();
        let parsed: Vec<Transaction> = serde_json::from_str(json.display().unwrap()).unwrap();
        assert_eq!(parsed.len(), 3);

        let csv = list(
            env.config(),
            ListArgs::new(FilterArgs::new(Some(2), None, None), OutputFormat::Csv),
        )
        .await
        .unwrap();
        let text = csv.display().unwrap();
        assert!(text.starts_with("ID,Type,Category,Amount,Date,Description"));
        assert!(text.contains(",expense,Labor,200,2024-02-05,Mason wages"));
    }

    #[test]
    fn test_newest_first_puts_malformed_last() {
        let records = vec![
            NewTransaction::new(TransactionType::Loan, 1, "someday"),
            NewTransaction::new(TransactionType::Loan, 2, "2024-01-01"),
            NewTransaction::new(TransactionType::Loan, 3, "not a date"),
            NewTransaction::new(TransactionType::Loan, 4, "2024-03-01"),
        ];
        let transactions: Vec<_> = records
            .into_iter()
            .enumerate()
            .map(|(i, r)| Transaction::new(i.to_string().parse().unwrap(), r).unwrap())
            .collect();
        let sorted = newest_first(transactions);
        let ids: Vec<_> = sorted.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "0", "2"]);
    }
}
