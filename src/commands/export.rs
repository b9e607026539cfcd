use crate::aggregate;
use crate::args::ExportArgs;
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::store::Store;
use crate::{utils, Config, Result};
use anyhow::{anyhow, Context};
use std::path::PathBuf;

const CSV_HEADERS: [&str; 6] = ["ID", "Type", "Category", "Amount", "Date", "Description"];

/// Writes `transactions` as CSV, one row per transaction in the given order, with a header row.
/// Amounts are plain numbers without a currency symbol or separators.
pub fn to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .context("Unable to write the CSV header")?;
    for t in transactions {
        let amount = t.amount().value().to_string();
        writer
            .write_record([
                t.id().as_str(),
                t.kind().as_str(),
                t.category().unwrap_or_default(),
                amount.as_str(),
                t.date().raw(),
                t.description(),
            ])
            .with_context(|| format!("Unable to write transaction {} as CSV", t.id()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish the CSV data: {}", e.error()))?;
    String::from_utf8(bytes).context("The CSV data is not valid UTF-8")
}

/// Writes the transactions that match the filter to a CSV file, in the order they are stored.
///
/// # Errors
/// - `ErrorType::Request` if the filter is invalid.
/// - `ErrorType::Store` if the data file cannot be read.
/// - `ErrorType::Export` if the CSV file cannot be written.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let criteria = args.filter().criteria().pub_result(ErrorType::Request)?;
    let all = config.store().list().await.pub_result(ErrorType::Store)?;
    let transactions = aggregate::filter(&all, &criteria);

    let data = to_csv(&transactions).pub_result(ErrorType::Export)?;
    let output = args.output().to_path_buf();
    utils::write(&output, data)
        .await
        .pub_result(ErrorType::Export)?;

    let message = format!(
        "Exported {} transaction{} to '{}'",
        transactions.len(),
        plural(transactions.len()),
        output.display()
    );
    Ok(Out::new(message, output))
}
