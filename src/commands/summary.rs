use crate::aggregate::FilteredView;
use crate::args::FilterArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Amount;
use crate::store::Store;
use crate::{Config, Result};

/// Totals, monthly sums and the expense breakdown by category for the transactions that match
/// the filter.
///
/// # Errors
/// - `ErrorType::Request` if the filter is invalid.
/// - `ErrorType::Store` if the data file cannot be read.
pub async fn summary(config: Config, args: FilterArgs) -> Result<Out<FilteredView>> {
    let criteria = args.criteria().pub_result(ErrorType::Request)?;
    let all = config.store().list().await.pub_result(ErrorType::Store)?;
    let view = FilteredView::compute(&all, &criteria);

    let display = render(&view, &config.preferences().currency_symbol);
    let message = format!(
        "Summarized {} of {} transactions",
        view.transactions.len(),
        all.len()
    );
    Ok(Out::new(message, view).with_display(display))
}

fn render(view: &FilteredView, symbol: &str) -> String {
    let money = |a: Amount| a.display_with(symbol);
    let totals = &view.totals;
    let mut lines = vec![
        format!("Total loan:     {}", money(totals.total_loan)),
        format!("Total expense:  {}", money(totals.total_expense)),
        format!("Remaining:      {}", money(totals.remaining)),
    ];

    if !view.monthly_series.is_empty() {
        lines.push(String::new());
        lines.push("By month:".to_string());
        lines.extend(view.monthly_series.iter().map(|bucket| {
            format!(
                "  {:<10} loan {:>14}   expense {:>14}",
                bucket.label,
                money(bucket.loan),
                money(bucket.expense)
            )
        }));
    }

    if !view.category_breakdown.is_empty() {
        lines.push(String::new());
        lines.push("Expenses by category:".to_string());
        let width = view
            .category_breakdown
            .keys()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or_default();
        lines.extend(
            view.category_breakdown
                .iter()
                .map(|(category, amount)| format!("  {category:<width$}  {:>14}", money(*amount))),
        );
    }
    lines.join("\n")
}
