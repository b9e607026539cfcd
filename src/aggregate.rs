//! Filtering and aggregation of transactions for listings, summary cards and charts.
//!
//! Everything here is a pure function of its inputs. The caller hands in a borrowed slice, which
//! is the snapshot the whole computation works on, and gets back owned results. Nothing here
//! fails: records that cannot take part in a date-based step (because their date is malformed)
//! are left out of that step only.

use crate::model::{Amount, FilterCriteria, Transaction, TransactionType};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The key under which expenses without a category are summed.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Loan and expense totals for a set of transactions.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_loan: Amount,
    pub total_expense: Amount,
    /// `total_loan - total_expense`, which goes negative when spending exceeds borrowing.
    pub remaining: Amount,
}

/// The loan and expense sums for one calendar month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    /// 1-indexed.
    pub month: u32,
    /// e.g. `Jan 2024`
    pub label: String,
    pub loan: Amount,
    pub expense: Amount,
}

/// Everything a presentation layer needs for one set of filter criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredView {
    pub transactions: Vec<Transaction>,
    pub totals: Totals,
    pub monthly_series: Vec<MonthBucket>,
    pub category_breakdown: BTreeMap<String, Amount>,
}

impl FilteredView {
    /// Filters `transactions` by `criteria` and aggregates the result.
    pub fn compute(transactions: &[Transaction], criteria: &FilterCriteria) -> Self {
        let transactions = filter(transactions, criteria);
        let totals = compute_totals(&transactions);
        let monthly_series = group_by_month(&transactions);
        let category_breakdown = group_by_category(&transactions);
        Self {
            transactions,
            totals,
            monthly_series,
            category_breakdown,
        }
    }
}

/// Returns the transactions that match every criterion that is set, in their original order.
pub fn filter(transactions: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    let needle = criteria.search_term().map(str::to_lowercase);
    transactions
        .iter()
        .filter(|t| matches_month(t, criteria.month()))
        .filter(|t| matches_year(t, criteria.year()))
        .filter(|t| matches_search(t, needle.as_deref()))
        .cloned()
        .collect()
}

fn matches_month(t: &Transaction, month: Option<u32>) -> bool {
    match month {
        None => true,
        Some(m) => t.date().month() == Some(m),
    }
}

fn matches_year(t: &Transaction, year: Option<i32>) -> bool {
    match year {
        None => true,
        Some(y) => t.date().year() == Some(y),
    }
}

/// `needle` must already be lowercase.
fn matches_search(t: &Transaction, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    t.description().to_lowercase().contains(needle)
        || t
            .category()
            .is_some_and(|c| c.to_lowercase().contains(needle))
        || t.kind().as_str().contains(needle)
}

/// Sums the amounts of the transactions of type `kind`.
pub fn sum_by_type(transactions: &[Transaction], kind: TransactionType) -> Amount {
    transactions
        .iter()
        .filter(|t| t.kind() == kind)
        .map(Transaction::amount)
        .sum()
}

pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let total_loan = sum_by_type(transactions, TransactionType::Loan);
    let total_expense = sum_by_type(transactions, TransactionType::Expense);
    Totals {
        total_loan,
        total_expense,
        remaining: total_loan - total_expense,
    }
}

/// Buckets transactions by calendar month, in chronological order. Transactions with a malformed
/// date are skipped.
pub fn group_by_month(transactions: &[Transaction]) -> Vec<MonthBucket> {
    // Keyed by the first of the month so that iteration order is chronological.
    let mut buckets: BTreeMap<NaiveDate, (Amount, Amount)> = BTreeMap::new();
    for t in transactions {
        let Some(first) = t.date().date().and_then(|d| d.with_day(1)) else {
            continue;
        };
        let (loan, expense) = buckets.entry(first).or_default();
        match t.kind() {
            TransactionType::Loan => *loan = *loan + t.amount(),
            TransactionType::Expense => *expense = *expense + t.amount(),
        }
    }

    buckets
        .into_iter()
        .map(|(first, (loan, expense))| MonthBucket {
            year: first.year(),
            month: first.month(),
            label: first.format("%b %Y").to_string(),
            loan,
            expense,
        })
        .collect()
}

/// Sums expenses by category. Loans are left out entirely, and expenses without a category are
/// summed under `UNCATEGORIZED`.
pub fn group_by_category(transactions: &[Transaction]) -> BTreeMap<String, Amount> {
    let mut categories: BTreeMap<String, Amount> = BTreeMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.kind() == TransactionType::Expense)
    {
        let key = t.category().unwrap_or(UNCATEGORIZED);
        let sum = categories.entry(key.to_string()).or_default();
        *sum = *sum + t.amount();
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTransaction, TransactionId};
    use std::str::FromStr;

    fn txn(id: &str, kind: TransactionType, amount: i64, date: &str, category: &str) -> Transaction {
        let mut fields = NewTransaction::new(kind, amount, date);
        if !category.is_empty() {
            fields = fields.with_category(category);
        }
        Transaction::new(TransactionId::from_str(id).unwrap(), fields).unwrap()
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            txn("1", TransactionType::Loan, 1000, "2024-01-15", "Loan"),
            txn("2", TransactionType::Expense, 300, "2024-01-20", "Materials"),
            txn("3", TransactionType::Expense, 200, "2024-02-05", "Labor"),
        ]
    }

    fn with_malformed() -> Vec<Transaction> {
        let mut t = scenario();
        t.push(txn("4", TransactionType::Expense, 50, "not-a-date", "X"));
        t
    }

    fn ids(transactions: &[Transaction]) -> Vec<&str> {
        transactions.iter().map(|t| t.id().as_str()).collect()
    }

    #[test]
    fn test_scenario_totals() {
        let totals = compute_totals(&scenario());
        assert_eq!(totals.total_loan, Amount::from(1000));
        assert_eq!(totals.total_expense, Amount::from(500));
        assert_eq!(totals.remaining, Amount::from(500));
    }

    #[test]
    fn test_scenario_group_by_month() {
        let buckets = group_by_month(&scenario());
        assert_eq!(
            buckets,
            vec![
                MonthBucket {
                    year: 2024,
                    month: 1,
                    label: "Jan 2024".to_string(),
                    loan: Amount::from(1000),
                    expense: Amount::from(300),
                },
                MonthBucket {
                    year: 2024,
                    month: 2,
                    label: "Feb 2024".to_string(),
                    loan: Amount::ZERO,
                    expense: Amount::from(200),
                },
            ]
        );
    }

    #[test]
    fn test_scenario_group_by_category() {
        let categories = group_by_category(&scenario());
        let expected: BTreeMap<String, Amount> = [
            ("Materials".to_string(), Amount::from(300)),
            ("Labor".to_string(), Amount::from(200)),
        ]
        .into_iter()
        .collect();
        assert_eq!(categories, expected);
    }

    #[test]
    fn test_filter_by_month() {
        let criteria = FilterCriteria::default().with_month(1);
        assert_eq!(ids(&filter(&scenario(), &criteria)), vec!["1", "2"]);
    }

    #[test]
    fn test_filter_search_matches_category_case_insensitively() {
        let criteria = FilterCriteria::default().with_search("labor");
        assert_eq!(ids(&filter(&scenario(), &criteria)), vec!["3"]);
    }

    #[test]
    fn test_filter_search_matches_description_and_type() {
        let mut t = scenario();
        t.push(Transaction::new(
            TransactionId::from_str("5").unwrap(),
            NewTransaction::new(TransactionType::Expense, 20, "2024-03-01")
                .with_description("Cement bags"),
        )
        .unwrap());
        let by_description = FilterCriteria::default().with_search("CEMENT");
        assert_eq!(ids(&filter(&t, &by_description)), vec!["5"]);
        let by_type = FilterCriteria::default().with_search("Loan");
        assert_eq!(ids(&filter(&t, &by_type)), vec!["1"]);
    }

    #[test]
    fn test_filter_combines_criteria() {
        let criteria = FilterCriteria::default()
            .with_month(1)
            .with_year(2024)
            .with_search("expense");
        assert_eq!(ids(&filter(&scenario(), &criteria)), vec!["2"]);
        let wrong_year = FilterCriteria::default().with_month(1).with_year(2023);
        assert!(filter(&scenario(), &wrong_year).is_empty());
    }

    #[test]
    fn test_filter_without_criteria_is_identity() {
        let t = with_malformed();
        assert_eq!(filter(&t, &FilterCriteria::default()), t);
    }

    #[test]
    fn test_filter_is_a_subset() {
        let t = with_malformed();
        let criteria_set = [
            FilterCriteria::default().with_month(2),
            FilterCriteria::default().with_year(2024),
            FilterCriteria::default().with_search("a"),
            FilterCriteria::default().with_month(13),
        ];
        for criteria in &criteria_set {
            for found in filter(&t, criteria) {
                assert!(t.contains(&found));
            }
        }
    }

    #[test]
    fn test_malformed_date_excluded_from_date_filters_only() {
        let t = with_malformed();
        let by_year = filter(&t, &FilterCriteria::default().with_year(2024));
        assert_eq!(ids(&by_year), vec!["1", "2", "3"]);
        let all = filter(&t, &FilterCriteria::default());
        assert!(ids(&all).contains(&"4"));
        // "x" also hits every "expense", which is fine; the point is that 4 is still searchable.
        let by_search = filter(&t, &FilterCriteria::default().with_search("x"));
        assert_eq!(ids(&by_search), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_malformed_date_excluded_from_months() {
        let buckets = group_by_month(&with_malformed());
        assert_eq!(buckets.len(), 2);
        let expense: Amount = buckets.iter().map(|b| b.expense).sum();
        assert_eq!(expense, Amount::from(500));
    }

    #[test]
    fn test_sum_by_type_empty() {
        assert_eq!(sum_by_type(&[], TransactionType::Loan), Amount::ZERO);
        assert_eq!(sum_by_type(&[], TransactionType::Expense), Amount::ZERO);
    }

    #[test]
    fn test_empty_input() {
        let view = FilteredView::compute(&[], &FilterCriteria::default());
        assert!(view.transactions.is_empty());
        assert_eq!(view.totals, Totals::default());
        assert!(view.monthly_series.is_empty());
        assert!(view.category_breakdown.is_empty());
    }

    #[test]
    fn test_remaining_may_be_negative() {
        let t = vec![
            txn("1", TransactionType::Loan, 100, "2024-01-01", ""),
            txn("2", TransactionType::Expense, 250, "2024-01-02", ""),
        ];
        let totals = compute_totals(&t);
        assert_eq!(totals.remaining, Amount::from(-150));
        assert_eq!(totals.remaining, totals.total_loan - totals.total_expense);
    }

    #[test]
    fn test_months_sorted_chronologically_across_years() {
        // Label order would put "Apr" first and mix the years.
        let t = vec![
            txn("1", TransactionType::Expense, 1, "2024-04-10", ""),
            txn("2", TransactionType::Expense, 1, "2023-12-31", ""),
            txn("3", TransactionType::Loan, 1, "2024-01-01", ""),
            txn("4", TransactionType::Expense, 1, "2023-02-14", ""),
        ];
        let labels: Vec<String> = group_by_month(&t).into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Feb 2023", "Dec 2023", "Jan 2024", "Apr 2024"]);
    }

    #[test]
    fn test_group_by_category_excludes_loans_and_zero_keys() {
        let t = vec![
            txn("1", TransactionType::Loan, 1000, "2024-01-15", "Loan"),
            txn("2", TransactionType::Expense, 0, "2024-01-15", "Equipment"),
            txn("3", TransactionType::Expense, 75, "2024-01-15", "Materials"),
        ];
        let categories = group_by_category(&t);
        assert!(!categories.contains_key("Loan"));
        assert!(categories.contains_key("Equipment"));
        assert_eq!(categories.len(), 2);
    }

    #[test]
    fn test_group_by_category_uncategorized() {
        let t = vec![
            txn("1", TransactionType::Expense, 10, "2024-01-15", ""),
            txn("2", TransactionType::Expense, 15, "2024-01-16", ""),
            txn("3", TransactionType::Expense, 5, "2024-01-16", "Labor"),
        ];
        let categories = group_by_category(&t);
        assert_eq!(categories.get(UNCATEGORIZED), Some(&Amount::from(25)));
        assert_eq!(categories.get("Labor"), Some(&Amount::from(5)));
    }

    #[test]
    fn test_filtered_view_aggregates_filtered_set() {
        let view = FilteredView::compute(&scenario(), &FilterCriteria::default().with_month(2));
        assert_eq!(ids(&view.transactions), vec!["3"]);
        assert_eq!(view.totals.total_loan, Amount::ZERO);
        assert_eq!(view.totals.total_expense, Amount::from(200));
        assert_eq!(view.monthly_series.len(), 1);
        assert_eq!(view.category_breakdown.len(), 1);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let huge = Amount::from_str("50000000000000000000000000000").unwrap();
        let expense = |id: &str| {
            let fields = NewTransaction::new(TransactionType::Expense, huge, "2024-03-01")
                .with_category("Materials");
            Transaction::new(TransactionId::from_str(id).unwrap(), fields).unwrap()
        };
        let view = FilteredView::compute(&[expense("1"), expense("2")], &FilterCriteria::default());
        let max = Amount::new(rust_decimal::Decimal::MAX);
        let min = Amount::new(rust_decimal::Decimal::MIN);
        assert_eq!(view.totals.total_expense, max);
        assert_eq!(view.totals.remaining, min);
        assert_eq!(view.monthly_series[0].expense, max);
        assert_eq!(view.category_breakdown.get("Materials"), Some(&max));
    }
}
