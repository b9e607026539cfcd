use crate::args::TransactionArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::store::Store;
use crate::{Config, Result};

/// Records a new transaction in the data file.
///
/// A unique ID is generated for the transaction and returned along with the rest of its fields.
///
/// # Errors
/// - `ErrorType::Request` if the amount is negative or the date is empty.
/// - `ErrorType::Store` if the data file cannot be written.
pub async fn add(config: Config, args: TransactionArgs) -> Result<Out<Transaction>> {
    let symbol = config.preferences().currency_symbol.clone();
    let transaction = config
        .store()
        .insert(args.to_new_transaction())
        .await
        .pub_result(ErrorType::Store)?;

    let message = format!(
        "Added {} of {} on {} with ID {}",
        transaction.kind(),
        transaction.amount().display_with(&symbol),
        transaction.date(),
        transaction.id()
    );
    Ok(Out::new(message, transaction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, TransactionType};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_add() {
        let env = TestEnv::new().await;
        let args = TransactionArgs::new(TransactionType::Expense, 1500, "2024-01-20")
            .with_category("Labor")
            .with_description("Plastering");
        let out = add(env.config(), args).await.unwrap();
        let added = out.structure().unwrap();
        assert!(out.message().contains("₹1,500.00"));
        assert!(out.message().contains(added.id().as_str()));

        let listed = env.store().list().await.unwrap();
        assert_eq!(listed, vec![added.clone()]);
        assert_eq!(listed[0].amount(), Amount::from(1500));
    }

    #[tokio::test]
    async fn test_add_negative_amount() {
        let env = TestEnv::new().await;
        let args = TransactionArgs::new(TransactionType::Loan, -1, "2024-01-20");
        let err = add(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }
}
