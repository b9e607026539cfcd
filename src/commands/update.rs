use crate::args::UpdateArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::store::Store;
use crate::{Config, Result};

/// Replaces every field of a transaction except its ID.
///
/// # Errors
/// - `ErrorType::NotFound` if no transaction has the given ID.
/// - `ErrorType::Request` if the new fields are invalid.
/// - `ErrorType::Store` if the data file cannot be written.
pub async fn update(config: Config, args: UpdateArgs) -> Result<Out<Transaction>> {
    let updated = config
        .store()
        .update(args.id(), args.fields().to_new_transaction())
        .await
        .pub_result(ErrorType::Store)?;
    Ok(Out::new(format!("Updated transaction {}", updated.id()), updated))
}
