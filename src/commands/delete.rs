use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Transaction;
use crate::store::Store;
use crate::{Config, Result};

/// Deletes a transaction by ID and returns what was deleted.
///
/// # Errors
/// - `ErrorType::NotFound` if no transaction has the given ID.
/// - `ErrorType::Store` if the data file cannot be written.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<Transaction>> {
    let deleted = config
        .store()
        .delete(args.id())
        .await
        .pub_result(ErrorType::Store)?;
    Ok(Out::new(format!("Deleted transaction {}", deleted.id()), deleted))
}
