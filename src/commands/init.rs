use crate::args::InitArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its backups subdirectory and:
/// - Creates an initial `config.json` file with default settings
/// - Creates an empty data file, unless `--data-file` points at one that already exists
///
/// # Arguments
/// - `loanbook_home` - The directory that will be the root of the home directory, e.g.
///   `$HOME/loanbook`
/// - `args` - Optionally, where to keep the data file.
///
/// # Errors
/// - Returns an error if the home directory has already been initialized.
/// - Returns an error if any file operations fail.
pub async fn init(loanbook_home: &Path, args: InitArgs) -> Result<Out<()>> {
    let config = Config::create(loanbook_home, args.data_file().map(Path::to_path_buf))
        .await
        .context("Unable to create the loanbook directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the loanbook directory at '{}', transactions are kept in '{}'",
        config.root().display(),
        config.data_path().display()
    )
    .into())
}
