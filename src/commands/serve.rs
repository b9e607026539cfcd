use crate::args::ServeArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::server::{self, AppState};
use crate::{Config, Result};
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

/// Serves the transactions over HTTP until Ctrl+C or SIGTERM is received.
///
/// The address is `--bind` if given, otherwise `bind` from `config.json`.
///
/// # Errors
/// - `ErrorType::Service` if the address cannot be bound or the server fails.
pub async fn serve(config: Config, args: ServeArgs) -> Result<Out<()>> {
    let addr = args.bind().unwrap_or(config.bind()).to_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))
        .pub_result(ErrorType::Service)?;

    info!(
        "Serving {} on http://{addr}, press Ctrl+C to stop",
        config.data_path().display()
    );
    server::serve(listener, AppState::from_config(config))
        .await
        .pub_result(ErrorType::Service)?;
    Ok("The server has stopped".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_serve_bad_address() {
        let env = TestEnv::new().await;
        let args = ServeArgs::new(Some("not an address".to_string()));
        let err = serve(env.config(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Service));
        assert!(err.to_string().contains("Unable to listen on not an address"));
    }
}
