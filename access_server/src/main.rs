#[tokio::main]
async fn main() {
    if let Err(e) = access_server::run_with_config().await {
        tracing::error!(error = %e, "access server stopped");
        std::process::exit(1);
    }
}
