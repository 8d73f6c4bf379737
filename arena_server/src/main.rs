#[tokio::main]
async fn main() {
    if let Err(e) = arena_server::run_with_config().await {
        tracing::error!(error = %e, "arena server stopped");
        std::process::exit(1);
    }
}
