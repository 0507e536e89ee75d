use mock_server::MockConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    let defaults = MockConfig::default();
    let config = MockConfig {
        api_key: std::env::var("MOCK_API_KEY").unwrap_or(defaults.api_key),
        api_secret: std::env::var("MOCK_API_SECRET").unwrap_or(defaults.api_secret),
        code: std::env::var("MOCK_CODE").unwrap_or(defaults.code),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock verify service listening");
    mock_server::run(listener, config).await
}
