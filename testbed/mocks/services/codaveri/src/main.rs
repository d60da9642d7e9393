use codaveri_mock::{BackendFixture, MockServer};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let fixture = match env::var("FIXTURE_PATH") {
        Ok(path) => {
            tracing::info!("Loading fixture from {}", path);
            BackendFixture::from_yaml(&fs::read_to_string(&path)?)?
        }
        Err(_) => {
            tracing::info!("No FIXTURE_PATH set, using default fixture");
            BackendFixture::default()
                .with_pending_polls(2)
                .with_stdout("Hello from codaveri-mock\n")
        }
    };

    let addr = env::var("MOCK_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    MockServer::new(fixture).serve(&addr).await
}
