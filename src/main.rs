use std::sync::Arc;

use citywalk::config::Config;
use citywalk::engine::Engine;
use citywalk::error::Error;
use citywalk::external::{amap::AMap, DynProvider};
use citywalk::server::serve;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(%err, "citywalk stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;

    let provider = Arc::new(AMap::from_config(&config)?) as DynProvider;
    let engine = Engine::new(provider, config.settings.clone());

    serve(engine, config.listen_addr).await
}
