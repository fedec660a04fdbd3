use tracing_subscriber::{fmt, EnvFilter};

use litrevu::config::Config;

#[rocket::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let rocket = match Config::from_env().and_then(litrevu::build) {
        Ok(rocket) => rocket,
        Err(err) => {
            tracing::error!("failed to start: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = rocket.launch().await {
        tracing::error!("server stopped: {}", err);
        std::process::exit(1);
    }
}
