use i2pdns_gateway::{
    config::GatewayConfig,
    context::AppContext,
    error::{GatewayError, GatewayResult},
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> GatewayResult<()> {
    // Missing or invalid configuration aborts startup
    let config = GatewayConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                .map_err(|e| GatewayError::Config(format!("Invalid log filter: {}", e)))?,
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    let ctx = AppContext::new(config)?;

    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    _ ___           _
   (_)__ \ ___  ___/ /__  ___
  / /__/ // _ \/ _  / _ \(_-<
 /_/____// .__/\_,_/_//_/___/
        /_/
        I2P DNS Gateway v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
