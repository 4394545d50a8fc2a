use kite_autologin::{Config, service::autologin};
use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        user_id = %cfg.user_id,
        backend = %cfg.backend_update_url,
        webdriver = %cfg.webdriver_url,
        token_output_path = %cfg
            .token_output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string()),
        source = %cfg.backend_source_label,
        loglevel = %cfg.loglevel
    );

    autologin::run(&cfg)
        .await
        .inspect_err(|e| error!(error = %e, "autologin failed"))?;
    Ok(())
}
