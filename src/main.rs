use imagen::{
    config::Config,
    logger::{self, LoggerConfig},
    view,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env()?;

    let logger_config = if config.log_json {
        LoggerConfig::production()
    } else {
        LoggerConfig::default()
    };
    logger::init_with_config(logger_config.with_level(config.log_level))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }
    logger::log_config_info(&config);

    if let Err(e) = view::run(config).await {
        log::error!("❌ {}", e);
        return Err(e.into());
    }

    Ok(())
}
