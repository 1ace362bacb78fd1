use {
    anyhow::Result,
    co2_monitor::{run, settings::Settings},
    std::env,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_backtrace::install();

    let settings = Settings::new().expect("Failed to load settings");

    let mut logger = pretty_env_logger::formatted_builder();
    logger.parse_filters(&settings.logger.level);
    if let Ok(filters) = env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    run(&settings).await
}
