use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Config, MarketSettings, Metrics, Simulation, StockListing};

/// Prefix of the environment variables that override file settings, e.g.
/// `STOCK_MARKET__SIMULATION__SEED=7`.
pub const ENV_PREFIX: &str = "STOCK_MARKET";

/// Loads, overrides from the environment, and validates the configuration at `path`.
///
/// It reads the configuration file, deserializes it into our strongly-typed `Config`
/// struct, and returns it.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Loading configuration");

    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Parses and validates configuration given as TOML text.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
