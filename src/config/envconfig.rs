use std::path::Path;

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::defaults;

pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";
    const FILE_NAME: &'static str = defaults::CONFIG_FILE_NAME;
    /// Keys whose environment values are comma separated lists.
    const LIST_KEYS: &'static [&'static str] = &[];

    fn load_dotenv() {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn environment() -> config_rs::Environment {
        let env = config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true);

        if Self::LIST_KEYS.is_empty() {
            return env;
        }

        Self::LIST_KEYS.iter().fold(
            env.list_separator(defaults::LIST_SEPARATOR),
            |env, key| env.with_list_parse_key(key),
        )
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();

        let settings = config_rs::Config::builder()
            .add_source(config_rs::File::with_name(Self::FILE_NAME).required(false))
            .add_source(Self::environment())
            .build()
            .context("failed to read config file and environment variables")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize environment into config")?;

        cfg.validate()?;
        Ok(cfg)
    }
}
