use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

/// Load `config/observatory.toml`, falling back to built-in defaults when
/// the file is absent so a fresh checkout runs without any setup.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("storage.data_dir", "data")?
        .add_source(config::File::with_name("config/observatory").required(false))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_without_config_file() {
        let config = load_app_config().unwrap();
        assert!(!config.server.bind.is_empty());
        assert!(!config.storage.data_dir.as_os_str().is_empty());
    }
}
