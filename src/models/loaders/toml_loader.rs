use std::path::Path;

use tokio::fs;

use crate::config::Config;
use crate::error::{AppResult, FileError};

/// 从 TOML 文件加载配置，文件中没写的项使用默认值
pub async fn load_config_file(toml_file_path: &Path) -> AppResult<Config> {
    let path = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path.clone(),
            source,
        })?;

    let config: Config =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed { path, source })?;

    tracing::info!("已加载配置文件: {}", toml_file_path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_config_file_with_selectors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
target_address = "100 Main St, Charlotte NC 28202"
radius_miles = 1.5
strict_radius = true

[selectors]
buffer_button = "button.buffer"
"#
        )
        .unwrap();

        let config = load_config_file(file.path()).await.unwrap();
        assert_eq!(config.target_address, "100 Main St, Charlotte NC 28202");
        assert_eq!(config.radius_miles, 1.5);
        assert!(config.strict_radius);
        assert_eq!(config.wait_timeout_secs, 10);
        assert_eq!(config.selectors.buffer_button, "button.buffer");
        assert_eq!(
            config.selectors.search_result_item,
            ".search-result-item"
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = load_config_file(Path::new("/nonexistent/property_scraper.toml")).await;
        assert!(matches!(
            result,
            Err(crate::error::AppError::File(FileError::ReadFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "radius_miles = \"two\"").unwrap();
        let result = load_config_file(file.path()).await;
        assert!(matches!(
            result,
            Err(crate::error::AppError::File(FileError::TomlParseFailed { .. }))
        ));
    }
}
