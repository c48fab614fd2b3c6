use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - disk.path is set and disk.required is non-zero
/// - qBittorrent URL scheme and timeout
/// - reclaim.min_ratio is a non-negative number
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.disk.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "disk.path must be set".to_string(),
        ));
    }

    if config.disk.required.bytes() == 0 {
        return Err(ConfigError::ValidationError(
            "disk.required must be greater than 0".to_string(),
        ));
    }

    if let Some(tc) = &config.torrent_client {
        let Some(qbit) = &tc.qbittorrent else {
            return Err(ConfigError::ValidationError(
                "torrent_client.qbittorrent section is required for the qbittorrent backend"
                    .to_string(),
            ));
        };
        if !(qbit.url.starts_with("http://") || qbit.url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "torrent_client.qbittorrent.url must start with http:// or https://, got '{}'",
                qbit.url
            )));
        }
        if qbit.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "torrent_client.qbittorrent.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    if let Some(ratio) = config.reclaim.min_ratio {
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "reclaim.min_ratio must be a non-negative number, got {}",
                ratio
            )));
        }
    }

    Ok(())
}
