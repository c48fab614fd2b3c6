use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use spacegate_core::{ByteSize, ConfigOverrides, RemovalOrder, Seconds};

/// Check free disk space before a torrent is added, removing finished
/// torrents from qBittorrent when space is short.
///
/// Exit codes: 0 = enough space, 1 = insufficient space, 2 = error.
#[derive(Debug, Parser)]
#[command(name = "spacegate", version, about, long_about = None)]
pub struct Args {
    /// Directory to check (e.g. /downloads)
    pub path: Option<PathBuf>,

    /// Required free space: bytes, or a size such as 50GiB or 1.5TB
    pub required: Option<ByteSize>,

    /// Configuration file (default: ./spacegate.toml if present)
    #[arg(short, long, env = "SPACEGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// qBittorrent Web UI URL
    #[arg(long, value_name = "URL")]
    pub qbit_url: Option<String>,

    /// qBittorrent Web UI username
    #[arg(long, value_name = "USER")]
    pub qbit_username: Option<String>,

    /// qBittorrent Web UI password
    #[arg(long, value_name = "PASSWORD")]
    pub qbit_password: Option<String>,

    /// Never remove torrents, only check
    #[arg(long)]
    pub no_reclaim: bool,

    /// Minimum share ratio before a torrent may be removed
    #[arg(long, value_name = "RATIO")]
    pub min_ratio: Option<f64>,

    /// Minimum seeding time before a torrent may be removed (e.g. 3d, 12h)
    #[arg(long, value_name = "DURATION")]
    pub min_seeding_time: Option<Seconds>,

    /// Removal order: largest_first, smallest_first or oldest_first
    #[arg(long, value_name = "ORDER")]
    pub order: Option<RemovalOrder>,

    /// Remove torrents from the client but keep their data on disk
    #[arg(long)]
    pub keep_files: bool,

    /// Wait after each removal before re-checking free space (e.g. 5s)
    #[arg(long, value_name = "DURATION")]
    pub settle_secs: Option<Seconds>,

    /// Show which torrents would be removed without removing them
    #[arg(long)]
    pub dry_run: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Args {
    /// Command line values that take precedence over file and environment.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            path: self.path.clone(),
            required: self.required,
            qbit_url: self.qbit_url.clone(),
            qbit_username: self.qbit_username.clone(),
            qbit_password: self.qbit_password.clone(),
            reclaim_enabled: self.no_reclaim.then_some(false),
            dry_run: self.dry_run.then_some(true),
            min_ratio: self.min_ratio,
            min_seeding_time: self.min_seeding_time,
            order: self.order,
            delete_files: self.keep_files.then_some(false),
            settle_secs: self.settle_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_positional_path_and_size() {
        let args = Args::try_parse_from(["spacegate", "/downloads", "50GiB"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("/downloads")));
        assert_eq!(args.required, Some(ByteSize(50 * 1024 * 1024 * 1024)));
        assert_eq!(args.log_format, LogFormat::Text);
    }

    #[test]
    fn test_flags_map_to_overrides() {
        let args = Args::try_parse_from([
            "spacegate",
            "/downloads",
            "1000",
            "--no-reclaim",
            "--keep-files",
            "--dry-run",
            "--min-ratio",
            "1.5",
            "--min-seeding-time",
            "3d",
            "--order",
            "smallest_first",
            "--qbit-url",
            "http://localhost:8080",
        ])
        .unwrap();

        let overrides = args.overrides();
        assert_eq!(overrides.required, Some(ByteSize(1000)));
        assert_eq!(overrides.reclaim_enabled, Some(false));
        assert_eq!(overrides.delete_files, Some(false));
        assert_eq!(overrides.dry_run, Some(true));
        assert_eq!(overrides.min_ratio, Some(1.5));
        assert_eq!(overrides.min_seeding_time, Some(Seconds(259_200)));
        assert_eq!(overrides.order, Some(RemovalOrder::SmallestFirst));
        assert_eq!(overrides.qbit_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let args = Args::try_parse_from(["spacegate"]).unwrap();
        let overrides = args.overrides();
        assert!(overrides.path.is_none());
        assert!(overrides.reclaim_enabled.is_none());
        assert!(overrides.delete_files.is_none());
        assert!(overrides.dry_run.is_none());
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        assert!(Args::try_parse_from(["spacegate", "/downloads", "lots"]).is_err());
    }

    #[test]
    fn test_json_log_format() {
        let args = Args::try_parse_from(["spacegate", "--log-format", "json"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
