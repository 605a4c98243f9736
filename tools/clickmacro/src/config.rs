use crate::errors::MacroError;
use crate::logging::{JsonlLogger, DEFAULT_DISK_BUDGET_BYTES, DEFAULT_MAX_PAYLOAD_BYTES};
use crate::runtime::FileSystem;
use crate::sequence_store::DEFAULT_DATA_FILE;
use crate::types::{ActionDelay, MouseBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MAX_DELAY_MS: u64 = 60_000;
pub const DEFAULT_LOG_PATH: &str = ".cache/clickmacro/run.jsonl";

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub run_delay_ms: Option<u64>,
    pub test_delay_ms: Option<u64>,
    pub mouse_backend: Option<MouseBackend>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub playback: PlaybackConfig,
    pub mouse: MouseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub run_delay_ms: u64,
    pub test_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MouseConfig {
    pub backend: MouseBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub max_payload_bytes: usize,
    pub budget_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_file: PathBuf::from(DEFAULT_DATA_FILE),
            },
            playback: PlaybackConfig {
                run_delay_ms: ActionDelay::RUN.as_duration().as_millis() as u64,
                test_delay_ms: ActionDelay::TEST.as_duration().as_millis() as u64,
            },
            mouse: MouseConfig {
                backend: MouseBackend::Enigo,
            },
            logging: LoggingConfig {
                path: PathBuf::from(DEFAULT_LOG_PATH),
                max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
                budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
            },
        }
    }
}

impl AppConfig {
    pub fn run_delay(&self) -> ActionDelay {
        ActionDelay::from_millis(self.playback.run_delay_ms)
    }

    pub fn test_delay(&self) -> ActionDelay {
        ActionDelay::from_millis(self.playback.test_delay_ms)
    }

    pub fn run_logger(&self) -> JsonlLogger {
        let mut logger = JsonlLogger::new(&self.logging.path);
        logger.max_payload_bytes = self.logging.max_payload_bytes;
        logger.budget_bytes = self.logging.budget_bytes;
        logger
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialAppConfig {
    storage: Option<PartialStorageConfig>,
    playback: Option<PartialPlaybackConfig>,
    mouse: Option<PartialMouseConfig>,
    logging: Option<PartialLoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialStorageConfig {
    data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialPlaybackConfig {
    run_delay_ms: Option<u64>,
    test_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialMouseConfig {
    backend: Option<MouseBackend>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialLoggingConfig {
    path: Option<PathBuf>,
    max_payload_bytes: Option<usize>,
    budget_bytes: Option<u64>,
}

pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<AppConfig, MacroError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(&absolutize_path(process_cwd, path))?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| MacroError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    validate_config(&cfg)?;

    cfg.storage.data_file = absolutize_path(process_cwd, &cfg.storage.data_file);
    cfg.logging.path = absolutize_path(process_cwd, &cfg.logging.path);
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(storage) = partial.storage {
        if let Some(data_file) = storage.data_file {
            cfg.storage.data_file = data_file;
        }
    }

    if let Some(playback) = partial.playback {
        if let Some(value) = playback.run_delay_ms {
            cfg.playback.run_delay_ms = value;
        }
        if let Some(value) = playback.test_delay_ms {
            cfg.playback.test_delay_ms = value;
        }
    }

    if let Some(mouse) = partial.mouse {
        if let Some(backend) = mouse.backend {
            cfg.mouse.backend = backend;
        }
    }

    if let Some(logging) = partial.logging {
        if let Some(path) = logging.path {
            cfg.logging.path = path;
        }
        if let Some(value) = logging.max_payload_bytes {
            cfg.logging.max_payload_bytes = value;
        }
        if let Some(value) = logging.budget_bytes {
            cfg.logging.budget_bytes = value;
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(data_file) = &overrides.data_file {
        cfg.storage.data_file = data_file.clone();
    }
    if let Some(value) = overrides.run_delay_ms {
        cfg.playback.run_delay_ms = value;
    }
    if let Some(value) = overrides.test_delay_ms {
        cfg.playback.test_delay_ms = value;
    }
    if let Some(backend) = overrides.mouse_backend {
        cfg.mouse.backend = backend;
    }
    if let Some(log_file) = &overrides.log_file {
        cfg.logging.path = log_file.clone();
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    }
}

fn validate_config(cfg: &AppConfig) -> Result<(), MacroError> {
    if cfg.storage.data_file.as_os_str().is_empty() {
        return Err(MacroError::InvalidConfig(
            "storage.data_file must not be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("playback.run_delay_ms", cfg.playback.run_delay_ms),
        ("playback.test_delay_ms", cfg.playback.test_delay_ms),
    ] {
        if value > MAX_DELAY_MS {
            return Err(MacroError::InvalidConfig(format!(
                "{name} must be at most {MAX_DELAY_MS}"
            )));
        }
    }

    if cfg.logging.path.as_os_str().is_empty() {
        return Err(MacroError::InvalidConfig(
            "logging.path must not be empty".to_string(),
        ));
    }

    if cfg.logging.max_payload_bytes == 0 {
        return Err(MacroError::InvalidConfig(
            "logging.max_payload_bytes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config, AppConfig, CliOverrides};
    use crate::errors::MacroError;
    use crate::runtime::FakeFileSystem;
    use crate::types::MouseBackend;
    use std::path::{Path, PathBuf};

    #[test]
    fn defaults_resolve_against_cwd() {
        let cfg = load_config(
            &CliOverrides::default(),
            Path::new("/work"),
            &FakeFileSystem::default(),
        )
        .expect("config");
        assert_eq!(cfg.storage.data_file, PathBuf::from("/work/recorded_data.txt"));
        assert_eq!(cfg.playback.run_delay_ms, 50);
        assert_eq!(cfg.playback.test_delay_ms, 700);
        assert_eq!(cfg.mouse.backend, MouseBackend::Enigo);
        assert_eq!(cfg.logging.path, PathBuf::from("/work/.cache/clickmacro/run.jsonl"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let fs = FakeFileSystem::with_file(
            "/work/macro.toml",
            "[playback]\ntest_delay_ms = 250\n\n[mouse]\nbackend = \"virtual\"\n",
        );
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("macro.toml")),
            ..CliOverrides::default()
        };

        let cfg = load_config(&overrides, Path::new("/work"), &fs).expect("config");

        assert_eq!(cfg.playback.test_delay_ms, 250);
        assert_eq!(cfg.playback.run_delay_ms, AppConfig::default().playback.run_delay_ms);
        assert_eq!(cfg.mouse.backend, MouseBackend::Virtual);
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let fs = FakeFileSystem::with_file(
            "/cfg.toml",
            "[storage]\ndata_file = \"/data/a.txt\"\n[playback]\nrun_delay_ms = 10\n",
        );
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("/cfg.toml")),
            data_file: Some(PathBuf::from("/data/b.txt")),
            run_delay_ms: Some(0),
            ..CliOverrides::default()
        };

        let cfg = load_config(&overrides, Path::new("/work"), &fs).expect("config");

        assert_eq!(cfg.storage.data_file, PathBuf::from("/data/b.txt"));
        assert_eq!(cfg.playback.run_delay_ms, 0);
    }

    #[test]
    fn rejects_excessive_delay_and_unknown_keys() {
        let overrides = CliOverrides {
            test_delay_ms: Some(60_001),
            ..CliOverrides::default()
        };
        let err = load_config(&overrides, Path::new("/"), &FakeFileSystem::default())
            .expect_err("delay rejected");
        assert!(matches!(err, MacroError::InvalidConfig(_)));

        let fs = FakeFileSystem::with_file("/cfg.toml", "[playback]\nspeed = 2\n");
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("/cfg.toml")),
            ..CliOverrides::default()
        };
        let err = load_config(&overrides, Path::new("/"), &fs).expect_err("unknown key");
        assert!(matches!(err, MacroError::ConfigParse(_)));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let overrides = CliOverrides {
            config_path: Some(PathBuf::from("/nope.toml")),
            ..CliOverrides::default()
        };
        let err = load_config(&overrides, Path::new("/"), &FakeFileSystem::default())
            .expect_err("missing file");
        assert!(matches!(err, MacroError::Io(_)));
    }
}
