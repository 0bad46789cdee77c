use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::electrical::{PowerError, PowerModel};
use crate::quantity::Phase;

/// 설정 파일 기본 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 새 계산을 시작할 때 적용할 회로 조건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitDefaults {
    pub volts: f64,
    pub power_factor: f64,
    pub efficiency: f64,
    pub phase: Phase,
}

impl Default for CircuitDefaults {
    fn default() -> Self {
        Self {
            volts: 480.0,
            power_factor: 1.0,
            efficiency: 1.0,
            phase: Phase::Three,
        }
    }
}

impl CircuitDefaults {
    /// 모델의 현재 회로 조건을 기본값으로 저장하기 위해 읽어온다.
    pub fn capture(model: &PowerModel) -> Self {
        Self {
            volts: model.volts(),
            power_factor: model.power_factor(),
            efficiency: model.efficiency(),
            phase: model.phase(),
        }
    }

    /// 검증된 setter 로 모델에 적용한다. 하나라도 범위를 벗어나면 모델은 그대로 둔다.
    pub fn apply(&self, model: &mut PowerModel) -> Result<(), PowerError> {
        let mut staged = model.clone();
        staged.set_volts(self.volts)?;
        staged.set_power_factor(self.power_factor)?;
        staged.set_efficiency(self.efficiency)?;
        staged.set_phase(self.phase);
        *model = staged;
        Ok(())
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드 (auto/ko/en ...)
    pub language: String,
    /// 외부 언어팩 디렉터리
    pub language_pack_dir: Option<String>,
    /// RUST_LOG 가 없을 때 사용할 로그 레벨
    pub log_level: String,
    /// GUI 사용자 폰트 경로
    pub font_path: Option<String>,
    pub circuit: CircuitDefaults,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            log_level: "warn".to_string(),
            font_path: None,
            circuit: CircuitDefaults::default(),
            path: None,
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// config.toml 을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// 지정된 경로의 설정을 로드한다. 파일이 없으면 기본 설정을 그 경로에 생성한다.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str::<Config>(&content)?
    } else {
        info!(path = %path.display(), "config not found, writing defaults");
        let cfg = Config::default();
        save_config(&cfg, path)?;
        cfg
    };
    cfg.path = Some(path.to_path_buf());
    Ok(cfg)
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 로드했던 파일(없으면 config.toml)에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        save_config(self, path)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 회로 기본값을 적용한 새 모델을 만든다.
    pub fn new_model(&self) -> Result<PowerModel, PowerError> {
        let mut model = PowerModel::new();
        self.circuit.apply(&mut model)?;
        Ok(model)
    }
}
