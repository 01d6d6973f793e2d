use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::moody::{ChartSpec, ColebrookGuess};
use crate::solver::{InitialGuess, SolverConfig};
use crate::{fanno, isentropic};

/// 기본 설정 파일 이름.
pub const CONFIG_FILE: &str = "config.toml";

/// 비열비 기본값(공기).
pub const DEFAULT_GAMMA: f64 = 1.4;

/// 애플리케이션 설정을 표현한다.
///
/// 계산 모듈은 전역 기본값을 두지 않고, 여기 담긴 값을 호출마다 명시적으로 전달받는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드 (auto/en-us/ko-kr/zh-cn)
    pub language: String,
    /// 외부 언어팩 디렉터리
    pub language_pack_dir: Option<String>,
    /// 비열비 γ 기본값. 프롬프트에서 빈 입력이면 이 값을 쓴다.
    pub gamma: f64,
    /// GUI 창 투명도
    pub window_alpha: f32,
    /// Fanno 역산 초기값. 빠진 항목은 `fanno::DEFAULT_GUESS` 로 채운다.
    #[serde(deserialize_with = "fanno_guess")]
    pub fanno_guess: InitialGuess,
    #[serde(deserialize_with = "isentropic_guess")]
    pub isentropic_guess: InitialGuess,
    pub colebrook_guess: ColebrookGuess,
    pub solver: SolverConfig,
    pub moody_chart: ChartSpec,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            gamma: DEFAULT_GAMMA,
            window_alpha: 1.0,
            fanno_guess: fanno::DEFAULT_GUESS,
            isentropic_guess: isentropic::DEFAULT_GUESS,
            colebrook_guess: ColebrookGuess::default(),
            solver: SolverConfig::default(),
            moody_chart: ChartSpec::default(),
        }
    }
}

/// `[fanno_guess]` 처럼 한쪽 분기만 적은 테이블.
#[derive(Deserialize)]
struct PartialGuess {
    subsonic: Option<f64>,
    supersonic: Option<f64>,
}

impl PartialGuess {
    fn or(self, default: InitialGuess) -> InitialGuess {
        InitialGuess {
            subsonic: self.subsonic.unwrap_or(default.subsonic),
            supersonic: self.supersonic.unwrap_or(default.supersonic),
        }
    }
}

fn fanno_guess<'de, D: Deserializer<'de>>(de: D) -> Result<InitialGuess, D::Error> {
    PartialGuess::deserialize(de).map(|g| g.or(fanno::DEFAULT_GUESS))
}

fn isentropic_guess<'de, D: Deserializer<'de>>(de: D) -> Result<InitialGuess, D::Error> {
    PartialGuess::deserialize(de).map(|g| g.or(isentropic::DEFAULT_GUESS))
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file could not be parsed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 작업 디렉터리의 config.toml 을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_default_at(Path::new(CONFIG_FILE))
}

/// 지정한 경로의 설정을 로드한다. 파일이 없으면 기본값을 그 경로에 기록한다.
pub fn load_or_default_at(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        tracing::info!(path = %path.display(), "wrote default config");
        Ok(cfg)
    }
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 config.toml 에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        save_config(self, Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        save_config(self, path)
    }

    /// 프롬프트 입력을 γ 로 해석한다. 빈 입력이면 설정값을 쓴다.
    pub fn gamma_or_default(&self, input: &str) -> Result<f64, std::num::ParseFloatError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            Ok(self.gamma)
        } else {
            trimmed.parse()
        }
    }
}
