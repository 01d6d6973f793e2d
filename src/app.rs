use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::i18n::{self, Translator};
use crate::moody::MoodyChart;
use crate::plot;
use crate::ui_cli::{self, Console, MenuChoice};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 파일/콘솔 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// 숫자로 해석할 수 없는 입력
    #[error("invalid number: {input:?}")]
    InvalidNumber { input: String },
    /// 차트 창을 띄우지 못함
    #[error("chart window failed: {0}")]
    Chart(String),
}

/// 메뉴를 거치지 않고 바로 실행할 계산기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Calculator {
    Fanno,
    Isentropic,
    Moody,
}

/// Moody 선도를 어디로 내보낼지 결정한다.
pub trait ChartSink {
    /// 차트를 표시하거나 기록한다. 파일로 썼다면 그 경로를 돌려준다.
    fn present(&mut self, chart: &MoodyChart, title: &str) -> Result<Option<PathBuf>, AppError>;
}

/// 네이티브 창에 차트를 띄운다. 창을 닫을 때까지 블록된다.
pub struct WindowSink;

impl ChartSink for WindowSink {
    fn present(&mut self, chart: &MoodyChart, title: &str) -> Result<Option<PathBuf>, AppError> {
        plot::show_moody_chart(chart.clone(), title).map_err(|e| AppError::Chart(e.to_string()))?;
        Ok(None)
    }
}

/// 창 대신 CSV 파일로 기록한다.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChartSink for CsvSink {
    fn present(&mut self, chart: &MoodyChart, _title: &str) -> Result<Option<PathBuf>, AppError> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        chart.write_csv(&mut out)?;
        out.flush()?;
        tracing::info!(path = %self.path.display(), "moody chart written");
        Ok(Some(self.path.clone()))
    }
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
    tr: &Translator,
    sink: &mut dyn ChartSink,
) -> Result<(), AppError> {
    loop {
        let calculator = match ui_cli::main_menu(console, tr)? {
            MenuChoice::Fanno => Calculator::Fanno,
            MenuChoice::Isentropic => Calculator::Isentropic,
            MenuChoice::Moody => Calculator::Moody,
            MenuChoice::Exit => {
                console.say(&tr.t(i18n::keys::APP_EXIT))?;
                break;
            }
        };
        run_once(console, config, tr, calculator, sink)?;
    }
    Ok(())
}

/// 계산기 하나를 한 번 실행한다.
pub fn run_once<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
    tr: &Translator,
    calculator: Calculator,
    sink: &mut dyn ChartSink,
) -> Result<(), AppError> {
    tracing::debug!(?calculator, "running calculator");
    match calculator {
        Calculator::Fanno => ui_cli::handle_fanno(console, tr, config),
        Calculator::Isentropic => ui_cli::handle_isentropic(console, tr, config),
        Calculator::Moody => ui_cli::handle_moody(console, tr, config, sink),
    }
}
