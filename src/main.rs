use std::path::PathBuf;

use clap::Parser;
use compressible_flow_toolbox::app::{self, AppError, Calculator, ChartSink, CsvSink, WindowSink};
use compressible_flow_toolbox::config;
use compressible_flow_toolbox::i18n::{self, Translator};
use compressible_flow_toolbox::ui_cli::Console;
use tracing::Level;

/// Fanno / 등엔트로피 유동 비와 Colebrook 마찰계수 계산기.
#[derive(Parser, Debug)]
#[command(name = "compressible_flow_toolbox_cli", version, about, long_about = None)]
struct Cli {
    /// 언어 코드 (auto/en-us/ko-kr/zh-cn)
    #[arg(long, default_value = "auto")]
    lang: String,

    /// 설정 파일 경로 (기본: ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 메인 메뉴를 건너뛰고 바로 실행할 계산기
    #[arg(long, value_enum)]
    calculator: Option<Calculator>,

    /// Moody 선도를 창 대신 CSV 로 저장
    #[arg(long)]
    csv: Option<PathBuf>,

    /// 로그 상세도 (-v: info, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = try_run(cli) {
        eprintln!("error: {err}");
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let cfg = match &cli.config {
        Some(path) => config::load_or_default_at(path)?,
        None => config::load_or_default()?,
    };
    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let tr = Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());
    tracing::debug!(language = tr.language_code(), "translator ready");

    let mut sink: Box<dyn ChartSink> = match cli.csv {
        Some(path) => Box::new(CsvSink::new(path)),
        None => Box::new(WindowSink),
    };
    let mut console = Console::stdio();
    match cli.calculator {
        Some(calculator) => app::run_once(&mut console, &cfg, &tr, calculator, sink.as_mut()),
        None => app::run(&mut console, &cfg, &tr, sink.as_mut()),
    }
}
