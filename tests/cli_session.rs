use std::io::Cursor;

use compressible_flow_toolbox::app::{self, AppError, Calculator, ChartSink, CsvSink};
use compressible_flow_toolbox::config::Config;
use compressible_flow_toolbox::i18n::Translator;
use compressible_flow_toolbox::moody::MoodyChart;
use compressible_flow_toolbox::ui_cli::Console;

/// 차트 창 대신 호출 여부만 기록한다.
#[derive(Default)]
struct RecordingSink {
    charts: Vec<MoodyChart>,
}

impl ChartSink for RecordingSink {
    fn present(&mut self, chart: &MoodyChart, _title: &str) -> Result<Option<std::path::PathBuf>, AppError> {
        self.charts.push(chart.clone());
        Ok(None)
    }
}

fn small_chart_config() -> Config {
    let mut cfg = Config::default();
    cfg.moody_chart.points = 20;
    cfg
}

fn session(script: &str) -> (Result<(), AppError>, String) {
    let cfg = Config::default();
    let tr = Translator::new("en-us");
    let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
    let res = app::run(&mut console, &cfg, &tr, &mut RecordingSink::default());
    (res, String::from_utf8(console.into_output()).unwrap())
}

fn single(calculator: Calculator, script: &str) -> (Result<(), AppError>, String) {
    let cfg = small_chart_config();
    let tr = Translator::new("en-us");
    let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
    let res = app::run_once(&mut console, &cfg, &tr, calculator, &mut RecordingSink::default());
    (res, String::from_utf8(console.into_output()).unwrap())
}

#[test]
fn fanno_forward_from_main_menu() {
    let (res, out) = session("1\n1\n\n2.0\n0\n");
    res.unwrap();
    assert!(out.contains("Ratios at M=2.000000:"), "{out}");
    assert!(out.contains("T/T* = 0.666667"));
    assert!(out.contains("p/p* = 0.408248"));
    assert!(out.contains("pₜ/pₜ* = 1.687500"));
    assert!(out.contains("fLₘₐₓ/D = 0.304997"));
    assert!(out.contains("Sₘₐₓ/R = 0.523248"));
    assert!(out.contains("V/V* = 1.632993"));
    assert!(out.trim_end().ends_with("Exiting application."));
}

#[test]
fn invalid_menu_selection_retries() {
    let (res, out) = session("9\n0\n");
    res.unwrap();
    assert!(out.contains("Invalid input. Please try again."));
    assert!(out.contains("Exiting application."));
}

#[test]
fn closed_input_ends_the_session_with_an_error() {
    let (res, _) = session("");
    assert!(matches!(res, Err(AppError::Io(_))));
}

#[test]
fn malformed_number_fails_fast() {
    let (res, _) = session("1\n1\n\nabc\n0\n");
    match res {
        Err(AppError::InvalidNumber { input }) => assert_eq!(input, "abc"),
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
}

#[test]
fn malformed_gamma_fails_fast() {
    let (res, _) = single(Calculator::Fanno, "1\nfoo\n");
    assert!(matches!(res, Err(AppError::InvalidNumber { .. })));
}

#[test]
fn fanno_invalid_mode_prints_error_and_returns() {
    let (res, out) = single(Calculator::Fanno, "5\n\n");
    res.unwrap();
    assert!(out.contains("Invalid mode, please enter 1 or 2."));
    assert!(!out.contains("T/T* ="));
}

#[test]
fn fanno_invalid_ratio_code() {
    let (res, out) = single(Calculator::Fanno, "2\n\n9\n");
    res.unwrap();
    assert!(out.contains("Invalid ratio number!"));
}

#[test]
fn fanno_inverse_prints_the_other_ratios() {
    let (res, out) = single(Calculator::Fanno, "2\n\n1\n0.6666666666666666\n2\n");
    res.unwrap();
    assert!(out.contains("1 = T/T*"));
    assert!(out.contains("6 = V/V*"));
    assert!(out.contains("Solved Mach number M = 2.000000"), "{out}");
    assert!(out.contains("p/p* = 0.408248"));
    assert!(out.contains("V/V* = 1.632993"));
    assert!(!out.contains("T/T* = "));
}

#[test]
fn fanno_uses_entered_gamma() {
    let (res, out) = single(Calculator::Fanno, "1\n1.3\n1\n");
    res.unwrap();
    assert!(out.contains("T/T* = 1.000000"));
    assert!(out.contains("(default 1.4"));
}

#[test]
fn isentropic_forward() {
    let (res, out) = single(Calculator::Isentropic, "1\n\n2\n");
    res.unwrap();
    assert!(out.contains("Mach number M = 2.0\n"), "{out}");
    assert!(out.contains("A/A* = 1.687500"));
    assert!(out.contains("T/Tₜ = 0.555556"));
    assert!(out.contains("p/pₜ = 0.127805"));
    assert!(out.contains("ρ/ρₜ = 0.230048"));
}

#[test]
fn isentropic_area_ratio_asks_for_branch() {
    let (res, out) = single(Calculator::Isentropic, "2\n\n1\n1.5\n1\n");
    res.unwrap();
    assert!(out.contains("Area ratio A/A* branch"));
    assert!(out.contains("A/A* = 1.5 corresponds to Mach number M = 0.430262"), "{out}");
    assert!(out.contains("A/A* = 1.500000"));
}

#[test]
fn isentropic_echoes_whole_number_target_as_float() {
    let (res, out) = single(Calculator::Isentropic, "2\n\n1\n2\n2\n");
    res.unwrap();
    assert!(out.contains("A/A* = 2.0 corresponds to Mach number M = 2.197"), "{out}");
}

#[test]
fn isentropic_temperature_ratio_skips_branch_prompt() {
    let (res, out) = single(Calculator::Isentropic, "2\n\n2\n0.5\n");
    res.unwrap();
    assert!(!out.contains("Area ratio A/A* branch"));
    assert!(out.contains("corresponds to Mach number M = 2.236068"), "{out}");
}

#[test]
fn isentropic_invalid_ratio_code() {
    let (res, out) = single(Calculator::Isentropic, "2\n\n7\n");
    res.unwrap();
    assert!(out.contains("Invalid ratio number!"));
}

#[test]
fn moody_friction_factor() {
    let (res, out) = single(Calculator::Moody, "1\n1e5\n0.0001\n");
    res.unwrap();
    assert!(out.contains("Re=1.00e+05, ε/D=0.000100 → friction factor f=0.018514"), "{out}");
}

#[test]
fn moody_reynolds_number() {
    let (res, out) = single(Calculator::Moody, "2\n0.018513866\n0.0001\n");
    res.unwrap();
    assert!(out.contains("Reynolds number Re=1.00e+05"), "{out}");
}

#[test]
fn moody_relative_roughness() {
    let (res, out) = single(Calculator::Moody, "3\n0.041890913\n4000\n");
    res.unwrap();
    assert!(out.contains("f=0.041891, Re=4.00e+03 → relative roughness ε/D=0.002000"), "{out}");
}

#[test]
fn moody_invalid_mode() {
    let (res, out) = single(Calculator::Moody, "8\n");
    res.unwrap();
    assert!(out.contains("Invalid mode, please enter 1, 2, 3 or 4."));
}

#[test]
fn moody_chart_uses_entered_roughness_list() {
    let cfg = small_chart_config();
    let tr = Translator::new("en-us");
    let mut sink = RecordingSink::default();
    let mut console = Console::new(Cursor::new(b"4\n0.001, 0.01\n".to_vec()), Vec::new());
    app::run_once(&mut console, &cfg, &tr, Calculator::Moody, &mut sink).unwrap();
    assert_eq!(sink.charts.len(), 1);
    let rough: Vec<f64> = sink.charts[0].curves.iter().map(|c| c.relative_roughness).collect();
    assert_eq!(rough, vec![0.001, 0.01]);
    assert_eq!(sink.charts[0].curves[0].points.len(), 20);
}

#[test]
fn moody_chart_blank_list_uses_defaults() {
    let cfg = small_chart_config();
    let tr = Translator::new("en-us");
    let mut sink = RecordingSink::default();
    let mut console = Console::new(Cursor::new(b"4\n\n".to_vec()), Vec::new());
    app::run_once(&mut console, &cfg, &tr, Calculator::Moody, &mut sink).unwrap();
    assert_eq!(sink.charts[0].curves.len(), 5);
}

#[test]
fn moody_chart_bad_list_fails_fast() {
    let (res, _) = single(Calculator::Moody, "4\n0.001,abc\n");
    assert!(matches!(res, Err(AppError::InvalidNumber { .. })));
}

#[test]
fn moody_chart_can_be_written_as_csv() {
    let cfg = small_chart_config();
    let tr = Translator::new("en-us");
    let path = std::env::temp_dir().join(format!("cft_moody_{}.csv", std::process::id()));
    let mut sink = CsvSink::new(&path);
    let mut console = Console::new(Cursor::new(b"4\n0.001\n".to_vec()), Vec::new());
    app::run_once(&mut console, &cfg, &tr, Calculator::Moody, &mut sink).unwrap();
    let out = String::from_utf8(console.into_output()).unwrap();
    assert!(out.contains("Chart data written to"));

    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().count(), 21);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn chinese_session_uses_language_pack() {
    let cfg = Config::default();
    let tr = Translator::new("zh-cn");
    let mut console = Console::new(Cursor::new(b"5\n\n".to_vec()), Vec::new());
    app::run_once(&mut console, &cfg, &tr, Calculator::Fanno, &mut RecordingSink::default()).unwrap();
    let out = String::from_utf8(console.into_output()).unwrap();
    assert!(out.contains("1 = 已知 M 求其余比值"));
}
