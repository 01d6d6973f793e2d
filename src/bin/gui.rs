#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use compressible_flow_toolbox::{
    config::{self, Config},
    fanno::{self, FannoRatio, FannoRatios},
    i18n::{self, keys, Translator},
    isentropic::{self, IsentropicRatio, IsentropicRatios},
    moody::{self, MoodyChart},
    plot,
    solver::{Branch, Solution},
    ui_cli::{fmt6, sci},
};
use eframe::{egui, App, Frame};
use rfd::FileDialog;

#[derive(Parser, Debug)]
#[command(name = "compressible_flow_toolbox", version, about = "Compressible flow toolbox (GUI)")]
struct GuiArgs {
    /// 언어 코드 (auto/en-us/ko-kr/zh-cn)
    #[arg(short = 'L', long)]
    lang: Option<String>,
    /// 설정 파일 경로
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), eframe::Error> {
    let args = GuiArgs::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = args.config.unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE));
    let mut app_cfg = match config::load_or_default_at(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(error = %e, "using default config");
            Config::default()
        }
    };
    if let Some(lang_cli) = args.lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_transparent(true),
        ..Default::default()
    };
    eframe::run_native(
        "Compressible Flow Toolbox",
        options,
        Box::new(move |cc| {
            setup_fonts(&cc.egui_ctx);
            Box::new(GuiApp::new(app_cfg, config_path))
        }),
    )
}

/// 공통: 바이너리 폰트 바이트를 egui에 등록.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .push(font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .push(font_name);
    ctx.set_fonts(fonts);
}

/// 중국어/한국어 표시용 CJK 폰트를 시스템에서 찾아 기본 폰트 뒤에 붙인다.
/// 찾지 못하면 기본 폰트를 그대로 쓴다.
fn setup_fonts(ctx: &egui::Context) {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(windir) = std::env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        for name in ["msyh.ttc", "simhei.ttf", "malgun.ttf", "gulim.ttc"] {
            candidates.push(fonts.join(name));
        }
    }
    for p in [
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        "/System/Library/Fonts/PingFang.ttc",
    ] {
        candidates.push(PathBuf::from(p));
    }

    for path in candidates.iter().filter(|p| p.exists()) {
        match fs::read(path) {
            Ok(bytes) => {
                apply_font_bytes(ctx, bytes, "cjk_font");
                tracing::debug!(path = %path.display(), "loaded CJK font");
                return;
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to read font"),
        }
    }
    tracing::warn!("no CJK font found; non-Latin labels may not render");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Fanno,
    Isentropic,
    Moody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoodyMode {
    Friction,
    Reynolds,
    Roughness,
}

/// 계산 결과 줄과 수렴 경고.
#[derive(Debug, Clone, PartialEq)]
struct CalcOutput {
    lines: Vec<String>,
    warning: Option<String>,
}

struct GuiApp {
    config: Config,
    config_path: PathBuf,
    tr: Translator,
    tab: Tab,
    gamma_input: String,

    fanno_inverse: bool,
    fanno_mach: String,
    fanno_ratio: FannoRatio,
    fanno_value: String,
    fanno_branch: Branch,
    fanno_result: Option<Result<CalcOutput, String>>,

    isen_inverse: bool,
    isen_mach: String,
    isen_ratio: IsentropicRatio,
    isen_value: String,
    isen_branch: Branch,
    isen_result: Option<Result<CalcOutput, String>>,

    moody_mode: MoodyMode,
    moody_re: String,
    moody_eps: String,
    moody_f: String,
    moody_result: Option<Result<CalcOutput, String>>,
    roughness_input: String,
    chart: Option<MoodyChart>,
    chart_status: Option<String>,

    show_settings_modal: bool,
    lang_input: String,
    default_gamma_input: String,
    window_alpha: f32,
    settings_status: Option<String>,
}

fn parse_input(tr: &Translator, name: &str, s: &str) -> Result<f64, String> {
    s.trim().parse::<f64>().map_err(|_| {
        format!(
            "{}: {name} = {:?} ({})",
            tr.t(keys::ERROR_PREFIX),
            s.trim(),
            tr.t(keys::ERROR_INVALID_NUMBER)
        )
    })
}

fn convergence_warning(tr: &Translator, sol: &Solution) -> Option<String> {
    if sol.converged {
        return None;
    }
    tracing::warn!(x = sol.x, residual = sol.residual, iterations = sol.iterations, "solve did not converge");
    Some(tr.fill(keys::WARN_NOT_CONVERGED, &[("residual", format!("{:e}", sol.residual))]))
}

fn write_chart_csv(chart: &MoodyChart, path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    chart.write_csv(&mut out)?;
    out.flush()
}

impl GuiApp {
    fn new(config: Config, config_path: PathBuf) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        Self {
            tr,
            tab: Tab::Fanno,
            gamma_input: String::new(),

            fanno_inverse: false,
            fanno_mach: "2.0".into(),
            fanno_ratio: FannoRatio::Temperature,
            fanno_value: String::new(),
            fanno_branch: Branch::Subsonic,
            fanno_result: None,

            isen_inverse: false,
            isen_mach: "2.0".into(),
            isen_ratio: IsentropicRatio::Area,
            isen_value: String::new(),
            isen_branch: Branch::Subsonic,
            isen_result: None,

            moody_mode: MoodyMode::Friction,
            moody_re: "1e5".into(),
            moody_eps: "0.0001".into(),
            moody_f: String::new(),
            moody_result: None,
            roughness_input: String::new(),
            chart: None,
            chart_status: None,

            show_settings_modal: false,
            lang_input: config.language.clone(),
            default_gamma_input: config.gamma.to_string(),
            window_alpha: config.window_alpha,
            settings_status: None,

            config,
            config_path,
        }
    }

    fn txt(&self, key: &str, default: &str) -> String {
        self.tr.lookup(key).unwrap_or_else(|| default.to_string())
    }

    fn gamma(&self) -> Result<f64, String> {
        self.config
            .gamma_or_default(&self.gamma_input)
            .or_else(|_| parse_input(&self.tr, "γ", &self.gamma_input))
    }

    fn compute_fanno(&self) -> Result<CalcOutput, String> {
        let gamma = self.gamma()?;
        if !self.fanno_inverse {
            let mach = parse_input(&self.tr, "M", &self.fanno_mach)?;
            let mut lines = vec![format!("M = {}", fmt6(mach))];
            lines.extend(
                FannoRatios::at(mach, gamma)
                    .iter()
                    .map(|(r, v)| format!("{} = {}", r.label(), fmt6(v))),
            );
            return Ok(CalcOutput { lines, warning: None });
        }

        let value = parse_input(&self.tr, self.fanno_ratio.label(), &self.fanno_value)?;
        let sol = fanno::solve_mach(
            value,
            self.fanno_ratio,
            gamma,
            self.fanno_branch,
            &self.config.fanno_guess,
            &self.config.solver,
        );
        let mut lines = vec![format!("M = {}", fmt6(sol.x))];
        lines.extend(
            FannoRatios::at(sol.x, gamma)
                .iter()
                .filter(|(r, _)| *r != self.fanno_ratio)
                .map(|(r, v)| format!("{} = {}", r.label(), fmt6(v))),
        );
        Ok(CalcOutput {
            lines,
            warning: convergence_warning(&self.tr, &sol),
        })
    }

    fn compute_isentropic(&self) -> Result<CalcOutput, String> {
        let gamma = self.gamma()?;
        let (mach, warning) = if self.isen_inverse {
            let value = parse_input(&self.tr, self.isen_ratio.label(), &self.isen_value)?;
            let sol = isentropic::solve_mach(
                value,
                self.isen_ratio,
                gamma,
                self.isen_branch,
                &self.config.isentropic_guess,
                &self.config.solver,
            );
            (sol.x, convergence_warning(&self.tr, &sol))
        } else {
            (parse_input(&self.tr, "M", &self.isen_mach)?, None)
        };
        let mut lines = vec![format!("M = {}", fmt6(mach))];
        lines.extend(
            IsentropicRatios::at(mach, gamma)
                .iter()
                .map(|(r, v)| format!("{} = {}", r.label(), fmt6(v))),
        );
        Ok(CalcOutput { lines, warning })
    }

    fn compute_moody(&self) -> Result<CalcOutput, String> {
        let guess = &self.config.colebrook_guess;
        let solver = &self.config.solver;
        let tr = &self.tr;
        let (line, sol) = match self.moody_mode {
            MoodyMode::Friction => {
                let re = parse_input(tr, "Re", &self.moody_re)?;
                let eps = parse_input(tr, "ε/D", &self.moody_eps)?;
                let sol = moody::solve_friction_factor(re, eps, guess, solver);
                (format!("Re = {}, ε/D = {} → f = {}", sci(re), fmt6(eps), fmt6(sol.x)), sol)
            }
            MoodyMode::Reynolds => {
                let f = parse_input(tr, "f", &self.moody_f)?;
                let eps = parse_input(tr, "ε/D", &self.moody_eps)?;
                let sol = moody::solve_reynolds(f, eps, guess, solver);
                (format!("f = {}, ε/D = {} → Re = {}", fmt6(f), fmt6(eps), sci(sol.x)), sol)
            }
            MoodyMode::Roughness => {
                let f = parse_input(tr, "f", &self.moody_f)?;
                let re = parse_input(tr, "Re", &self.moody_re)?;
                let sol = moody::solve_relative_roughness(f, re, guess, solver);
                (format!("f = {}, Re = {} → ε/D = {}", fmt6(f), sci(re), fmt6(sol.x)), sol)
            }
        };
        Ok(CalcOutput {
            lines: vec![line],
            warning: convergence_warning(tr, &sol),
        })
    }

    fn build_chart(&self) -> Result<MoodyChart, String> {
        let mut spec = self.config.moody_chart.clone();
        let list = self.roughness_input.trim();
        if !list.is_empty() {
            spec.relative_roughness = moody::parse_roughness_list(list).map_err(|_| {
                format!("{}: {list:?} ({})", self.tr.t(keys::ERROR_PREFIX), self.tr.t(keys::ERROR_INVALID_NUMBER))
            })?;
        }
        Ok(moody::sweep(&spec, &self.config.colebrook_guess, &self.config.solver))
    }

    fn save_settings(&mut self) {
        let gamma = match parse_input(&self.tr, "γ", &self.default_gamma_input) {
            Ok(g) => g,
            Err(e) => {
                self.settings_status = Some(e);
                return;
            }
        };
        self.config.language = self.lang_input.clone();
        self.config.gamma = gamma;
        self.config.window_alpha = self.window_alpha;
        let resolved = i18n::resolve_language(&self.config.language, None);
        self.tr = Translator::new_with_pack(&resolved, self.config.language_pack_dir.as_deref());
        self.settings_status = Some(match self.config.save_to(&self.config_path) {
            Ok(()) => self.txt("gui.settings.saved", "Saved."),
            Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)),
        });
    }

    /// 사이드 메뉴를 제공한다.
    fn ui_nav(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading(self.txt("gui.nav.heading", "Menu"));
            ui.add_space(8.0);
        });
        for (tab, label) in [
            (Tab::Fanno, self.txt("gui.tab.fanno", "Fanno Flow")),
            (Tab::Isentropic, self.txt("gui.tab.isentropic", "Isentropic Flow")),
            (Tab::Moody, self.txt("gui.tab.moody", "Moody Chart")),
        ] {
            let selected = self.tab == tab;
            let button = egui::Button::new(label)
                .fill(if selected {
                    ui.visuals().selection.bg_fill
                } else {
                    ui.visuals().extreme_bg_color
                })
                .min_size(egui::vec2(ui.available_width(), 32.0));
            if ui.add(button).clicked() {
                self.tab = tab;
            }
            ui.add_space(4.0);
        }
    }

    fn ui_gamma(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.txt("gui.input.gamma", "γ (blank = default)"));
            ui.add(egui::TextEdit::singleline(&mut self.gamma_input).hint_text(self.config.gamma.to_string()));
        });
    }

    fn ui_branch(ui: &mut egui::Ui, branch: &mut Branch, subsonic: String, supersonic: String) {
        ui.horizontal(|ui| {
            ui.radio_value(branch, Branch::Subsonic, subsonic);
            ui.radio_value(branch, Branch::Supersonic, supersonic);
        });
    }

    fn ui_fanno(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.txt("gui.tab.fanno", "Fanno Flow"));
        ui.separator();
        ui.radio_value(&mut self.fanno_inverse, false, self.tr.t(keys::FANNO_MODE_FORWARD).to_string());
        ui.radio_value(&mut self.fanno_inverse, true, self.tr.t(keys::FANNO_MODE_INVERSE).to_string());
        self.ui_gamma(ui);

        if self.fanno_inverse {
            ui.horizontal(|ui| {
                ui.label(self.txt("gui.input.ratio", "Ratio"));
                egui::ComboBox::from_id_source("fanno_ratio")
                    .selected_text(self.fanno_ratio.label())
                    .show_ui(ui, |ui| {
                        for r in FannoRatio::ALL {
                            ui.selectable_value(&mut self.fanno_ratio, r, r.label());
                        }
                    });
                ui.label(self.txt("gui.input.value", "Value"));
                ui.text_edit_singleline(&mut self.fanno_value);
            });
            let (sub, sup) = (
                self.txt("gui.branch.subsonic", "Subsonic"),
                self.txt("gui.branch.supersonic", "Supersonic"),
            );
            Self::ui_branch(ui, &mut self.fanno_branch, sub, sup);
        } else {
            ui.horizontal(|ui| {
                ui.label("M");
                ui.text_edit_singleline(&mut self.fanno_mach);
            });
        }

        if ui.button(self.txt("gui.button.calculate", "Calculate")).clicked() {
            self.fanno_result = Some(self.compute_fanno());
        }
        show_result(ui, self.fanno_result.as_ref());
    }

    fn ui_isentropic(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.txt("gui.tab.isentropic", "Isentropic Flow"));
        ui.separator();
        ui.radio_value(&mut self.isen_inverse, false, self.tr.t(keys::ISEN_MODE_FORWARD).to_string());
        ui.radio_value(&mut self.isen_inverse, true, self.tr.t(keys::ISEN_MODE_INVERSE).to_string());
        self.ui_gamma(ui);

        if self.isen_inverse {
            ui.horizontal(|ui| {
                ui.label(self.txt("gui.input.ratio", "Ratio"));
                egui::ComboBox::from_id_source("isen_ratio")
                    .selected_text(self.isen_ratio.label())
                    .show_ui(ui, |ui| {
                        for r in IsentropicRatio::ALL {
                            ui.selectable_value(&mut self.isen_ratio, r, r.label());
                        }
                    });
                ui.label(self.txt("gui.input.value", "Value"));
                ui.text_edit_singleline(&mut self.isen_value);
            });
            if self.isen_ratio.needs_branch() {
                let (sub, sup) = (
                    self.txt("gui.branch.subsonic", "Subsonic"),
                    self.txt("gui.branch.supersonic", "Supersonic"),
                );
                Self::ui_branch(ui, &mut self.isen_branch, sub, sup);
            }
        } else {
            ui.horizontal(|ui| {
                ui.label("M");
                ui.text_edit_singleline(&mut self.isen_mach);
            });
        }

        if ui.button(self.txt("gui.button.calculate", "Calculate")).clicked() {
            self.isen_result = Some(self.compute_isentropic());
        }
        show_result(ui, self.isen_result.as_ref());
    }

    fn ui_moody(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.txt("gui.tab.moody", "Moody Chart"));
        ui.separator();
        ui.radio_value(&mut self.moody_mode, MoodyMode::Friction, self.tr.t(keys::MOODY_MODE_FRICTION).to_string());
        ui.radio_value(&mut self.moody_mode, MoodyMode::Reynolds, self.tr.t(keys::MOODY_MODE_REYNOLDS).to_string());
        ui.radio_value(&mut self.moody_mode, MoodyMode::Roughness, self.tr.t(keys::MOODY_MODE_ROUGHNESS).to_string());

        egui::Grid::new("moody_inputs").num_columns(2).show(ui, |ui| {
            if self.moody_mode != MoodyMode::Reynolds {
                ui.label("Re");
                ui.text_edit_singleline(&mut self.moody_re);
                ui.end_row();
            }
            if self.moody_mode != MoodyMode::Roughness {
                ui.label("ε/D");
                ui.text_edit_singleline(&mut self.moody_eps);
                ui.end_row();
            }
            if self.moody_mode != MoodyMode::Friction {
                ui.label("f");
                ui.text_edit_singleline(&mut self.moody_f);
                ui.end_row();
            }
        });
        if ui.button(self.txt("gui.button.calculate", "Calculate")).clicked() {
            self.moody_result = Some(self.compute_moody());
        }
        show_result(ui, self.moody_result.as_ref());

        ui.separator();
        ui.label(self.txt("gui.moody.roughness_list", "ε/D list (comma separated, blank for defaults)"));
        ui.text_edit_singleline(&mut self.roughness_input);
        ui.horizontal(|ui| {
            if ui.button(self.txt("gui.moody.draw", "Draw chart")).clicked() {
                match self.build_chart() {
                    Ok(chart) => {
                        self.chart = Some(chart);
                        self.chart_status = None;
                    }
                    Err(e) => self.chart_status = Some(e),
                }
            }
            let export = ui.add_enabled(
                self.chart.is_some(),
                egui::Button::new(self.txt("gui.moody.export", "Export CSV")),
            );
            if export.clicked() {
                self.export_chart();
            }
        });
        if let Some(msg) = &self.chart_status {
            ui.label(msg);
        }
        if let Some(chart) = &self.chart {
            ui.label(self.tr.t(keys::MOODY_CHART_TITLE).to_string());
            plot::moody_plot(ui, chart);
        }
    }

    fn export_chart(&mut self) {
        let Some(chart) = &self.chart else {
            return;
        };
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("moody_chart.csv")
            .save_file()
        else {
            return;
        };
        self.chart_status = Some(match write_chart_csv(chart, &path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "moody chart exported");
                self.tr.fill(keys::MOODY_CHART_SAVED, &[("path", path.display().to_string())])
            }
            Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)),
        });
    }

    fn ui_settings(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings_modal;
        let mut save_clicked = false;
        egui::Window::new(self.txt("gui.settings.title", "Settings"))
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(self.txt("gui.settings.lang", "Language"));
                egui::ComboBox::from_id_source("lang_choice")
                    .selected_text(self.lang_input.clone())
                    .show_ui(ui, |ui| {
                        let auto = self.txt("gui.settings.lang_auto", "System");
                        ui.selectable_value(&mut self.lang_input, "auto".into(), auto);
                        ui.selectable_value(&mut self.lang_input, "en-us".into(), "English (US)");
                        ui.selectable_value(&mut self.lang_input, "ko-kr".into(), "한국어");
                        ui.selectable_value(&mut self.lang_input, "zh-cn".into(), "简体中文");
                    });
                ui.separator();
                ui.horizontal(|ui| {
                    ui.label(self.txt("gui.settings.gamma", "Default γ"));
                    ui.text_edit_singleline(&mut self.default_gamma_input);
                });
                ui.separator();
                ui.label(self.txt("gui.settings.alpha", "Window transparency"));
                ui.add(egui::Slider::new(&mut self.window_alpha, 0.3..=1.0).text("alpha"));
                ui.separator();
                if ui.button(self.txt("gui.settings.save", "Save settings")).clicked() {
                    save_clicked = true;
                }
                if let Some(msg) = &self.settings_status {
                    ui.label(msg);
                }
            });
        if save_clicked {
            self.save_settings();
        }
        self.show_settings_modal = open;
    }
}

fn show_result(ui: &mut egui::Ui, result: Option<&Result<CalcOutput, String>>) {
    match result {
        Some(Ok(out)) => {
            for line in &out.lines {
                ui.monospace(line.as_str());
            }
            if let Some(w) = &out.warning {
                ui.colored_label(egui::Color32::YELLOW, w.as_str());
            }
        }
        Some(Err(e)) => {
            ui.colored_label(egui::Color32::RED, e.as_str());
        }
        None => {}
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 투명도 적용
        let mut style = (*ctx.style()).clone();
        style.visuals.window_fill = style.visuals.window_fill.linear_multiply(self.window_alpha);
        style.visuals.panel_fill = style.visuals.panel_fill.linear_multiply(self.window_alpha);
        ctx.set_style(style);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.txt("gui.app_title", "Compressible Flow Toolbox"));
                ui.separator();
                if ui.button(self.txt("gui.settings.title", "Settings")).clicked() {
                    self.show_settings_modal = true;
                }
            });
        });

        if self.show_settings_modal {
            self.ui_settings(ctx);
        }

        egui::SidePanel::left("nav")
            .resizable(true)
            .min_width(140.0)
            .default_width(180.0)
            .show(ctx, |ui| {
                self.ui_nav(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.tab {
                    Tab::Fanno => self.ui_fanno(ui),
                    Tab::Isentropic => self.ui_isentropic(ui),
                    Tab::Moody => self.ui_moody(ui),
                });
        });
    }
}
