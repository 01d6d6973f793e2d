//! Moody 선도 그리기. CLI 의 차트 창과 GUI 탭이 같은 그리기 함수를 쓴다.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::moody::{MoodyChart, MoodyCurve};

/// 곡선을 log₁₀ 좌표로 바꾼다. 양수가 아니거나 유한하지 않은 점은 건너뛴다.
pub fn log_points(curve: &MoodyCurve) -> Vec<[f64; 2]> {
    curve
        .points
        .iter()
        .filter(|p| p.reynolds > 0.0 && p.friction_factor > 0.0)
        .map(|p| [p.reynolds.log10(), p.friction_factor.log10()])
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .collect()
}

/// 주어진 UI 영역에 Moody 선도를 그린다.
pub fn moody_plot(ui: &mut egui::Ui, chart: &MoodyChart) {
    Plot::new("moody_chart")
        .view_aspect(1.6)
        .legend(Legend::default())
        .x_axis_label("log₁₀ Re")
        .y_axis_label("log₁₀ f")
        .show(ui, |plot_ui| {
            for curve in &chart.curves {
                let points: PlotPoints = log_points(curve).into();
                plot_ui.line(Line::new(points).name(curve.label()));
            }
        });
}

struct ChartWindow {
    chart: MoodyChart,
    title: String,
}

impl eframe::App for ChartWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&self.title);
            moody_plot(ui, &self.chart);
        });
    }
}

/// 차트 창을 띄운다. 사용자가 창을 닫을 때까지 블록된다.
pub fn show_moody_chart(chart: MoodyChart, title: &str) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 640.0]),
        ..Default::default()
    };
    let title_owned = title.to_string();
    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| {
            Box::new(ChartWindow {
                chart,
                title: title_owned,
            })
        }),
    )
}
