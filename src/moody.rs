//! Colebrook 식 기반 마찰계수 계산과 Moody 선도 데이터 생성.
//!
//! Colebrook 식은 f 에 대해 음함수이므로 "정방향" 계산인 f 구하기도 근 찾기다.

use std::io::{self, Write};
use std::num::ParseFloatError;

use serde::{Deserialize, Serialize};

use crate::solver::{find_root, Solution, SolverConfig};

/// Colebrook 잔차: 1/√f + 2·log10(ε/D / 3.7 + 2.51 / (Re·√f)).
pub fn colebrook(friction_factor: f64, reynolds: f64, relative_roughness: f64) -> f64 {
    let sqrt_f = friction_factor.sqrt();
    1.0 / sqrt_f + 2.0 * (relative_roughness / 3.7 + 2.51 / (reynolds * sqrt_f)).log10()
}

/// 미지수별 초기 추정값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColebrookGuess {
    pub friction_factor: f64,
    pub reynolds: f64,
    pub relative_roughness: f64,
}

impl Default for ColebrookGuess {
    fn default() -> Self {
        Self {
            friction_factor: 0.02,
            reynolds: 1e5,
            relative_roughness: 0.0001,
        }
    }
}

/// Re 와 ε/D 로 마찰계수 f 를 구한다.
pub fn solve_friction_factor(
    reynolds: f64,
    relative_roughness: f64,
    guess: &ColebrookGuess,
    config: &SolverConfig,
) -> Solution {
    find_root(
        |f| colebrook(f, reynolds, relative_roughness),
        guess.friction_factor,
        config,
    )
}

/// f 와 ε/D 로 레이놀즈수를 구한다.
pub fn solve_reynolds(
    friction_factor: f64,
    relative_roughness: f64,
    guess: &ColebrookGuess,
    config: &SolverConfig,
) -> Solution {
    find_root(
        |re| colebrook(friction_factor, re, relative_roughness),
        guess.reynolds,
        config,
    )
}

/// f 와 Re 로 상대 거칠기 ε/D 를 구한다. 매끈한 관 한계보다 작은 f 를 주면 음수가 나올 수 있다.
pub fn solve_relative_roughness(
    friction_factor: f64,
    reynolds: f64,
    guess: &ColebrookGuess,
    config: &SolverConfig,
) -> Solution {
    find_root(
        |eps| colebrook(friction_factor, reynolds, eps),
        guess.relative_roughness,
        config,
    )
}

/// Moody 선도 스윕 조건.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSpec {
    pub relative_roughness: Vec<f64>,
    pub reynolds_min: f64,
    pub reynolds_max: f64,
    pub points: usize,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            relative_roughness: vec![0.0001, 0.0002, 0.0005, 0.001, 0.002],
            reynolds_min: 4000.0,
            reynolds_max: 1e8,
            points: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub reynolds: f64,
    pub friction_factor: f64,
}

/// ε/D 하나에 대한 곡선.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodyCurve {
    pub relative_roughness: f64,
    pub points: Vec<ChartPoint>,
}

impl MoodyCurve {
    /// 범례 라벨 (예: `ε/D=0.0001`).
    pub fn label(&self) -> String {
        format!("ε/D={}", self.relative_roughness)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MoodyChart {
    pub curves: Vec<MoodyCurve>,
}

impl MoodyChart {
    /// `relative_roughness,reynolds,friction_factor` 형식의 CSV 로 내보낸다.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "relative_roughness,reynolds,friction_factor")?;
        for curve in &self.curves {
            for p in &curve.points {
                writeln!(
                    out,
                    "{},{:e},{}",
                    curve.relative_roughness, p.reynolds, p.friction_factor
                )?;
            }
        }
        Ok(())
    }
}

/// 양 끝점을 포함하는 로그 등간격 수열. 끝점은 입력값 그대로 둔다.
pub fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let (a, b) = (start.log10(), stop.log10());
            let step = (b - a) / (n - 1) as f64;
            let mut v: Vec<f64> = (0..n).map(|i| 10f64.powf(a + step * i as f64)).collect();
            v[0] = start;
            v[n - 1] = stop;
            v
        }
    }
}

/// 각 ε/D 에 대해 Re 범위를 로그 등간격으로 훑으며 f 를 구한다.
pub fn sweep(spec: &ChartSpec, guess: &ColebrookGuess, config: &SolverConfig) -> MoodyChart {
    let reynolds = logspace(spec.reynolds_min, spec.reynolds_max, spec.points);
    tracing::info!(
        curves = spec.relative_roughness.len(),
        points = reynolds.len(),
        "sweeping moody chart"
    );
    let curves = spec
        .relative_roughness
        .iter()
        .map(|&eps| {
            let points = reynolds
                .iter()
                .map(|&re| {
                    let sol = solve_friction_factor(re, eps, guess, config);
                    if !sol.converged {
                        tracing::warn!(re, eps, residual = sol.residual, "friction factor did not converge");
                    }
                    ChartPoint {
                        reynolds: re,
                        friction_factor: sol.x,
                    }
                })
                .collect();
            MoodyCurve {
                relative_roughness: eps,
                points,
            }
        })
        .collect();
    MoodyChart { curves }
}

/// 쉼표로 구분된 ε/D 목록을 해석한다. 빈 입력 처리는 호출자 몫이다.
pub fn parse_roughness_list(input: &str) -> Result<Vec<f64>, ParseFloatError> {
    input.split(',').map(|s| s.trim().parse::<f64>()).collect()
}
