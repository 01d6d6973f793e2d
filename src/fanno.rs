//! Fanno 유동(마찰이 있는 단열 등단면 관로) 비 계산 모듈.
//!
//! 모든 비는 임계 상태(M=1, 별표 `*`) 기준이다.

use crate::solver::{self, Branch, InitialGuess, Relation, Solution, SolverConfig};

/// Fanno 유동에서 다루는 비의 종류. 메뉴 번호 1~6 순서와 같다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FannoRatio {
    /// T/T*
    Temperature,
    /// p/p*
    Pressure,
    /// pₜ/pₜ*
    StagnationPressure,
    /// fLₘₐₓ/D
    FrictionLength,
    /// Sₘₐₓ/R
    Entropy,
    /// V/V*
    Velocity,
}

impl FannoRatio {
    pub const ALL: [FannoRatio; 6] = [
        FannoRatio::Temperature,
        FannoRatio::Pressure,
        FannoRatio::StagnationPressure,
        FannoRatio::FrictionLength,
        FannoRatio::Entropy,
        FannoRatio::Velocity,
    ];

    /// 화면 표시용 라벨.
    pub fn label(self) -> &'static str {
        match self {
            FannoRatio::Temperature => "T/T*",
            FannoRatio::Pressure => "p/p*",
            FannoRatio::StagnationPressure => "pₜ/pₜ*",
            FannoRatio::FrictionLength => "fLₘₐₓ/D",
            FannoRatio::Entropy => "Sₘₐₓ/R",
            FannoRatio::Velocity => "V/V*",
        }
    }

    /// 메뉴 번호("1"~"6")를 해석한다.
    pub fn from_code(code: &str) -> Option<Self> {
        let n: usize = code.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl Relation for FannoRatio {
    fn evaluate(self, mach: f64, gamma: f64) -> f64 {
        FannoRatios::at(mach, gamma).get(self)
    }
}

/// 마하수 하나로부터 계산한 Fanno 비 묶음.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FannoRatios {
    pub temperature: f64,
    pub pressure: f64,
    pub stagnation_pressure: f64,
    pub friction_length: f64,
    pub entropy: f64,
    pub velocity: f64,
}

impl FannoRatios {
    /// 마하수와 비열비로 모든 비를 닫힌식으로 계산한다.
    ///
    /// 입력 검증은 하지 않는다. M ≤ 0 같은 값은 `inf`/`NaN` 으로 그대로 드러난다.
    pub fn at(mach: f64, gamma: f64) -> Self {
        let m2 = mach * mach;
        let a = 1.0 + (gamma - 1.0) / 2.0 * m2;
        let b = (gamma + 1.0) / 2.0;
        let exponent = (gamma + 1.0) / (2.0 * (gamma - 1.0));

        let temperature = b / a;
        let pressure = 1.0 / mach * temperature.sqrt();
        let stagnation_pressure = 1.0 / mach * (a / b).powf(exponent);
        let friction_length = (gamma + 1.0) / (2.0 * gamma) * (b * m2 / a).ln()
            + 1.0 / gamma * (1.0 / m2 - 1.0);
        let entropy = (1.0 / mach * (a / (1.0 + (gamma - 1.0) / 2.0)).powf(exponent)).ln();
        let velocity = mach * ((gamma + 1.0) / (2.0 + (gamma - 1.0) * m2)).sqrt();

        Self {
            temperature,
            pressure,
            stagnation_pressure,
            friction_length,
            entropy,
            velocity,
        }
    }

    pub fn get(&self, ratio: FannoRatio) -> f64 {
        match ratio {
            FannoRatio::Temperature => self.temperature,
            FannoRatio::Pressure => self.pressure,
            FannoRatio::StagnationPressure => self.stagnation_pressure,
            FannoRatio::FrictionLength => self.friction_length,
            FannoRatio::Entropy => self.entropy,
            FannoRatio::Velocity => self.velocity,
        }
    }

    /// 메뉴 순서대로 (비 종류, 값) 을 돌려준다.
    pub fn iter(&self) -> impl Iterator<Item = (FannoRatio, f64)> + '_ {
        FannoRatio::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

/// 기본 초기 추정값 (아음속 0.3, 초음속 2.0).
pub const DEFAULT_GUESS: InitialGuess = InitialGuess {
    subsonic: 0.3,
    supersonic: 2.0,
};

/// 주어진 비 값을 만족하는 마하수를 역산한다.
pub fn solve_mach(
    value: f64,
    ratio: FannoRatio,
    gamma: f64,
    branch: Branch,
    guess: &InitialGuess,
    config: &SolverConfig,
) -> Solution {
    solver::invert(ratio, value, gamma, branch, guess, config)
}
