//! 등엔트로피 유동 비 계산 모듈. 정체 상태(아래첨자 t)와 임계 단면적(A*) 기준.

use crate::solver::{self, Branch, InitialGuess, Relation, Solution, SolverConfig};

/// 메뉴 번호 1=A/A*, 2=T/Tₜ, 3=p/pₜ, 4=ρ/ρₜ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsentropicRatio {
    Area,
    Temperature,
    Pressure,
    Density,
}

impl IsentropicRatio {
    pub const ALL: [IsentropicRatio; 4] = [
        IsentropicRatio::Area,
        IsentropicRatio::Temperature,
        IsentropicRatio::Pressure,
        IsentropicRatio::Density,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IsentropicRatio::Area => "A/A*",
            IsentropicRatio::Temperature => "T/Tₜ",
            IsentropicRatio::Pressure => "p/pₜ",
            IsentropicRatio::Density => "ρ/ρₜ",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(IsentropicRatio::Area),
            "2" => Some(IsentropicRatio::Temperature),
            "3" => Some(IsentropicRatio::Pressure),
            "4" => Some(IsentropicRatio::Density),
            _ => None,
        }
    }

    /// 면적비만 아음속/초음속 두 해를 가지므로 분기 입력이 필요하다.
    pub fn needs_branch(self) -> bool {
        matches!(self, IsentropicRatio::Area)
    }
}

impl Relation for IsentropicRatio {
    fn evaluate(self, mach: f64, gamma: f64) -> f64 {
        IsentropicRatios::at(mach, gamma).get(self)
    }

    fn initial_guess(self, target: f64, branch: Branch, guess: &InitialGuess) -> f64 {
        if self.needs_branch() {
            guess.for_branch(branch)
        } else if target < 1.0 {
            guess.subsonic
        } else {
            guess.supersonic
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsentropicRatios {
    pub area: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub density: f64,
}

impl IsentropicRatios {
    /// 마하수와 비열비로 네 가지 비를 계산한다. 입력 검증은 하지 않는다.
    pub fn at(mach: f64, gamma: f64) -> Self {
        let a = 1.0 + (gamma - 1.0) / 2.0 * mach * mach;
        let b = (gamma + 1.0) / 2.0;
        let area = 1.0 / mach * (a / b).powf((gamma + 1.0) / (2.0 * (gamma - 1.0)));
        let temperature = 1.0 / a;
        let pressure = temperature.powf(gamma / (gamma - 1.0));
        let density = temperature.powf(1.0 / (gamma - 1.0));
        Self {
            area,
            temperature,
            pressure,
            density,
        }
    }

    pub fn get(&self, ratio: IsentropicRatio) -> f64 {
        match ratio {
            IsentropicRatio::Area => self.area,
            IsentropicRatio::Temperature => self.temperature,
            IsentropicRatio::Pressure => self.pressure,
            IsentropicRatio::Density => self.density,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (IsentropicRatio, f64)> + '_ {
        IsentropicRatio::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

/// 기본 초기 추정값 (아음속 0.5, 초음속 2.0).
pub const DEFAULT_GUESS: InitialGuess = InitialGuess {
    subsonic: 0.5,
    supersonic: 2.0,
};

/// 비 값으로부터 마하수를 역산한다. `branch` 는 면적비에서만 의미가 있다.
pub fn solve_mach(
    value: f64,
    ratio: IsentropicRatio,
    gamma: f64,
    branch: Branch,
    guess: &InitialGuess,
    config: &SolverConfig,
) -> Solution {
    solver::invert(ratio, value, gamma, branch, guess, config)
}
