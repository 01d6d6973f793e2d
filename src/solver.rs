//! 단일 변수 역산용 근 찾기 모듈.
//!
//! 각 계산기는 "정방향 닫힌식 + 역방향 근 찾기" 구조를 공유한다. 여기서는
//! 잔차 함수 하나와 초기 추정값 하나만 받아 도함수 없이 근을 찾는다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 비단사 관계에서 어느 해를 찾을지 고르는 분기 선택자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Branch {
    Subsonic,
    Supersonic,
}

impl Branch {
    /// 프롬프트 코드("1"=아음속, "2"=초음속)를 해석한다. "2" 이외는 모두 아음속이다.
    pub fn from_code(code: &str) -> Self {
        if code.trim() == "2" {
            Branch::Supersonic
        } else {
            Branch::Subsonic
        }
    }
}

/// 분기별 초기 추정값. 계산기마다 기본값이 달라 `Default` 는 두지 않는다.
/// config.toml 의 부분 테이블은 `config` 모듈이 계산기별 기본값으로 채운다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialGuess {
    pub subsonic: f64,
    pub supersonic: f64,
}

impl InitialGuess {
    pub fn for_branch(&self, branch: Branch) -> f64 {
        match branch {
            Branch::Subsonic => self.subsonic,
            Branch::Supersonic => self.supersonic,
        }
    }
}

/// 근 찾기 설정. 호출자에게 노출하지 않고 config.toml 에서만 조정한다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// 최대 반복 횟수
    pub max_iterations: usize,
    /// 상대 스텝 크기 수렴 기준
    pub x_tol: f64,
    /// 잔차 절대값 수렴 기준
    pub f_tol: f64,
    /// 차분 기울기 계산용 상대 스텝
    pub fd_step: f64,
    /// 선탐색 축소 비율
    pub line_search_beta: f64,
    /// 최대 선탐색 횟수
    pub max_line_search_iters: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            x_tol: 1.490_116_119_384_765_6e-8,
            f_tol: 1e-13,
            fd_step: 1.490_116_119_384_765_6e-8,
            line_search_beta: 0.5,
            max_line_search_iters: 40,
        }
    }
}

/// 근 찾기 결과. 수렴 실패여도 마지막 값을 그대로 돌려준다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub x: f64,
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// 엄격한 결과가 필요한 호출자를 위한 오류.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolveError {
    #[error("root finder did not converge: x = {x}, residual = {residual}, iterations = {iterations}")]
    NotConverged {
        x: f64,
        residual: f64,
        iterations: usize,
    },
}

impl Solution {
    /// 수렴한 경우에만 값을 돌려준다.
    pub fn into_result(self) -> Result<f64, SolveError> {
        if self.converged {
            Ok(self.x)
        } else {
            Err(SolveError::NotConverged {
                x: self.x,
                residual: self.residual,
                iterations: self.iterations,
            })
        }
    }
}

/// 차분 기울기 기반 뉴턴 반복으로 `residual(x) = 0` 의 근을 찾는다.
///
/// - 기울기는 전진 차분(실패 시 후진 차분)으로 근사한다.
/// - 선탐색은 잔차가 유한하고 절대값이 줄어드는 점만 받아들인다.
/// - 수렴하지 못해도 패닉하지 않고 `converged = false` 로 반환한다.
pub fn find_root<F>(residual: F, x0: f64, config: &SolverConfig) -> Solution
where
    F: Fn(f64) -> f64,
{
    let mut x = x0;
    let mut r = residual(x);
    if !r.is_finite() {
        return stalled(x, r, 0);
    }

    for iter in 0..config.max_iterations {
        if r.abs() <= config.f_tol {
            return finished(x, r, iter);
        }

        let h = if x == 0.0 {
            config.fd_step
        } else {
            config.fd_step * x.abs()
        };
        let forward = residual(x + h);
        let slope = if forward.is_finite() {
            (forward - r) / h
        } else {
            let backward = residual(x - h);
            if !backward.is_finite() {
                return stalled(x, r, iter);
            }
            (r - backward) / h
        };
        if slope == 0.0 || !slope.is_finite() {
            return stalled(x, r, iter);
        }

        let step = -r / slope;
        tracing::trace!(iter, x, residual = r, step, "newton step");

        if step.abs() <= config.x_tol * (x.abs() + config.x_tol) {
            let r_next = residual(x + step);
            if r_next.is_finite() {
                x += step;
                r = r_next;
            }
            return finished(x, r, iter + 1);
        }

        let mut t = 1.0;
        let mut accepted = None;
        for _ in 0..config.max_line_search_iters {
            let x_try = x + t * step;
            let r_try = residual(x_try);
            if r_try.is_finite() && r_try.abs() < r.abs() {
                accepted = Some((x_try, r_try));
                break;
            }
            t *= config.line_search_beta;
        }
        let Some((x_next, r_next)) = accepted else {
            return stalled(x, r, iter + 1);
        };

        let dx = (x_next - x).abs();
        x = x_next;
        r = r_next;
        if dx <= config.x_tol * (x.abs() + config.x_tol) {
            return finished(x, r, iter + 1);
        }
    }

    stalled(x, r, config.max_iterations)
}

fn finished(x: f64, residual: f64, iterations: usize) -> Solution {
    tracing::debug!(x, residual, iterations, "root find converged");
    Solution {
        x,
        residual,
        iterations,
        converged: true,
    }
}

fn stalled(x: f64, residual: f64, iterations: usize) -> Solution {
    tracing::debug!(x, residual, iterations, "root find stopped without converging");
    Solution {
        x,
        residual,
        iterations,
        converged: false,
    }
}

/// 마하수 하나로 결정되는 이름 있는 비(ratio).
pub trait Relation: Copy {
    /// 마하수와 비열비로부터 비를 계산한다.
    fn evaluate(self, mach: f64, gamma: f64) -> f64;

    /// 역산 시 사용할 초기 추정값. 기본은 분기 선택을 그대로 따른다.
    fn initial_guess(self, _target: f64, branch: Branch, guess: &InitialGuess) -> f64 {
        guess.for_branch(branch)
    }
}

/// 목표 비를 재현하는 마하수를 찾는다.
///
/// 마하수는 양수만 허용한다. 짝함수인 비(fLₘₐₓ/D 등)에서 뉴턴 스텝이 0 을 넘어가면
/// 잔차를 NaN 으로 돌려 선탐색이 스텝을 줄이게 한다.
pub fn invert<R: Relation>(
    relation: R,
    target: f64,
    gamma: f64,
    branch: Branch,
    guess: &InitialGuess,
    config: &SolverConfig,
) -> Solution {
    let x0 = relation.initial_guess(target, branch, guess);
    find_root(
        |mach| {
            if mach <= 0.0 {
                f64::NAN
            } else {
                relation.evaluate(mach, gamma) - target
            }
        },
        x0,
        config,
    )
}
