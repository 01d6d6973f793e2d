use std::io::{self, BufRead, StdinLock, Stdout, Write};

use crate::app::{AppError, ChartSink};
use crate::config::Config;
use crate::fanno::{self, FannoRatio, FannoRatios};
use crate::i18n::{keys, Translator};
use crate::isentropic::{self, IsentropicRatio, IsentropicRatios};
use crate::moody;
use crate::solver::{Branch, Solution};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Fanno,
    Isentropic,
    Moody,
    Exit,
}

/// 프롬프트 입출력. 테스트에서는 메모리 버퍼를 연결한다.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub(crate) fn say(&mut self, line: &str) -> Result<(), AppError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(buf)
    }

    /// 숫자를 읽는다. 잘못된 입력은 재입력 없이 바로 오류로 전파한다.
    fn read_f64(&mut self, prompt: &str) -> Result<f64, AppError> {
        let s = self.read_line(prompt)?;
        parse_number(&s)
    }
}

fn parse_number(s: &str) -> Result<f64, AppError> {
    s.trim().parse::<f64>().map_err(|_| AppError::InvalidNumber {
        input: s.trim().to_string(),
    })
}

/// 소수점 6자리 표기.
pub fn fmt6(v: f64) -> String {
    format!("{v:.6}")
}

/// 레이놀즈수용 지수 표기 (`1.00e+05`).
pub fn sci(v: f64) -> String {
    let s = format!("{v:.2e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(e) => format!("{mantissa}e{}{:02}", if e < 0 { '-' } else { '+' }, e.abs()),
            Err(_) => s,
        },
        None => s,
    }
}

/// 수렴하지 못한 해도 그대로 쓰되 경고를 남긴다.
fn warn_if_not_converged(tr: &Translator, sol: &Solution) {
    if !sol.converged {
        tracing::warn!(
            x = sol.x,
            iterations = sol.iterations,
            "{}",
            tr.fill(keys::WARN_NOT_CONVERGED, &[("residual", format!("{:e}", sol.residual))])
        );
    }
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
) -> Result<MenuChoice, AppError> {
    con.say(&tr.t(keys::MAIN_MENU_TITLE))?;
    con.say(&tr.t(keys::MAIN_MENU_FANNO))?;
    con.say(&tr.t(keys::MAIN_MENU_ISENTROPIC))?;
    con.say(&tr.t(keys::MAIN_MENU_MOODY))?;
    con.say(&tr.t(keys::MAIN_MENU_EXIT))?;
    loop {
        let sel = con.read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::Fanno),
            "2" => return Ok(MenuChoice::Isentropic),
            "3" => return Ok(MenuChoice::Moody),
            "0" => return Ok(MenuChoice::Exit),
            _ => con.say(&tr.t(keys::INVALID_SELECTION_RETRY))?,
        }
    }
}

fn read_gamma<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    cfg: &Config,
) -> Result<f64, AppError> {
    let input = con.read_line(&tr.fill(keys::PROMPT_GAMMA, &[("gamma", cfg.gamma.to_string())]))?;
    cfg.gamma_or_default(&input)
        .map_err(|_| AppError::InvalidNumber {
            input: input.trim().to_string(),
        })
}

/// Fanno 유동 메뉴를 처리한다.
pub fn handle_fanno<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    cfg: &Config,
) -> Result<(), AppError> {
    con.say(&tr.t(keys::FANNO_HEADING))?;
    con.say(&tr.t(keys::MODE_HEADING))?;
    con.say(&tr.t(keys::FANNO_MODE_FORWARD))?;
    con.say(&tr.t(keys::FANNO_MODE_INVERSE))?;
    let mode = con.read_line(&tr.t(keys::PROMPT_MODE_TWO))?;
    let gamma = read_gamma(con, tr, cfg)?;

    match mode.trim() {
        "1" => {
            let mach = con.read_f64(&tr.t(keys::PROMPT_MACH))?;
            con.say(&tr.fill(keys::FANNO_RESULT_FORWARD, &[("mach", fmt6(mach))]))?;
            for (ratio, value) in FannoRatios::at(mach, gamma).iter() {
                con.say(&format!("{} = {}", ratio.label(), fmt6(value)))?;
            }
        }
        "2" => {
            con.say(&tr.t(keys::RATIO_OPTIONS_HEADING))?;
            for (i, ratio) in FannoRatio::ALL.iter().enumerate() {
                con.say(&format!("{} = {}", i + 1, ratio.label()))?;
            }
            let choice = con.read_line(&tr.t(keys::PROMPT_RATIO_CHOICE))?;
            let Some(ratio) = FannoRatio::from_code(&choice) else {
                con.say(&tr.t(keys::ERROR_RATIO_CHOICE))?;
                return Ok(());
            };
            let value = con.read_f64(&tr.fill(keys::PROMPT_RATIO_VALUE, &[("name", ratio.label().to_string())]))?;
            let branch = Branch::from_code(&con.read_line(&tr.t(keys::PROMPT_BRANCH))?);
            let sol = fanno::solve_mach(value, ratio, gamma, branch, &cfg.fanno_guess, &cfg.solver);
            warn_if_not_converged(tr, &sol);

            con.say(&tr.fill(keys::FANNO_RESULT_MACH, &[("mach", fmt6(sol.x))]))?;
            con.say(&tr.t(keys::FANNO_RESULT_OTHERS))?;
            for (other, v) in FannoRatios::at(sol.x, gamma).iter().filter(|(r, _)| *r != ratio) {
                con.say(&format!("{} = {}", other.label(), fmt6(v)))?;
            }
        }
        _ => con.say(&tr.t(keys::ERROR_MODE_TWO))?,
    }
    Ok(())
}

/// 등엔트로피 유동 메뉴를 처리한다.
pub fn handle_isentropic<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    cfg: &Config,
) -> Result<(), AppError> {
    con.say(&tr.t(keys::ISEN_HEADING))?;
    con.say(&tr.t(keys::MODE_HEADING))?;
    con.say(&tr.t(keys::ISEN_MODE_FORWARD))?;
    con.say(&tr.t(keys::ISEN_MODE_INVERSE))?;
    let mode = con.read_line(&tr.t(keys::PROMPT_MODE_TWO))?;
    let gamma = read_gamma(con, tr, cfg)?;

    let (mach, ratios) = match mode.trim() {
        "1" => {
            let mach = con.read_f64(&tr.t(keys::PROMPT_MACH))?;
            con.say(&tr.fill(keys::ISEN_RESULT_FORWARD, &[("mach", format!("{mach:?}"))]))?;
            (mach, IsentropicRatios::at(mach, gamma))
        }
        "2" => {
            con.say(&tr.t(keys::ISEN_RATIO_TYPES))?;
            let choice = con.read_line(&tr.t(keys::PROMPT_RATIO_CHOICE))?;
            let Some(ratio) = IsentropicRatio::from_code(&choice) else {
                con.say(&tr.t(keys::ERROR_RATIO_CHOICE))?;
                return Ok(());
            };
            let value = con.read_f64(&tr.fill(keys::PROMPT_RATIO_VALUE, &[("name", ratio.label().to_string())]))?;
            let branch = if ratio.needs_branch() {
                Branch::from_code(&con.read_line(&tr.t(keys::ISEN_PROMPT_AREA_BRANCH))?)
            } else {
                Branch::Supersonic
            };
            let sol = isentropic::solve_mach(value, ratio, gamma, branch, &cfg.isentropic_guess, &cfg.solver);
            warn_if_not_converged(tr, &sol);
            con.say(&tr.fill(
                keys::ISEN_RESULT_MACH,
                &[
                    ("label", ratio.label().to_string()),
                    ("value", format!("{value:?}")),
                    ("mach", fmt6(sol.x)),
                ],
            ))?;
            (sol.x, IsentropicRatios::at(sol.x, gamma))
        }
        _ => {
            con.say(&tr.t(keys::ERROR_MODE_TWO))?;
            return Ok(());
        }
    };

    tracing::debug!(mach, gamma, "isentropic ratios evaluated");
    for (ratio, value) in ratios.iter() {
        con.say(&format!("{} = {}", ratio.label(), fmt6(value)))?;
    }
    Ok(())
}

/// Moody 선도 / 마찰계수 메뉴를 처리한다.
pub fn handle_moody<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    cfg: &Config,
    sink: &mut dyn ChartSink,
) -> Result<(), AppError> {
    con.say(&tr.t(keys::MOODY_HEADING))?;
    con.say(&tr.t(keys::MODE_HEADING))?;
    con.say(&tr.t(keys::MOODY_MODE_FRICTION))?;
    con.say(&tr.t(keys::MOODY_MODE_REYNOLDS))?;
    con.say(&tr.t(keys::MOODY_MODE_ROUGHNESS))?;
    con.say(&tr.t(keys::MOODY_MODE_CHART))?;
    let mode = con.read_line(&tr.t(keys::PROMPT_MOODY_MODE))?;
    let guess = &cfg.colebrook_guess;

    match mode.trim() {
        "1" => {
            let re = con.read_f64(&tr.t(keys::PROMPT_REYNOLDS))?;
            let eps = con.read_f64(&tr.t(keys::PROMPT_ROUGHNESS))?;
            let sol = moody::solve_friction_factor(re, eps, guess, &cfg.solver);
            warn_if_not_converged(tr, &sol);
            con.say(&tr.fill(
                keys::MOODY_RESULT_FRICTION,
                &[("re", sci(re)), ("eps", fmt6(eps)), ("f", fmt6(sol.x))],
            ))?;
        }
        "2" => {
            let f = con.read_f64(&tr.t(keys::PROMPT_FRICTION))?;
            let eps = con.read_f64(&tr.t(keys::PROMPT_ROUGHNESS))?;
            let sol = moody::solve_reynolds(f, eps, guess, &cfg.solver);
            warn_if_not_converged(tr, &sol);
            con.say(&tr.fill(
                keys::MOODY_RESULT_REYNOLDS,
                &[("f", fmt6(f)), ("eps", fmt6(eps)), ("re", sci(sol.x))],
            ))?;
        }
        "3" => {
            let f = con.read_f64(&tr.t(keys::PROMPT_FRICTION))?;
            let re = con.read_f64(&tr.t(keys::PROMPT_REYNOLDS))?;
            let sol = moody::solve_relative_roughness(f, re, guess, &cfg.solver);
            warn_if_not_converged(tr, &sol);
            con.say(&tr.fill(
                keys::MOODY_RESULT_ROUGHNESS,
                &[("f", fmt6(f)), ("re", sci(re)), ("eps", fmt6(sol.x))],
            ))?;
        }
        "4" => {
            let list = con.read_line(&tr.t(keys::PROMPT_ROUGHNESS_LIST))?;
            let mut spec = cfg.moody_chart.clone();
            if !list.trim().is_empty() {
                spec.relative_roughness =
                    moody::parse_roughness_list(list.trim()).map_err(|_| AppError::InvalidNumber {
                        input: list.trim().to_string(),
                    })?;
            }
            let chart = moody::sweep(&spec, guess, &cfg.solver);
            if let Some(path) = sink.present(&chart, &tr.t(keys::MOODY_CHART_TITLE))? {
                con.say(&tr.fill(keys::MOODY_CHART_SAVED, &[("path", path.display().to_string())]))?;
            }
        }
        _ => con.say(&tr.t(keys::ERROR_MODE_FOUR))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci_matches_printf_style_exponent() {
        assert_eq!(sci(1e5), "1.00e+05");
        assert_eq!(sci(4000.0), "4.00e+03");
        assert_eq!(sci(123456789.0), "1.23e+08");
        assert_eq!(sci(0.00025), "2.50e-04");
    }

    #[test]
    fn fmt6_rounds_to_six_places() {
        assert_eq!(fmt6(2.0 / 3.0), "0.666667");
        assert_eq!(fmt6(0.0), "0.000000");
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number(" 2.5\n").unwrap(), 2.5);
        assert!(matches!(
            parse_number("abc"),
            Err(AppError::InvalidNumber { input }) if input == "abc"
        ));
    }
}
