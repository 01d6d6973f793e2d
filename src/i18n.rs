use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const WARN_NOT_CONVERGED: &str = "general.warn_not_converged";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_FANNO: &str = "main_menu.fanno";
    pub const MAIN_MENU_ISENTROPIC: &str = "main_menu.isentropic";
    pub const MAIN_MENU_MOODY: &str = "main_menu.moody";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const MODE_HEADING: &str = "mode.heading";
    pub const PROMPT_MODE_TWO: &str = "prompt.mode_two";
    pub const ERROR_MODE_TWO: &str = "error.mode_two";
    pub const PROMPT_GAMMA: &str = "prompt.gamma";
    pub const PROMPT_MACH: &str = "prompt.mach";
    pub const PROMPT_RATIO_CHOICE: &str = "prompt.ratio_choice";
    pub const PROMPT_RATIO_VALUE: &str = "prompt.ratio_value";
    pub const PROMPT_BRANCH: &str = "prompt.branch";
    pub const ERROR_RATIO_CHOICE: &str = "error.ratio_choice";
    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";
    pub const RATIO_OPTIONS_HEADING: &str = "ratio.options_heading";

    pub const FANNO_HEADING: &str = "fanno.heading";
    pub const FANNO_MODE_FORWARD: &str = "fanno.mode_forward";
    pub const FANNO_MODE_INVERSE: &str = "fanno.mode_inverse";
    pub const FANNO_RESULT_FORWARD: &str = "fanno.result_forward";
    pub const FANNO_RESULT_MACH: &str = "fanno.result_mach";
    pub const FANNO_RESULT_OTHERS: &str = "fanno.result_others";

    pub const ISEN_HEADING: &str = "isentropic.heading";
    pub const ISEN_MODE_FORWARD: &str = "isentropic.mode_forward";
    pub const ISEN_MODE_INVERSE: &str = "isentropic.mode_inverse";
    pub const ISEN_RATIO_TYPES: &str = "isentropic.ratio_types";
    pub const ISEN_PROMPT_AREA_BRANCH: &str = "isentropic.prompt_area_branch";
    pub const ISEN_RESULT_FORWARD: &str = "isentropic.result_forward";
    pub const ISEN_RESULT_MACH: &str = "isentropic.result_mach";

    pub const MOODY_HEADING: &str = "moody.heading";
    pub const MOODY_MODE_FRICTION: &str = "moody.mode_friction";
    pub const MOODY_MODE_REYNOLDS: &str = "moody.mode_reynolds";
    pub const MOODY_MODE_ROUGHNESS: &str = "moody.mode_roughness";
    pub const MOODY_MODE_CHART: &str = "moody.mode_chart";
    pub const PROMPT_MOODY_MODE: &str = "prompt.moody_mode";
    pub const ERROR_MODE_FOUR: &str = "error.mode_four";
    pub const PROMPT_REYNOLDS: &str = "prompt.reynolds";
    pub const PROMPT_ROUGHNESS: &str = "prompt.roughness";
    pub const PROMPT_FRICTION: &str = "prompt.friction";
    pub const PROMPT_ROUGHNESS_LIST: &str = "prompt.roughness_list";
    pub const MOODY_RESULT_FRICTION: &str = "moody.result_friction";
    pub const MOODY_RESULT_REYNOLDS: &str = "moody.result_reynolds";
    pub const MOODY_RESULT_ROUGHNESS: &str = "moody.result_roughness";
    pub const MOODY_CHART_TITLE: &str = "moody.chart_title";
    pub const MOODY_CHART_SAVED: &str = "moody.chart_saved";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
    Zh,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("ko") {
            Language::Ko
        } else if c.starts_with("zh") {
            Language::Zh
        } else {
            Language::En
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
            Language::Zh => "zh",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드에 따라 번역기를 생성한다. 알 수 없는 코드는 en 으로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: built_in_pack(lang_code),
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code))
            .or_else(|| built_in_pack(lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn language_code(&self) -> &'static str {
        self.lang.as_code()
    }

    /// 번역을 가져온다. 언어팩 → 내장 테이블 → 영어 순으로 찾는다.
    pub fn t(&self, key: &str) -> Cow<'_, str> {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return Cow::Borrowed(v.as_str());
        }
        let builtin = match self.lang {
            Language::Ko => ko(key).or_else(|| en(key)),
            Language::En | Language::Zh => en(key),
        };
        Cow::Borrowed(builtin.unwrap_or("[missing translation]"))
    }

    /// 번역이 있으면 돌려준다. GUI 는 없을 때 화면에 박힌 기본 문자열을 쓴다.
    pub fn lookup(&self, key: &str) -> Option<String> {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return Some(v.clone());
        }
        match self.lang {
            Language::Ko => ko(key).or_else(|| en(key)),
            Language::En | Language::Zh => en(key),
        }
        .map(str::to_string)
    }

    /// `{name}` 자리표시자를 채운 번역을 돌려준다.
    pub fn fill(&self, key: &str, vars: &[(&str, String)]) -> String {
        fill_template(&self.t(key), vars)
    }
}

/// `{name}` 형태의 자리표시자를 치환한다.
pub fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        "ko" | "ko-kr" => Some("ko-kr".into()),
        "en" | "en-us" | "en-uk" => Some("en-us".into()),
        "zh" | "zh-cn" | "zh-hans" => Some("zh-cn".into()),
        other if other.starts_with("ko") => Some("ko-kr".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        other if other.starts_with("zh") => Some("zh-cn".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko-kr".into()),
        "en" => Some("en-us".into()),
        "zh" => Some("zh-cn".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LANG", "LC_ALL"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 로 구성된 플랫 맵 또는 섹션 테이블.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let src = fs::read_to_string(&path).ok()?;
        tracing::debug!(path = %path.display(), "loaded language pack");
        parse_toml_to_map(&src)
    };
    let lang = lang.to_lowercase();
    if let Some(map) = try_load(&lang) {
        return Some(map);
    }
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// 내장 언어팩(파일이 없어도 동작하도록 빌드 시 포함). 영어/한국어는 내장 테이블을 쓴다.
fn built_in_pack(lang: &str) -> Option<HashMap<String, String>> {
    match lang.to_lowercase().as_str() {
        "zh-cn" | "zh" => parse_toml_to_map(include_str!("../locales/zh-cn.toml")),
        _ => None,
    }
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        WARN_NOT_CONVERGED => "경고: 근 찾기가 수렴하지 않았습니다 (잔차 {residual}). 결과를 확인하세요.",
        MAIN_MENU_TITLE => "\n=== 압축성 유동 계산기 ===",
        MAIN_MENU_FANNO => "1) Fanno 유동 비",
        MAIN_MENU_ISENTROPIC => "2) 등엔트로피 유동 비",
        MAIN_MENU_MOODY => "3) Moody 선도 / 마찰계수",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        MODE_HEADING => "모드 선택:",
        PROMPT_MODE_TWO => "모드 번호 입력 (1/2): ",
        ERROR_MODE_TWO => "모드 입력 오류: 1 또는 2를 입력하세요.",
        PROMPT_GAMMA => "비열비 γ 입력 (기본 {gamma}, 엔터 시 기본값): ",
        PROMPT_MACH => "마하수 M 입력: ",
        PROMPT_RATIO_CHOICE => "비 번호 입력: ",
        PROMPT_RATIO_VALUE => "{name} 값 입력: ",
        PROMPT_BRANCH => "해 분기: 1 = 아음속, 2 = 초음속: ",
        ERROR_RATIO_CHOICE => "비 번호 입력 오류!",
        ERROR_INVALID_NUMBER => "숫자가 아닌 입력입니다",
        RATIO_OPTIONS_HEADING => "선택 가능한 비:",
        FANNO_HEADING => "\n-- Fanno 유동 비 계산 --",
        FANNO_MODE_FORWARD => "1 = M 으로 나머지 비 계산",
        FANNO_MODE_INVERSE => "2 = 비 값으로 M 을 구하고 다른 비 출력",
        FANNO_RESULT_FORWARD => "\nM={mach} 에서의 비:",
        FANNO_RESULT_MACH => "\n구한 마하수 M = {mach}",
        FANNO_RESULT_OTHERS => "대응하는 다른 비:",
        ISEN_HEADING => "\n-- 마하수 M 과 등엔트로피 비 상호 계산 (1=A/A*, 2=T/Tₜ, 3=p/pₜ, 4=ρ/ρₜ) --",
        ISEN_MODE_FORWARD => "1 = M 으로 비 계산",
        ISEN_MODE_INVERSE => "2 = 비 값으로 M 계산",
        ISEN_RATIO_TYPES => "비 종류: 1=A/A*, 2=T/Tₜ, 3=p/pₜ, 4=ρ/ρₜ",
        ISEN_PROMPT_AREA_BRANCH => "면적비 A/A* 해 분기: 1=아음속, 2=초음속: ",
        ISEN_RESULT_FORWARD => "\n마하수 M = {mach}",
        ISEN_RESULT_MACH => "\n{label} = {value} 에 대응하는 마하수 M = {mach}",
        MOODY_HEADING => "\n-- Moody 선도와 마찰계수 계산 --",
        MOODY_MODE_FRICTION => "1 = Re 와 ε/D 로 f 계산",
        MOODY_MODE_REYNOLDS => "2 = f 와 ε/D 로 Re 계산",
        MOODY_MODE_ROUGHNESS => "3 = f 와 Re 로 ε/D 계산",
        MOODY_MODE_CHART => "4 = Moody 선도 그리기",
        PROMPT_MOODY_MODE => "모드 번호 입력 (1/2/3/4): ",
        ERROR_MODE_FOUR => "모드 입력 오류: 1, 2, 3, 4 중 하나를 입력하세요.",
        PROMPT_REYNOLDS => "레이놀즈수 Re 입력: ",
        PROMPT_ROUGHNESS => "상대 거칠기 ε/D 입력: ",
        PROMPT_FRICTION => "마찰계수 f 입력: ",
        PROMPT_ROUGHNESS_LIST => "상대 거칠기 ε/D 입력 (쉼표 구분, 비우면 기본값): ",
        MOODY_RESULT_FRICTION => "\nRe={re}, ε/D={eps} → 마찰계수 f={f}",
        MOODY_RESULT_REYNOLDS => "\nf={f}, ε/D={eps} → 레이놀즈수 Re={re}",
        MOODY_RESULT_ROUGHNESS => "\nf={f}, Re={re} → 상대 거칠기 ε/D={eps}",
        MOODY_CHART_TITLE => "Moody 선도",
        MOODY_CHART_SAVED => "선도 데이터를 저장했습니다: {path}",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting application.",
        WARN_NOT_CONVERGED => "Warning: root finder did not converge (residual {residual}); check the result.",
        MAIN_MENU_TITLE => "\n=== Compressible Flow Toolbox ===",
        MAIN_MENU_FANNO => "1) Fanno flow ratios",
        MAIN_MENU_ISENTROPIC => "2) Isentropic flow ratios",
        MAIN_MENU_MOODY => "3) Moody chart / friction factor",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please try again.",
        MODE_HEADING => "Select mode:",
        PROMPT_MODE_TWO => "Mode number (1/2): ",
        ERROR_MODE_TWO => "Invalid mode, please enter 1 or 2.",
        PROMPT_GAMMA => "Specific heat ratio γ (default {gamma}, press enter to keep): ",
        PROMPT_MACH => "Mach number M: ",
        PROMPT_RATIO_CHOICE => "Ratio number: ",
        PROMPT_RATIO_VALUE => "Value of {name}: ",
        PROMPT_BRANCH => "Solution branch: 1 = subsonic, 2 = supersonic: ",
        ERROR_RATIO_CHOICE => "Invalid ratio number!",
        ERROR_INVALID_NUMBER => "not a number",
        RATIO_OPTIONS_HEADING => "Available ratios:",
        FANNO_HEADING => "\n-- Fanno flow ratios --",
        FANNO_MODE_FORWARD => "1 = given M, compute the ratios",
        FANNO_MODE_INVERSE => "2 = given a ratio, solve M and print the other ratios",
        FANNO_RESULT_FORWARD => "\nRatios at M={mach}:",
        FANNO_RESULT_MACH => "\nSolved Mach number M = {mach}",
        FANNO_RESULT_OTHERS => "Corresponding ratios:",
        ISEN_HEADING => "\n-- Mach number / isentropic ratios (1=A/A*, 2=T/Tₜ, 3=p/pₜ, 4=ρ/ρₜ) --",
        ISEN_MODE_FORWARD => "1 = given M, compute the ratios",
        ISEN_MODE_INVERSE => "2 = given a ratio, solve M",
        ISEN_RATIO_TYPES => "Ratio types: 1=A/A*, 2=T/Tₜ, 3=p/pₜ, 4=ρ/ρₜ",
        ISEN_PROMPT_AREA_BRANCH => "Area ratio A/A* branch: 1=subsonic, 2=supersonic: ",
        ISEN_RESULT_FORWARD => "\nMach number M = {mach}",
        ISEN_RESULT_MACH => "\n{label} = {value} corresponds to Mach number M = {mach}",
        MOODY_HEADING => "\n-- Moody chart and friction factor --",
        MOODY_MODE_FRICTION => "1 = given Re and ε/D, solve f",
        MOODY_MODE_REYNOLDS => "2 = given f and ε/D, solve Re",
        MOODY_MODE_ROUGHNESS => "3 = given f and Re, solve ε/D",
        MOODY_MODE_CHART => "4 = draw the Moody chart",
        PROMPT_MOODY_MODE => "Mode number (1/2/3/4): ",
        ERROR_MODE_FOUR => "Invalid mode, please enter 1, 2, 3 or 4.",
        PROMPT_REYNOLDS => "Reynolds number Re: ",
        PROMPT_ROUGHNESS => "Relative roughness ε/D: ",
        PROMPT_FRICTION => "Friction factor f: ",
        PROMPT_ROUGHNESS_LIST => "Relative roughness ε/D (comma separated, blank for defaults): ",
        MOODY_RESULT_FRICTION => "\nRe={re}, ε/D={eps} → friction factor f={f}",
        MOODY_RESULT_REYNOLDS => "\nf={f}, ε/D={eps} → Reynolds number Re={re}",
        MOODY_RESULT_ROUGHNESS => "\nf={f}, Re={re} → relative roughness ε/D={eps}",
        MOODY_CHART_TITLE => "Moody Chart",
        MOODY_CHART_SAVED => "Chart data written to {path}",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_language_codes() {
        assert_eq!(normalize_lang("ZH"), Some("zh-cn".into()));
        assert_eq!(normalize_lang("en-uk"), Some("en-us".into()));
        assert_eq!(normalize_lang("ko_KR"), Some("ko-kr".into()));
        assert_eq!(normalize_lang("auto"), None);
        assert_eq!(normalize_lang("fr"), None);
    }

    #[test]
    fn locale_strings_strip_region_and_encoding() {
        assert_eq!(normalize_locale_string("zh_CN.UTF-8"), Some("zh-cn".into()));
        assert_eq!(normalize_locale_string("ko-KR"), Some("ko-kr".into()));
        assert_eq!(normalize_locale_string("C"), None);
    }

    #[test]
    fn cli_flag_wins_over_config() {
        assert_eq!(resolve_language("ko", Some("zh-cn")), "ko-kr");
        assert_eq!(resolve_language("auto", Some("zh")), "zh-cn");
    }

    #[test]
    fn built_in_tables_cover_every_english_key() {
        use keys::*;
        for key in [MAIN_MENU_TITLE, PROMPT_GAMMA, ISEN_RESULT_MACH, MOODY_CHART_SAVED] {
            assert!(en(key).is_some(), "missing en: {key}");
            assert!(ko(key).is_some(), "missing ko: {key}");
        }
    }

    #[test]
    fn chinese_pack_is_embedded() {
        let tr = Translator::new("zh-cn");
        assert_eq!(tr.language(), Language::Zh);
        assert_eq!(tr.t(keys::FANNO_MODE_FORWARD), "1 = 已知 M 求其余比值");
    }

    #[test]
    fn fill_replaces_placeholders() {
        let tr = Translator::new("en-us");
        let s = tr.fill(keys::PROMPT_RATIO_VALUE, &[("name", "T/T*".to_string())]);
        assert_eq!(s, "Value of T/T*: ");
    }
}
