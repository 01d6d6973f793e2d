//! 압축성 유동(Fanno, 등엔트로피)과 관 마찰(Moody 선도) 계산을 라이브러리로 분리하여 CLI 와 GUI 가 함께 쓴다.

pub mod app;
pub mod config;
pub mod fanno;
pub mod i18n;
pub mod isentropic;
pub mod moody;
pub mod plot;
pub mod solver;
pub mod ui_cli;
