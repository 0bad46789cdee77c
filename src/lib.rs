//! 전력/전류 환산 로직을 라이브러리로 분리하여 CLI 와 GUI 가 함께 사용한다.

pub mod app;
pub mod config;
pub mod electrical;
pub mod i18n;
pub mod logging;
pub mod quantity;
pub mod ui_cli;
pub mod ui_form;
