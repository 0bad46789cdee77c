use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::electrical::{PowerError, PowerModel, SolveReport};
use crate::i18n::{self, Translator};
use crate::quantity::{Phase, PowerQuantity};
use crate::ui_cli::{self, Console, MenuChoice};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Power(#[from] PowerError),
}

/// 한 번에 계산할 요청. 비어 있는 회로 조건은 설정 파일의 기본값을 쓴다.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRequest {
    pub from: PowerQuantity,
    pub value: f64,
    pub volts: Option<f64>,
    pub power_factor: Option<f64>,
    pub efficiency: Option<f64>,
    pub phase: Option<Phase>,
}

impl SolveRequest {
    pub fn new(from: PowerQuantity, value: f64) -> Self {
        Self {
            from,
            value,
            volts: None,
            power_factor: None,
            efficiency: None,
            phase: None,
        }
    }
}

/// 비대화식 계산. 결과 보고서를 돌려준다.
pub fn solve_once(config: &Config, req: &SolveRequest) -> Result<SolveReport, AppError> {
    let mut model = config.new_model()?;
    if let Some(v) = req.volts {
        model.set_volts(v)?;
    }
    if let Some(pf) = req.power_factor {
        model.set_power_factor(pf)?;
    }
    if let Some(eff) = req.efficiency {
        model.set_efficiency(eff)?;
    }
    if let Some(phase) = req.phase {
        model.set_phase(phase);
    }
    model.set(req.from.field(), req.value)?;
    let report = model.solve_from(req.from)?;
    info!(from = %req.from, value = req.value, "one-shot solve finished");
    Ok(report)
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run(config: &mut Config, tr: &mut Translator) -> Result<(), AppError> {
    let mut console = Console::stdio();
    run_with(&mut console, config, tr)
}

/// 입출력을 주입받는 메인 루프. 계산 오류는 출력만 하고 루프를 계속한다.
pub fn run_with<R, W>(
    console: &mut Console<R, W>,
    config: &mut Config,
    tr: &mut Translator,
) -> Result<(), AppError>
where
    R: std::io::BufRead,
    W: std::io::Write,
{
    let mut model = match config.new_model() {
        Ok(model) => model,
        Err(e) => {
            warn!(error = %e, "stored circuit defaults rejected, using built-in defaults");
            console.error(tr, &e)?;
            PowerModel::new()
        }
    };
    loop {
        match ui_cli::main_menu(console, tr)? {
            MenuChoice::Calculate => ui_cli::handle_calculate(console, tr, &mut model)?,
            MenuChoice::ShowModel => ui_cli::handle_show_model(console, tr, &model)?,
            MenuChoice::Settings => {
                if let Some(lang) = ui_cli::handle_settings(console, tr, config, &model)? {
                    let resolved = i18n::resolve_language(&lang, None);
                    *tr = Translator::new_with_pack(&resolved, config.language_pack_dir.as_deref());
                }
                config.save()?;
            }
            MenuChoice::Exit => {
                config.save()?;
                console.say(tr.t(i18n::keys::APP_EXIT))?;
                break;
            }
        }
    }
    Ok(())
}
