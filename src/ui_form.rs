//! GUI/CLI 가 공유하는 입력 폼. 문자열 입력을 숫자로 바꿔 모델에 전달한다.

use thiserror::Error;

use crate::config::CircuitDefaults;
use crate::electrical::{PowerError, PowerModel, SolveReport};
use crate::i18n::{keys, Translator};
use crate::quantity::{Phase, PowerField, PowerQuantity};

/// 폼 처리 중 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// 숫자로 해석할 수 없는 입력
    #[error("Please provide only decimal numbers")]
    NotANumber { field: PowerField },
    #[error(transparent)]
    Power(#[from] PowerError),
}

impl FormError {
    /// 사용자에게 보여줄 메시지. 범위 오류는 모델이 준 사유를 그대로 쓴다.
    pub fn message(&self, tr: &Translator) -> String {
        match self {
            FormError::NotANumber { field } => {
                format!("{} ({field})", tr.t(keys::ERROR_NOT_A_NUMBER))
            }
            FormError::Power(e) => e.to_string(),
        }
    }
}

/// 계산기 화면의 입력 상태.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorForm {
    pub phase: Phase,
    pub volts: String,
    pub power_factor: String,
    pub efficiency: String,
    pub value: String,
    pub quantity: PowerQuantity,
}

impl Default for CalculatorForm {
    fn default() -> Self {
        Self::from_defaults(&CircuitDefaults::default())
    }
}

impl CalculatorForm {
    pub fn from_defaults(circuit: &CircuitDefaults) -> Self {
        Self {
            phase: circuit.phase,
            volts: circuit.volts.to_string(),
            power_factor: circuit.power_factor.to_string(),
            efficiency: circuit.efficiency.to_string(),
            value: "0".to_string(),
            quantity: PowerQuantity::Kva,
        }
    }

    /// 입력값을 해석해 모델에 적용하고 역산한다.
    /// 어느 단계에서든 실패하면 모델은 호출 전 상태 그대로 남는다.
    pub fn calculate(&self, model: &mut PowerModel) -> Result<SolveReport, FormError> {
        let volts = parse_field(PowerField::Volts, &self.volts)?;
        let power_factor = parse_field(PowerField::PowerFactor, &self.power_factor)?;
        let efficiency = parse_field(PowerField::Efficiency, &self.efficiency)?;
        let value = parse_field(self.quantity.field(), &self.value)?;

        let mut staged = model.clone();
        staged.set_volts(volts)?;
        staged.set_power_factor(power_factor)?;
        staged.set_efficiency(efficiency)?;
        staged.set_phase(self.phase);
        staged.set(self.quantity.field(), value)?;
        let report = staged.solve_from(self.quantity)?;
        *model = staged;
        Ok(report)
    }
}

fn parse_field(field: PowerField, text: &str) -> Result<f64, FormError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| FormError::NotANumber { field })
}

/// 결과 표시용: 소수 둘째 자리까지 반올림.
pub fn format_value(value: f64) -> String {
    format!("{value:.2}")
}
