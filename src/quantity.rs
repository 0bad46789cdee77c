use serde::{Deserialize, Serialize};

/// 사용자가 직접 입력하여 나머지를 역산할 수 있는 네 가지 물리량.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerQuantity {
    /// 피상전력 [kVA]
    Kva,
    /// 유효전력 [kW]
    Kw,
    /// 축동력 [hp]
    Hp,
    /// RMS 전류 [A]
    Amps,
}

impl PowerQuantity {
    pub const ALL: [PowerQuantity; 4] = [
        PowerQuantity::Kva,
        PowerQuantity::Kw,
        PowerQuantity::Hp,
        PowerQuantity::Amps,
    ];

    /// 화면 표시용 단위 기호.
    pub fn symbol(self) -> &'static str {
        match self {
            PowerQuantity::Kva => "kVA",
            PowerQuantity::Kw => "kW",
            PowerQuantity::Hp => "hp",
            PowerQuantity::Amps => "Amps",
        }
    }

    /// 모델 필드와의 대응.
    pub fn field(self) -> PowerField {
        match self {
            PowerQuantity::Kva => PowerField::Kva,
            PowerQuantity::Kw => PowerField::Kw,
            PowerQuantity::Hp => PowerField::Hp,
            PowerQuantity::Amps => PowerField::Amps,
        }
    }
}

impl std::fmt::Display for PowerQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 계산 모델이 보관하는 모든 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerField {
    Volts,
    PowerFactor,
    Efficiency,
    ThreePhase,
    Hp,
    Amps,
    Kva,
    Kw,
}

impl PowerField {
    pub fn name(self) -> &'static str {
        match self {
            PowerField::Volts => "Volts",
            PowerField::PowerFactor => "Power factor",
            PowerField::Efficiency => "Efficiency",
            PowerField::ThreePhase => "Phase",
            PowerField::Hp => "hp",
            PowerField::Amps => "Amps",
            PowerField::Kva => "kVA",
            PowerField::Kw => "kW",
        }
    }
}

impl std::fmt::Display for PowerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 단상/삼상 구분. 모델 내부에서는 0/1 숫자로 저장된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    Single,
    #[default]
    Three,
}

impl Phase {
    /// `threephase` 필드 값(0 또는 1).
    pub fn as_selector(self) -> f64 {
        match self {
            Phase::Single => 0.0,
            Phase::Three => 1.0,
        }
    }

    /// 0/1 값을 Phase로 해석한다. 그 외 값은 None.
    pub fn from_selector(value: f64) -> Option<Phase> {
        if value == 0.0 {
            Some(Phase::Single)
        } else if value == 1.0 {
            Some(Phase::Three)
        } else {
            None
        }
    }
}
