use thiserror::Error;
use tracing::debug;

use crate::quantity::{Phase, PowerField, PowerQuantity};

/// 1 hp 에 해당하는 전력 [W]. 산업 현장에서 쓰는 근사값.
pub const HP_WATTS: f64 = 746.0;

/// 삼상 선전류 보정 계수의 가산분. √3 − 1 을 0.73 으로 근사한다.
pub const THREE_PHASE_OFFSET: f64 = 0.73;

/// 전력 계산 중 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PowerError {
    /// 허용 범위를 벗어난 값 대입. 해당 필드는 변경되지 않는다.
    #[error("{reason}")]
    Validation { field: PowerField, reason: String },
    /// 계산식의 분모가 0. 어떤 필드도 변경되지 않는다.
    #[error("Cannot divide by zero")]
    DivisionByZero,
}

impl PowerError {
    fn validation(field: PowerField, reason: impl Into<String>) -> Self {
        PowerError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// 전력/전류 환산 모델.
///
/// 회로 조건(전압, 역률, 효율, 상수)과 서로 환산 가능한 네 물리량(hp, A, kVA, kW)을
/// 보관한다. 모든 필드는 setter 를 통해서만 바뀌며, 범위를 벗어난 값은 대입 전에 거부된다.
/// `solve_from_*` 호출 직후에만 네 물리량이 회로 조건과 서로 일치하며,
/// 읽기 시 자동 재계산은 하지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerModel {
    volts: f64,
    power_factor: f64,
    efficiency: f64,
    threephase: f64,
    hp: f64,
    amps: f64,
    kva: f64,
    kw: f64,
}

impl Default for PowerModel {
    fn default() -> Self {
        Self {
            volts: 480.0,
            power_factor: 1.0,
            efficiency: 1.0,
            threephase: 1.0,
            hp: 0.0,
            amps: 0.0,
            kva: 0.0,
            kw: 0.0,
        }
    }
}

/// 한 번의 역산 결과. 입력량과 나머지 세 물리량을 표시 순서대로 담는다.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub input: PowerQuantity,
    pub input_value: f64,
    pub outputs: [(PowerQuantity, f64); 3],
}

impl SolveReport {
    /// 특정 물리량의 결과값. 입력량이면 입력값을 돌려준다.
    pub fn value_of(&self, quantity: PowerQuantity) -> f64 {
        if quantity == self.input {
            return self.input_value;
        }
        self.outputs
            .iter()
            .find(|(q, _)| *q == quantity)
            .map(|(_, v)| *v)
            .unwrap_or(self.input_value)
    }
}

impl std::fmt::Display for SolveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (q, v)) in self.outputs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v:.2} {q}")?;
        }
        Ok(())
    }
}

/// 필드별 허용 범위를 검사한다.
fn check_range(field: PowerField, value: f64) -> Result<(), PowerError> {
    if !value.is_finite() {
        return Err(PowerError::validation(
            field,
            format!("{field} must be a finite number"),
        ));
    }
    let (ok, reason) = match field {
        PowerField::Volts => (value >= 0.0, "RMS voltage cannot be negative"),
        PowerField::PowerFactor => (
            (-1.0..=1.0).contains(&value),
            "Power factor must be between -1 and 1",
        ),
        PowerField::Efficiency => (
            (0.0..=1.0).contains(&value),
            "Efficiency must be between 0 and 1",
        ),
        PowerField::ThreePhase => (
            Phase::from_selector(value).is_some(),
            "Must be three phase or single phase",
        ),
        PowerField::Hp => (value >= 0.0, "Horsepower cannot be negative"),
        PowerField::Amps => (value >= 0.0, "RMS current cannot be negative"),
        PowerField::Kva => (value >= 0.0, "KVA cannot be negative"),
        PowerField::Kw => (value >= 0.0, "KW cannot be negative"),
    };
    if ok {
        Ok(())
    } else {
        debug!(%field, value, reason, "rejected assignment");
        Err(PowerError::validation(field, reason))
    }
}

fn divide(numerator: f64, divisor: f64) -> Result<f64, PowerError> {
    if divisor == 0.0 {
        return Err(PowerError::DivisionByZero);
    }
    Ok(numerator / divisor)
}

impl PowerModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volts(&self) -> f64 {
        self.volts
    }

    pub fn power_factor(&self) -> f64 {
        self.power_factor
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn threephase(&self) -> f64 {
        self.threephase
    }

    pub fn hp(&self) -> f64 {
        self.hp
    }

    pub fn amps(&self) -> f64 {
        self.amps
    }

    pub fn kva(&self) -> f64 {
        self.kva
    }

    pub fn kw(&self) -> f64 {
        self.kw
    }

    /// 현재 상 선택. 필드는 항상 0 또는 1 이므로 그 외 값은 나올 수 없다.
    pub fn phase(&self) -> Phase {
        Phase::from_selector(self.threephase).unwrap_or_default()
    }

    pub fn set_volts(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::Volts, value)?;
        self.volts = value;
        Ok(())
    }

    pub fn set_power_factor(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::PowerFactor, value)?;
        self.power_factor = value;
        Ok(())
    }

    pub fn set_efficiency(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::Efficiency, value)?;
        self.efficiency = value;
        Ok(())
    }

    /// 0 = 단상, 1 = 삼상.
    pub fn set_threephase(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::ThreePhase, value)?;
        self.threephase = value;
        Ok(())
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.threephase = phase.as_selector();
    }

    pub fn set_hp(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::Hp, value)?;
        self.hp = value;
        Ok(())
    }

    pub fn set_amps(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::Amps, value)?;
        self.amps = value;
        Ok(())
    }

    pub fn set_kva(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::Kva, value)?;
        self.kva = value;
        Ok(())
    }

    pub fn set_kw(&mut self, value: f64) -> Result<(), PowerError> {
        check_range(PowerField::Kw, value)?;
        self.kw = value;
        Ok(())
    }

    /// 필드 이름으로 값을 읽는다.
    pub fn get(&self, field: PowerField) -> f64 {
        match field {
            PowerField::Volts => self.volts,
            PowerField::PowerFactor => self.power_factor,
            PowerField::Efficiency => self.efficiency,
            PowerField::ThreePhase => self.threephase,
            PowerField::Hp => self.hp,
            PowerField::Amps => self.amps,
            PowerField::Kva => self.kva,
            PowerField::Kw => self.kw,
        }
    }

    /// 필드 이름으로 검증된 대입을 수행한다.
    pub fn set(&mut self, field: PowerField, value: f64) -> Result<(), PowerError> {
        match field {
            PowerField::Volts => self.set_volts(value),
            PowerField::PowerFactor => self.set_power_factor(value),
            PowerField::Efficiency => self.set_efficiency(value),
            PowerField::ThreePhase => self.set_threephase(value),
            PowerField::Hp => self.set_hp(value),
            PowerField::Amps => self.set_amps(value),
            PowerField::Kva => self.set_kva(value),
            PowerField::Kw => self.set_kw(value),
        }
    }

    /// 상 보정 계수: 단상 1, 삼상 1.73.
    pub fn phase_factor(&self) -> f64 {
        1.0 + THREE_PHASE_OFFSET * self.threephase
    }

    /// 전류로부터 kVA, kW, hp 를 계산한다. 전압 0 은 분모 0 으로 취급한다.
    pub fn solve_from_amps(&mut self) -> Result<(), PowerError> {
        if self.volts == 0.0 {
            return Err(PowerError::DivisionByZero);
        }
        let ph = self.phase_factor();
        let kva = self.volts * self.amps * ph / 1000.0;
        let kw = kva * self.power_factor;
        let hp = self.volts * self.amps * self.efficiency * self.power_factor * ph / HP_WATTS;
        self.commit(PowerQuantity::Amps, |m| {
            m.set_kva(kva)?;
            m.set_kw(kw)?;
            m.set_hp(hp)
        })
    }

    /// kVA 로부터 전류, kW, hp 를 계산한다.
    pub fn solve_from_kva(&mut self) -> Result<(), PowerError> {
        let ph = self.phase_factor();
        let amps = divide(self.kva * 1000.0, self.volts * ph)?;
        let kw = self.kva * self.power_factor;
        let hp = self.volts * amps * self.efficiency * self.power_factor * ph / HP_WATTS;
        self.commit(PowerQuantity::Kva, |m| {
            m.set_amps(amps)?;
            m.set_kw(kw)?;
            m.set_hp(hp)
        })
    }

    /// kW 로부터 전류, kVA, hp 를 계산한다. 역률이 0 이면 분모가 0 이 된다.
    pub fn solve_from_kw(&mut self) -> Result<(), PowerError> {
        let ph = self.phase_factor();
        let amps = divide(self.kw * 1000.0, self.volts * self.power_factor * ph)?;
        let kva = divide(self.kw, self.power_factor)?;
        let hp = self.volts * amps * self.efficiency * self.power_factor * ph / HP_WATTS;
        self.commit(PowerQuantity::Kw, |m| {
            m.set_amps(amps)?;
            m.set_kva(kva)?;
            m.set_hp(hp)
        })
    }

    /// hp 로부터 전류, kVA, kW 를 계산한다. 효율/역률이 0 이면 분모가 0 이 된다.
    pub fn solve_from_hp(&mut self) -> Result<(), PowerError> {
        let ph = self.phase_factor();
        let amps = divide(
            self.hp * HP_WATTS,
            self.volts * self.efficiency * self.power_factor * ph,
        )?;
        let kva = self.volts * amps * ph / 1000.0;
        let kw = kva * self.power_factor;
        self.commit(PowerQuantity::Hp, |m| {
            m.set_amps(amps)?;
            m.set_kva(kva)?;
            m.set_kw(kw)
        })
    }

    /// 입력량에 맞는 `solve_from_*` 를 호출하고 표시 순서대로 결과를 돌려준다.
    pub fn solve_from(&mut self, input: PowerQuantity) -> Result<SolveReport, PowerError> {
        match input {
            PowerQuantity::Kva => self.solve_from_kva()?,
            PowerQuantity::Kw => self.solve_from_kw()?,
            PowerQuantity::Hp => self.solve_from_hp()?,
            PowerQuantity::Amps => self.solve_from_amps()?,
        }
        use PowerQuantity::*;
        let order = match input {
            Kva => [Kw, Hp, Amps],
            Kw => [Kva, Hp, Amps],
            Hp => [Kva, Kw, Amps],
            Amps => [Kva, Kw, Hp],
        };
        Ok(SolveReport {
            input,
            input_value: self.get(input.field()),
            outputs: order.map(|q| (q, self.get(q.field()))),
        })
    }

    /// 복사본에 결과를 기록해 보고 모두 성공했을 때만 반영한다.
    fn commit<F>(&mut self, input: PowerQuantity, write: F) -> Result<(), PowerError>
    where
        F: FnOnce(&mut PowerModel) -> Result<(), PowerError>,
    {
        let mut staged = self.clone();
        write(&mut staged)?;
        *self = staged;
        debug!(
            from = %input,
            volts = self.volts,
            pf = self.power_factor,
            eff = self.efficiency,
            threephase = self.threephase,
            hp = self.hp,
            amps = self.amps,
            kva = self.kva,
            kw = self.kw,
            "solved"
        );
        Ok(())
    }
}

impl std::fmt::Display for PowerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Volts: {}", self.volts)?;
        writeln!(f, "PF   : {}", self.power_factor)?;
        writeln!(f, "Eff  : {}", self.efficiency)?;
        writeln!(f, "kW   : {}", self.kw)?;
        writeln!(f, "hp   : {}", self.hp)?;
        writeln!(f, "Amps : {}", self.amps)?;
        write!(f, "kVA  : {}", self.kva)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(m: &PowerModel) -> [f64; 4] {
        [m.hp(), m.amps(), m.kva(), m.kw()]
    }

    #[test]
    fn defaults_match_480v_three_phase() {
        let m = PowerModel::new();
        assert_eq!(m.volts(), 480.0);
        assert_eq!(m.power_factor(), 1.0);
        assert_eq!(m.efficiency(), 1.0);
        assert_eq!(m.threephase(), 1.0);
        assert_eq!(m.phase(), Phase::Three);
        assert_eq!(snapshot(&m), [0.0; 4]);
    }

    #[test]
    fn rejected_power_factor_keeps_previous_value() {
        let mut m = PowerModel::new();
        m.set_power_factor(0.8).unwrap();
        let err = m.set_power_factor(1.5).unwrap_err();
        assert_eq!(
            err,
            PowerError::Validation {
                field: PowerField::PowerFactor,
                reason: "Power factor must be between -1 and 1".into(),
            }
        );
        assert_eq!(m.power_factor(), 0.8);
    }

    #[test]
    fn setters_enforce_ranges() {
        let mut m = PowerModel::new();
        assert!(m.set_volts(-1.0).is_err());
        assert!(m.set_efficiency(1.01).is_err());
        assert!(m.set_efficiency(-0.01).is_err());
        assert!(m.set_threephase(0.5).is_err());
        assert!(m.set_threephase(3.0).is_err());
        assert!(m.set_hp(-1.0).is_err());
        assert!(m.set_amps(-1.0).is_err());
        assert!(m.set_kva(-1.0).is_err());
        assert!(m.set_kw(-1.0).is_err());
        assert!(m.set_power_factor(-1.0).is_ok());
        assert!(m.set_threephase(0.0).is_ok());
        assert!(m.set_volts(0.0).is_ok());
        assert_eq!(m.phase(), Phase::Single);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut m = PowerModel::new();
        assert!(m.set_volts(f64::NAN).is_err());
        assert!(m.set_kva(f64::INFINITY).is_err());
        assert!(m.set_power_factor(f64::NAN).is_err());
        assert_eq!(m.volts(), 480.0);
        assert_eq!(m.kva(), 0.0);
    }

    #[test]
    fn error_messages_are_human_readable() {
        let mut m = PowerModel::new();
        let err = m.set_volts(-5.0).unwrap_err();
        assert_eq!(err.to_string(), "RMS voltage cannot be negative");
        assert_eq!(PowerError::DivisionByZero.to_string(), "Cannot divide by zero");
    }

    #[test]
    fn amps_example_at_480v() {
        let mut m = PowerModel::new();
        m.set_amps(10.0).unwrap();
        m.solve_from_amps().unwrap();
        assert!((m.kva() - 8.304).abs() < 1e-9);
        assert!((m.kw() - 8.304).abs() < 1e-9);
        assert!((m.hp() - 8304.0 / 746.0).abs() < 1e-9);
        assert_eq!(m.amps(), 10.0);
    }

    #[test]
    fn zero_volts_blocks_every_divisor_solve() {
        for input in PowerQuantity::ALL {
            let mut m = PowerModel::new();
            m.set_amps(3.0).unwrap();
            m.set_kva(4.0).unwrap();
            m.set_kw(5.0).unwrap();
            m.set_hp(6.0).unwrap();
            m.set_volts(0.0).unwrap();
            let before = snapshot(&m);
            assert_eq!(m.solve_from(input), Err(PowerError::DivisionByZero));
            assert_eq!(snapshot(&m), before, "{input} mutated fields");
        }
    }

    #[test]
    fn zero_efficiency_blocks_hp_solve() {
        let mut m = PowerModel::new();
        m.set_efficiency(0.0).unwrap();
        m.set_hp(5.0).unwrap();
        assert_eq!(m.solve_from_hp(), Err(PowerError::DivisionByZero));
        assert_eq!(m.amps(), 0.0);
    }

    #[test]
    fn zero_power_factor_blocks_kw_solve() {
        let mut m = PowerModel::new();
        m.set_power_factor(0.0).unwrap();
        m.set_kw(5.0).unwrap();
        assert_eq!(m.solve_from_kw(), Err(PowerError::DivisionByZero));
    }

    #[test]
    fn negative_power_factor_fails_without_partial_update() {
        let mut m = PowerModel::new();
        m.set_amps(10.0).unwrap();
        m.set_kva(1.0).unwrap();
        m.set_kw(2.0).unwrap();
        m.set_hp(3.0).unwrap();
        m.set_power_factor(-0.5).unwrap();
        let before = snapshot(&m);
        let err = m.solve_from_amps().unwrap_err();
        assert!(matches!(
            err,
            PowerError::Validation {
                field: PowerField::Kw,
                ..
            }
        ));
        // kva 는 유효했지만 kw 에서 실패했으므로 반영되지 않아야 한다.
        assert_eq!(snapshot(&m), before);
    }

    #[test]
    fn phase_ratio_is_1_73() {
        let mut three = PowerModel::new();
        three.set_amps(25.0).unwrap();
        three.solve_from_amps().unwrap();

        let mut single = PowerModel::new();
        single.set_phase(Phase::Single);
        single.set_amps(25.0).unwrap();
        single.solve_from_amps().unwrap();

        assert!((three.kva() / single.kva() - 1.73).abs() < 1e-12);
    }

    #[test]
    fn solve_report_order_follows_input() {
        let mut m = PowerModel::new();
        m.set_hp(10.0).unwrap();
        let report = m.solve_from(PowerQuantity::Hp).unwrap();
        let order: Vec<_> = report.outputs.iter().map(|(q, _)| *q).collect();
        assert_eq!(
            order,
            vec![PowerQuantity::Kva, PowerQuantity::Kw, PowerQuantity::Amps]
        );
        assert_eq!(report.input_value, 10.0);
        assert_eq!(report.value_of(PowerQuantity::Amps), m.amps());
    }

    #[test]
    fn getters_return_last_write_without_recompute() {
        let mut m = PowerModel::new();
        m.set_amps(10.0).unwrap();
        m.solve_from_amps().unwrap();
        let kva = m.kva();
        m.set_volts(240.0).unwrap();
        assert_eq!(m.kva(), kva);
        m.set_kw(1.25).unwrap();
        assert_eq!(m.get(PowerField::Kw), 1.25);
    }

    #[test]
    fn display_lists_all_fields() {
        let text = PowerModel::new().to_string();
        assert!(text.starts_with("Volts: 480"));
        assert!(text.contains("kVA  : 0"));
    }
}
