use std::io::{self, BufRead, Write};

use crate::app::AppError;
use crate::config::{CircuitDefaults, Config};
use crate::electrical::{PowerError, PowerModel};
use crate::i18n::{keys, Translator};
use crate::quantity::{Phase, PowerQuantity};
use crate::ui_form::format_value;

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Calculate,
    ShowModel,
    Settings,
    Exit,
}

/// 프롬프트 입출력 대상. 평소에는 stdin/stdout, 테스트에서는 메모리 버퍼.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, line: &str) -> Result<(), AppError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    pub fn error(&mut self, tr: &Translator, err: &dyn std::fmt::Display) -> Result<(), AppError> {
        writeln!(self.output, "{}: {err}", tr.t(keys::ERROR_PREFIX))?;
        Ok(())
    }

    /// 한 줄을 읽는다. 입력이 끝났으면 UnexpectedEof 오류.
    fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }
        Ok(buf.trim().to_string())
    }

    fn read_f64(&mut self, tr: &Translator, prompt: &str) -> Result<f64, AppError> {
        loop {
            let s = self.read_line(prompt)?;
            match s.parse::<f64>() {
                Ok(v) => return Ok(v),
                Err(_) => self.say(tr.t(keys::ERROR_INVALID_NUMBER))?,
            }
        }
    }
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
) -> Result<MenuChoice, AppError> {
    for key in [
        keys::MAIN_MENU_TITLE,
        keys::MAIN_MENU_CALCULATE,
        keys::MAIN_MENU_SHOW_MODEL,
        keys::MAIN_MENU_SETTINGS,
        keys::MAIN_MENU_EXIT,
    ] {
        con.say(tr.t(key))?;
    }
    loop {
        let sel = con.read_line(tr.t(keys::PROMPT_MENU_SELECT))?;
        match sel.as_str() {
            "1" => return Ok(MenuChoice::Calculate),
            "2" => return Ok(MenuChoice::ShowModel),
            "3" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => con.say(tr.t(keys::INVALID_SELECTION_RETRY))?,
        }
    }
}

/// 환산 메뉴: 회로 조건 → 입력량 → 값 순으로 받아 나머지 세 값을 출력한다.
pub fn handle_calculate<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    model: &mut PowerModel,
) -> Result<(), AppError> {
    con.say(tr.t(keys::CALC_HEADING))?;
    con.say(tr.t(keys::CALC_KEEP_HINT))?;
    read_phase(con, tr, model)?;
    read_param(con, tr, keys::PROMPT_VOLTS, model, |m| m.volts(), PowerModel::set_volts)?;
    read_param(
        con,
        tr,
        keys::PROMPT_POWER_FACTOR,
        model,
        |m| m.power_factor(),
        PowerModel::set_power_factor,
    )?;
    read_param(
        con,
        tr,
        keys::PROMPT_EFFICIENCY,
        model,
        |m| m.efficiency(),
        PowerModel::set_efficiency,
    )?;

    let quantity = read_quantity(con, tr)?;
    loop {
        let value = con.read_f64(tr, tr.t(keys::PROMPT_VALUE))?;
        match model.set(quantity.field(), value) {
            Ok(()) => break,
            Err(e) => con.error(tr, &e)?,
        }
    }

    match model.solve_from(quantity) {
        Ok(report) => {
            con.say(tr.t(keys::RESULT_HEADING))?;
            for (q, v) in report.outputs {
                con.say(&format!("  {} {q}", format_value(v)))?;
            }
        }
        Err(e) => con.error(tr, &e)?,
    }
    Ok(())
}

fn read_phase<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    model: &mut PowerModel,
) -> Result<(), AppError> {
    let current = match model.phase() {
        Phase::Single => "1",
        Phase::Three => "3",
    };
    loop {
        let sel = con.read_line(&format!("{} [{current}]: ", tr.t(keys::PROMPT_PHASE)))?;
        match sel.as_str() {
            "" => return Ok(()),
            "1" => {
                model.set_phase(Phase::Single);
                return Ok(());
            }
            "3" => {
                model.set_phase(Phase::Three);
                return Ok(());
            }
            _ => con.say(tr.t(keys::INVALID_SELECTION_RETRY))?,
        }
    }
}

/// 회로 조건 하나를 읽는다. 빈 입력은 현재 값 유지, 범위 오류는 다시 묻는다.
fn read_param<R, W, G, S>(
    con: &mut Console<R, W>,
    tr: &Translator,
    label_key: &str,
    model: &mut PowerModel,
    get: G,
    set: S,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
    G: Fn(&PowerModel) -> f64,
    S: Fn(&mut PowerModel, f64) -> Result<(), PowerError>,
{
    loop {
        let prompt = format!("{} [{}]: ", tr.t(label_key), get(&*model));
        let s = con.read_line(&prompt)?;
        if s.is_empty() {
            return Ok(());
        }
        let Ok(value) = s.parse::<f64>() else {
            con.say(tr.t(keys::ERROR_INVALID_NUMBER))?;
            continue;
        };
        match set(model, value) {
            Ok(()) => return Ok(()),
            Err(e) => con.error(tr, &e)?,
        }
    }
}

fn read_quantity<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
) -> Result<PowerQuantity, AppError> {
    con.say(tr.t(keys::QUANTITY_OPTIONS))?;
    loop {
        let sel = con.read_line(tr.t(keys::PROMPT_MENU_SELECT))?;
        let quantity = sel
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| PowerQuantity::ALL.get(i).copied());
        match quantity {
            Some(q) => return Ok(q),
            None => con.say(tr.t(keys::INVALID_SELECTION_RETRY))?,
        }
    }
}

/// 현재 모델 값을 출력한다.
pub fn handle_show_model<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    model: &PowerModel,
) -> Result<(), AppError> {
    con.say(tr.t(keys::MODEL_HEADING))?;
    con.say(&model.to_string())
}

/// 설정 메뉴를 처리한다. 언어가 바뀌면 새 언어 코드를 돌려준다.
pub fn handle_settings<R: BufRead, W: Write>(
    con: &mut Console<R, W>,
    tr: &Translator,
    cfg: &mut Config,
    model: &PowerModel,
) -> Result<Option<String>, AppError> {
    con.say(tr.t(keys::SETTINGS_HEADING))?;
    con.say(tr.t(keys::SETTINGS_OPTIONS))?;
    let sel = con.read_line(tr.t(keys::PROMPT_MENU_SELECT))?;
    match sel.as_str() {
        "1" => {
            cfg.circuit = CircuitDefaults::capture(model);
            con.say(tr.t(keys::SETTINGS_DEFAULTS_SAVED))?;
            Ok(None)
        }
        "2" => {
            let lang = con.read_line(tr.t(keys::SETTINGS_PROMPT_LANGUAGE))?.to_lowercase();
            if matches!(lang.as_str(), "auto" | "ko" | "en") {
                cfg.language = lang.clone();
                con.say(&format!("{} {lang}", tr.t(keys::SETTINGS_LANGUAGE_CHANGED)))?;
                Ok(Some(lang))
            } else {
                con.say(tr.t(keys::SETTINGS_INVALID))?;
                Ok(None)
            }
        }
        _ => {
            con.say(tr.t(keys::SETTINGS_INVALID))?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(con: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(con.into_output()).unwrap()
    }

    #[test]
    fn calculate_from_amps_prints_three_results() {
        let tr = Translator::new("en");
        let mut model = PowerModel::new();
        // 상/전압/역률/효율은 엔터로 유지, 4=Amps, 10 A
        let mut con = console("\n\n\n\n4\n10\n");
        handle_calculate(&mut con, &tr, &mut model).unwrap();
        let out = output(con);
        assert!(out.contains("8.30 kVA"), "{out}");
        assert!(out.contains("8.30 kW"), "{out}");
        assert!(out.contains("11.13 hp"), "{out}");
        assert_eq!(model.amps(), 10.0);
    }

    #[test]
    fn out_of_range_parameter_is_asked_again() {
        let tr = Translator::new("en");
        let mut model = PowerModel::new();
        let mut con = console("1\n240\n1.5\n0.8\nabc\n\n1\n5\n");
        handle_calculate(&mut con, &tr, &mut model).unwrap();
        let out = output(con);
        assert!(out.contains("Error: Power factor must be between -1 and 1"));
        assert!(out.contains("Please enter a number."));
        assert_eq!(model.power_factor(), 0.8);
        assert_eq!(model.phase(), Phase::Single);
        assert_eq!(model.volts(), 240.0);
    }

    #[test]
    fn division_by_zero_is_printed_not_raised() {
        let tr = Translator::new("en");
        let mut model = PowerModel::new();
        let mut con = console("\n0\n\n\n1\n5\n");
        handle_calculate(&mut con, &tr, &mut model).unwrap();
        assert!(output(con).contains("Error: Cannot divide by zero"));
        assert_eq!(model.amps(), 0.0);
    }

    #[test]
    fn closed_input_ends_with_eof_error() {
        let tr = Translator::new("en");
        let mut con = console("");
        let err = main_menu(&mut con, &tr).unwrap_err();
        assert!(matches!(err, AppError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn settings_capture_circuit_defaults() {
        let tr = Translator::new("en");
        let mut cfg = Config::default();
        let mut model = PowerModel::new();
        model.set_volts(208.0).unwrap();
        let mut con = console("1\n");
        assert_eq!(handle_settings(&mut con, &tr, &mut cfg, &model).unwrap(), None);
        assert_eq!(cfg.circuit.volts, 208.0);
    }
}
