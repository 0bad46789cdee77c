use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;
use tracing::debug;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_CALCULATE: &str = "main_menu.calculate";
    pub const MAIN_MENU_SHOW_MODEL: &str = "main_menu.show_model";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const CALC_HEADING: &str = "calculate.heading";
    pub const CALC_KEEP_HINT: &str = "calculate.keep_hint";
    pub const PROMPT_PHASE: &str = "prompt.phase";
    pub const PROMPT_VOLTS: &str = "prompt.volts";
    pub const PROMPT_POWER_FACTOR: &str = "prompt.power_factor";
    pub const PROMPT_EFFICIENCY: &str = "prompt.efficiency";
    pub const QUANTITY_OPTIONS: &str = "calculate.quantity_options";
    pub const PROMPT_VALUE: &str = "prompt.value";
    pub const RESULT_HEADING: &str = "calculate.result_heading";

    pub const MODEL_HEADING: &str = "model.heading";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_LANGUAGE: &str = "settings.prompt_language";
    pub const SETTINGS_DEFAULTS_SAVED: &str = "settings.defaults_saved";
    pub const SETTINGS_LANGUAGE_CHANGED: &str = "settings.language_changed";
    pub const SETTINGS_INVALID: &str = "settings.invalid";

    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";
    pub const ERROR_NOT_A_NUMBER: &str = "error.not_a_number";

    pub const GUI_TITLE: &str = "gui.title";
    pub const GUI_SINGLE_PHASE: &str = "gui.single_phase";
    pub const GUI_THREE_PHASE: &str = "gui.three_phase";
    pub const GUI_VOLTS: &str = "gui.volts";
    pub const GUI_POWER_FACTOR: &str = "gui.power_factor";
    pub const GUI_EFFICIENCY: &str = "gui.efficiency";
    pub const GUI_CALCULATE: &str = "gui.calculate";
    pub const GUI_ERROR_TITLE: &str = "gui.error_title";
    pub const GUI_OK: &str = "gui.ok";
    pub const GUI_SETTINGS: &str = "gui.settings";
    pub const GUI_LANGUAGE: &str = "gui.language";
    pub const GUI_LANGUAGE_AUTO: &str = "gui.language_auto";
    pub const GUI_FONT: &str = "gui.font";
    pub const GUI_PICK_FONT: &str = "gui.pick_font";
    pub const GUI_SAVE: &str = "gui.save";
    pub const GUI_SAVED: &str = "gui.saved";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        if code.to_lowercase().starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
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
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 en 으로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        if let Some(map) = &overrides {
            debug!(lang = lang_code, entries = map.len(), "language pack loaded");
        }
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

    /// 언어팩에서만 키를 조회한다. 없으면 None.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.overrides
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// 번역을 가져온다. 언어팩 → 선택 언어 → 영어 순으로 찾는다.
    pub fn t<'a>(&'a self, key: &str) -> &'a str {
        if let Some(v) = self.lookup(key) {
            return v;
        }
        let built_in = match self.lang {
            Language::Ko => ko(key).or_else(|| en(key)),
            Language::En => en(key),
        };
        built_in.unwrap_or("[missing translation]")
    }
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        "ko" | "ko-kr" => Some(c),
        "en" | "en-us" => Some(c),
        "en-uk" | "en-gb" => Some("en".into()),
        other if other.starts_with("ko") => Some("ko".into()),
        other if other.starts_with("en") => Some("en".into()),
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
        "ko" => Some("ko".into()),
        "en" => Some("en".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(code) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(code);
    }
    ["LC_ALL", "LANG"].iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .as_deref()
            .and_then(normalize_locale_string)
    })
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 또는 [섹션] 아래 key = "value".
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., ko-kr)
    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    // 2) base code (e.g., ko)
    let (base, _) = lang.split_once(['-', '_'])?;
    try_load(base)
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

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        MAIN_MENU_TITLE => "\n=== PowerCalc ===",
        MAIN_MENU_CALCULATE => "1) 전력/전류 환산",
        MAIN_MENU_SHOW_MODEL => "2) 현재 값 보기",
        MAIN_MENU_SETTINGS => "3) 설정",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        CALC_HEADING => "\n-- 전력/전류 환산 --",
        CALC_KEEP_HINT => "엔터를 누르면 [ ] 안의 현재 값을 유지합니다.",
        PROMPT_PHASE => "상 (1=단상, 3=삼상)",
        PROMPT_VOLTS => "전압 [V]",
        PROMPT_POWER_FACTOR => "역률 (-1~1)",
        PROMPT_EFFICIENCY => "효율 (0~1)",
        QUANTITY_OPTIONS => "입력량: 1=kVA 2=kW 3=hp 4=Amps",
        PROMPT_VALUE => "값 입력: ",
        RESULT_HEADING => "결과:",
        MODEL_HEADING => "\n-- 현재 값 --",
        SETTINGS_HEADING => "\n-- 설정 --",
        SETTINGS_OPTIONS => "1) 현재 회로 조건을 기본값으로 저장  2) 언어 변경",
        SETTINGS_PROMPT_LANGUAGE => "언어 코드 (auto/ko/en): ",
        SETTINGS_DEFAULTS_SAVED => "기본 회로 조건을 저장했습니다.",
        SETTINGS_LANGUAGE_CHANGED => "언어가 변경되었습니다:",
        SETTINGS_INVALID => "잘못된 입력이므로 변경하지 않습니다.",
        ERROR_INVALID_NUMBER => "숫자를 입력하세요.",
        ERROR_NOT_A_NUMBER => "숫자(소수)만 입력하세요",
        GUI_TITLE => "PowerCalc",
        GUI_SINGLE_PHASE => "단상",
        GUI_THREE_PHASE => "삼상",
        GUI_VOLTS => "전압",
        GUI_POWER_FACTOR => "역률",
        GUI_EFFICIENCY => "효율",
        GUI_CALCULATE => "계산",
        GUI_ERROR_TITLE => "오류",
        GUI_OK => "확인",
        GUI_SETTINGS => "설정",
        GUI_LANGUAGE => "언어",
        GUI_LANGUAGE_AUTO => "시스템",
        GUI_FONT => "사용자 폰트",
        GUI_PICK_FONT => "폰트 선택...",
        GUI_SAVE => "설정 저장",
        GUI_SAVED => "저장했습니다.",
        _ => return None,
    })
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting application.",
        MAIN_MENU_TITLE => "\n=== PowerCalc ===",
        MAIN_MENU_CALCULATE => "1) Power/current conversion",
        MAIN_MENU_SHOW_MODEL => "2) Show current values",
        MAIN_MENU_SETTINGS => "3) Settings",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please try again.",
        CALC_HEADING => "\n-- Power/current conversion --",
        CALC_KEEP_HINT => "Press Enter to keep the current value shown in [ ].",
        PROMPT_PHASE => "Phase (1=single, 3=three)",
        PROMPT_VOLTS => "Volts [V]",
        PROMPT_POWER_FACTOR => "Power factor (-1..1)",
        PROMPT_EFFICIENCY => "Efficiency (0..1)",
        QUANTITY_OPTIONS => "Solve from: 1=kVA 2=kW 3=hp 4=Amps",
        PROMPT_VALUE => "Value: ",
        RESULT_HEADING => "Result:",
        MODEL_HEADING => "\n-- Current values --",
        SETTINGS_HEADING => "\n-- Settings --",
        SETTINGS_OPTIONS => "1) Save current circuit as defaults  2) Change language",
        SETTINGS_PROMPT_LANGUAGE => "Language code (auto/ko/en): ",
        SETTINGS_DEFAULTS_SAVED => "Circuit defaults saved.",
        SETTINGS_LANGUAGE_CHANGED => "Language changed to:",
        SETTINGS_INVALID => "Invalid input; nothing changed.",
        ERROR_INVALID_NUMBER => "Please enter a number.",
        ERROR_NOT_A_NUMBER => "Please provide only decimal numbers",
        GUI_TITLE => "PowerCalc",
        GUI_SINGLE_PHASE => "Single-Phase",
        GUI_THREE_PHASE => "Three-Phase",
        GUI_VOLTS => "Volts",
        GUI_POWER_FACTOR => "P.F.",
        GUI_EFFICIENCY => "Efficiency",
        GUI_CALCULATE => "Calculate",
        GUI_ERROR_TITLE => "Error",
        GUI_OK => "OK",
        GUI_SETTINGS => "Settings",
        GUI_LANGUAGE => "Language",
        GUI_LANGUAGE_AUTO => "System",
        GUI_FONT => "User font",
        GUI_PICK_FONT => "Pick font...",
        GUI_SAVE => "Save settings",
        GUI_SAVED => "Saved.",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_wins_over_config() {
        assert_eq!(resolve_language("ko", Some("en")), "ko");
        assert_eq!(resolve_language("en-GB", Some("ko")), "en");
    }

    #[test]
    fn auto_falls_back_to_config() {
        assert_eq!(resolve_language("auto", Some("ko-KR")), "ko-kr");
    }

    #[test]
    fn korean_strings_with_english_fallback() {
        let ko = Translator::new("ko");
        assert_eq!(ko.language(), Language::Ko);
        assert_eq!(ko.t(keys::ERROR_PREFIX), "오류");
        let en = Translator::new("fr");
        assert_eq!(en.language_code(), "en");
        assert_eq!(en.t(keys::GUI_POWER_FACTOR), "P.F.");
        assert_eq!(en.t("no.such.key"), "[missing translation]");
    }

    #[test]
    fn nested_pack_keys_are_flattened() {
        let map = parse_toml_to_map(
            r#"
[general]
error_prefix = "Fehler"
"#,
        )
        .unwrap();
        assert_eq!(map.get(keys::ERROR_PREFIX).map(String::as_str), Some("Fehler"));
    }

    #[test]
    fn locale_strings_are_normalized() {
        assert_eq!(normalize_locale_string("ko_KR.UTF-8").as_deref(), Some("ko"));
        assert_eq!(normalize_locale_string("en-US").as_deref(), Some("en"));
        assert_eq!(normalize_locale_string("de_DE"), None);
    }
}
