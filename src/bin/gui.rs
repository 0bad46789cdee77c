#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use eframe::{egui, App, Frame};
use image::GenericImageView;
use power_calc::{
    config::{self, CircuitDefaults},
    electrical::{PowerModel, SolveReport},
    i18n::{self, keys},
    logging,
    quantity::{Phase, PowerQuantity},
    ui_form::{format_value, CalculatorForm},
};
use rfd::FileDialog;
use std::{env, fs, path::Path};
use tracing::{info, warn};

fn main() -> Result<(), eframe::Error> {
    // CLI 언어 옵션 처리: --lang xx 또는 --lang=xx (xx: auto/ko/en)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let mut app_cfg = config::load_or_default().unwrap_or_else(|e| {
        eprintln!("Config error: {e}");
        config::Config::default()
    });
    logging::init(0, &app_cfg.log_level);
    if let Some(lang_cli) = cli_lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("PowerCalc")
        .with_inner_size([380.0, 560.0]);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "PowerCalc",
        options,
        Box::new(move |cc| {
            let font = match app_cfg.font_path.as_deref() {
                Some(path) => load_custom_font(&cc.egui_ctx, path),
                None => setup_fonts(&cc.egui_ctx),
            };
            if let Err(e) = font {
                warn!("font setup failed: {e}");
            }
            Box::new(GuiApp::new(app_cfg))
        }),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["power_icon.png", "assets/power_icon.png", "../power_icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

/// 바이너리 폰트 바이트를 기본 폰트 뒤의 대체 폰트로 egui에 등록.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(name.to_string(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(name.to_string());
    }
    ctx.set_fonts(fonts);
}

/// 한글 표시용 시스템 폰트를 찾아 등록한다. 찾지 못하면 Err.
fn setup_fonts(ctx: &egui::Context) -> Result<(), String> {
    let mut candidates: Vec<std::path::PathBuf> = vec![
        "assets/fonts/NanumGothic.ttf".into(),
        "/usr/share/fonts/truetype/nanum/NanumGothic.ttf".into(),
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc".into(),
        "/System/Library/Fonts/AppleSDGothicNeo.ttc".into(),
    ];
    if let Some(windir) = env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        candidates.extend(["malgun.ttf", "gulim.ttc"].map(|f| fonts.join(f)));
    }
    let path = candidates
        .iter()
        .find(|p| p.exists())
        .ok_or_else(|| "Korean font not found. Please set a user font in settings.".to_string())?;
    let bytes = fs::read(path)
        .map_err(|e| format!("Failed to read system font ({}): {e}", path.display()))?;
    apply_font_bytes(ctx, bytes, "korean_font");
    info!(path = %path.display(), "font loaded");
    Ok(())
}

/// 사용자가 선택한 경로의 폰트를 egui에 등록한다.
fn load_custom_font(ctx: &egui::Context, path: &str) -> Result<(), String> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("Font file not found: {path}"));
    }
    let bytes = fs::read(p).map_err(|e| format!("Failed to read font file: {e}"))?;
    apply_font_bytes(ctx, bytes, "user_font");
    Ok(())
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    model: PowerModel,
    form: CalculatorForm,
    report: Option<SolveReport>,
    error: Option<String>,
    show_settings: bool,
    lang_input: String,
    font_input: String,
    settings_status: Option<String>,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let lang = i18n::resolve_language(&config.language, None);
        let tr = i18n::Translator::new_with_pack(&lang, config.language_pack_dir.as_deref());
        let model = config.new_model().unwrap_or_else(|e| {
            warn!(error = %e, "stored circuit defaults rejected, using built-in defaults");
            PowerModel::new()
        });
        let form = CalculatorForm::from_defaults(&CircuitDefaults::capture(&model));
        Self {
            lang_input: config.language.clone(),
            font_input: config.font_path.clone().unwrap_or_default(),
            config,
            tr,
            model,
            form,
            report: None,
            error: None,
            show_settings: false,
            settings_status: None,
        }
    }

    /// 폼 입력으로 계산한다. 실패하면 이전 결과를 그대로 두고 오류 창을 띄운다.
    fn calculate(&mut self) {
        match self.form.calculate(&mut self.model) {
            Ok(report) => {
                self.report = Some(report);
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "calculation rejected");
                self.error = Some(e.message(&self.tr));
            }
        }
    }

    /// 결과 세 줄(값, 단위). 계산 전에는 0 / -- 를 표시한다.
    fn result_rows(&self) -> [(String, String); 3] {
        match &self.report {
            Some(r) => r.outputs.map(|(q, v)| (format_value(v), q.symbol().to_string())),
            None => std::array::from_fn(|_| ("0".to_string(), "--".to_string())),
        }
    }

    fn save_settings(&mut self, ctx: &egui::Context) {
        self.config.language = self.lang_input.clone();
        let font = self.font_input.trim();
        self.config.font_path = (!font.is_empty()).then(|| font.to_string());
        self.config.circuit = CircuitDefaults::capture(&self.model);

        let resolved = i18n::resolve_language(&self.config.language, None);
        self.tr = i18n::Translator::new_with_pack(&resolved, self.config.language_pack_dir.as_deref());
        if let Some(path) = self.config.font_path.as_deref() {
            if let Err(e) = load_custom_font(ctx, path) {
                self.settings_status = Some(e);
                return;
            }
        }
        self.settings_status = Some(match self.config.save() {
            Ok(()) => self.tr.t(keys::GUI_SAVED).to_string(),
            Err(e) => format!("{}: {e}", self.tr.t(keys::GUI_ERROR_TITLE)),
        });
    }

    fn ui_calculator(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = |key: &str| tr.t(key).to_string();
        let entry = |s: String| egui::RichText::new(s).size(14.0);

        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(txt(keys::GUI_TITLE))
                    .size(28.0)
                    .strong()
                    .underline(),
            );
        });
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.form.phase, Phase::Single, entry(txt(keys::GUI_SINGLE_PHASE)));
            ui.radio_value(&mut self.form.phase, Phase::Three, entry(txt(keys::GUI_THREE_PHASE)));
        });
        ui.add_space(6.0);

        egui::Grid::new("power_inputs")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for (text, key) in [
                    (&mut self.form.volts, keys::GUI_VOLTS),
                    (&mut self.form.power_factor, keys::GUI_POWER_FACTOR),
                    (&mut self.form.efficiency, keys::GUI_EFFICIENCY),
                ] {
                    ui.text_edit_singleline(text);
                    ui.label(entry(txt(key)));
                    ui.end_row();
                }
                ui.text_edit_singleline(&mut self.form.value);
                egui::ComboBox::from_id_source("power_quantity")
                    .selected_text(self.form.quantity.symbol())
                    .show_ui(ui, |ui| {
                        for q in PowerQuantity::ALL {
                            ui.selectable_value(&mut self.form.quantity, q, q.symbol());
                        }
                    });
                ui.end_row();
            });
        ui.add_space(12.0);

        let button = egui::Button::new(entry(txt(keys::GUI_CALCULATE)));
        let clicked = ui
            .add_sized([ui.available_width(), 32.0], button)
            .clicked();
        let enter = self.error.is_none()
            && !self.show_settings
            && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if clicked || enter {
            self.calculate();
        }
        ui.add_space(12.0);

        let rows = self.result_rows();
        egui::Grid::new("power_results")
            .num_columns(2)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                for (value, unit) in rows {
                    ui.label(egui::RichText::new(value).size(20.0).strong());
                    ui.label(egui::RichText::new(unit).size(20.0).strong());
                    ui.end_row();
                }
            });
    }

    fn ui_error_window(&mut self, ctx: &egui::Context) {
        let Some(msg) = self.error.clone() else {
            return;
        };
        let title = self.tr.t(keys::GUI_ERROR_TITLE).to_string();
        let ok = self.tr.t(keys::GUI_OK).to_string();
        let mut open = true;
        let mut dismissed = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(msg);
                ui.add_space(6.0);
                if ui.button(ok).clicked() || ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    dismissed = true;
                }
            });
        if !open || dismissed {
            self.error = None;
        }
    }

    fn ui_settings_window(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }
        let tr = self.tr.clone();
        let txt = |key: &str| tr.t(key).to_string();
        let mut save_clicked = false;
        egui::Window::new(txt(keys::GUI_SETTINGS))
            .collapsible(false)
            .resizable(true)
            .open(&mut self.show_settings)
            .show(ctx, |ui| {
                ui.label(txt(keys::GUI_LANGUAGE));
                egui::ComboBox::from_id_source("lang_choice")
                    .selected_text(self.lang_input.as_str())
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.lang_input, "auto".into(), txt(keys::GUI_LANGUAGE_AUTO));
                        ui.selectable_value(&mut self.lang_input, "en".into(), "English");
                        ui.selectable_value(&mut self.lang_input, "ko".into(), "한국어");
                    });
                ui.separator();
                ui.label(txt(keys::GUI_FONT));
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.font_input);
                    if ui.button(txt(keys::GUI_PICK_FONT)).clicked() {
                        if let Some(path) = FileDialog::new()
                            .add_filter("font", &["ttf", "ttc", "otf"])
                            .pick_file()
                        {
                            self.font_input = path.display().to_string();
                        }
                    }
                });
                ui.separator();
                if ui.button(txt(keys::GUI_SAVE)).clicked() {
                    save_clicked = true;
                }
                if let Some(msg) = &self.settings_status {
                    ui.label(msg);
                }
            });
        if save_clicked {
            self.save_settings(ctx);
        }
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let settings_label = self.tr.t(keys::GUI_SETTINGS).to_string();
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(settings_label).clicked() {
                    self.show_settings = true;
                }
            });
        });

        self.ui_settings_window(ctx);
        self.ui_error_window(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui_calculator(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english_app() -> GuiApp {
        let mut cfg = config::Config::default();
        cfg.language = "en".into();
        GuiApp::new(cfg)
    }

    #[test]
    fn results_show_placeholders_before_first_calculation() {
        let app = english_app();
        for (value, unit) in app.result_rows() {
            assert_eq!(value, "0");
            assert_eq!(unit, "--");
        }
    }

    #[test]
    fn calculate_from_hp_fills_rows_in_order() {
        let mut app = english_app();
        app.form.quantity = PowerQuantity::Hp;
        app.form.value = "11.131".into();
        app.calculate();
        assert!(app.error.is_none());
        let rows = app.result_rows();
        assert_eq!(rows[0].1, "kVA");
        assert_eq!(rows[1].1, "kW");
        assert_eq!(rows[2].1, "Amps");
        assert_eq!(rows[2].0, "10.00");
    }

    #[test]
    fn bad_text_opens_error_and_keeps_previous_result() {
        let mut app = english_app();
        app.form.quantity = PowerQuantity::Amps;
        app.form.value = "10".into();
        app.calculate();
        let before = app.result_rows();

        app.form.efficiency = "1,0".into();
        app.calculate();
        assert_eq!(
            app.error.as_deref(),
            Some("Please provide only decimal numbers (Efficiency)")
        );
        assert_eq!(app.result_rows(), before);
    }

    #[test]
    fn single_phase_form_reaches_model() {
        let mut app = english_app();
        app.form.phase = Phase::Single;
        app.form.value = "1".into();
        app.calculate();
        assert_eq!(app.model.phase(), Phase::Single);
    }
}
