//! 설정 파일 기본값과 비대화식 계산 경로 테스트.
use std::path::PathBuf;

use power_calc::app::{solve_once, AppError, SolveRequest};
use power_calc::config;
use power_calc::electrical::PowerError;
use power_calc::quantity::{Phase, PowerQuantity};

fn scratch_config(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "power_calc_{}_{name}.toml",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

#[test]
fn missing_config_is_created_with_defaults() {
    let path = scratch_config("create");
    let cfg = config::load_from(&path).expect("load");
    assert!(path.exists());
    assert_eq!(cfg.circuit.volts, 480.0);
    assert_eq!(cfg.path(), Some(path.as_path()));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn saved_defaults_drive_one_shot_solve() {
    let path = scratch_config("defaults");
    let mut cfg = config::load_from(&path).expect("load");
    cfg.circuit.volts = 240.0;
    cfg.circuit.phase = Phase::Single;
    cfg.save().expect("save");

    let cfg = config::load_from(&path).expect("reload");
    let report = solve_once(&cfg, &SolveRequest::new(PowerQuantity::Kva, 2.4)).unwrap();
    assert_eq!(report.outputs[0].0, PowerQuantity::Kw);
    assert!((report.value_of(PowerQuantity::Amps) - 10.0).abs() < 1e-9);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn request_overrides_defaults() {
    let cfg = config::Config::default();
    let req = SolveRequest {
        volts: Some(208.0),
        power_factor: Some(0.9),
        phase: Some(Phase::Three),
        ..SolveRequest::new(PowerQuantity::Amps, 20.0)
    };
    let report = solve_once(&cfg, &req).unwrap();
    let kva = 208.0 * 20.0 * 1.73 / 1000.0;
    assert!((report.value_of(PowerQuantity::Kva) - kva).abs() < 1e-9);
    assert!((report.value_of(PowerQuantity::Kw) - kva * 0.9).abs() < 1e-9);
}

#[test]
fn invalid_request_surfaces_power_error() {
    let cfg = config::Config::default();
    let req = SolveRequest {
        efficiency: Some(0.0),
        ..SolveRequest::new(PowerQuantity::Hp, 5.0)
    };
    let err = solve_once(&cfg, &req).unwrap_err();
    assert!(matches!(err, AppError::Power(PowerError::DivisionByZero)));

    let req = SolveRequest::new(PowerQuantity::Kw, -1.0);
    let err = solve_once(&cfg, &req).unwrap_err();
    assert_eq!(err.to_string(), "KW cannot be negative");
}
