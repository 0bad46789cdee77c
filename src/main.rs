use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use power_calc::app::{self, AppError, SolveRequest};
use power_calc::quantity::{Phase, PowerQuantity};
use power_calc::ui_form::format_value;
use power_calc::{config, i18n, logging};
use tracing::error;

/// 교류 부하의 kVA / kW / hp / A 환산기.
#[derive(Parser, Debug)]
#[command(name = "power_calc_cli", version, about)]
struct Cli {
    /// 언어 (auto/ko/en)
    #[arg(short = 'L', long, default_value = "auto")]
    lang: String,
    /// 설정 파일 경로
    #[arg(long)]
    config: Option<PathBuf>,
    /// 로그 상세도 (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 한 번 계산하고 종료한다.
    Solve(SolveArgs),
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// 입력량
    #[arg(long, value_enum)]
    from: QuantityArg,
    /// 입력값
    #[arg(long, allow_negative_numbers = true)]
    value: f64,
    #[arg(long, allow_negative_numbers = true)]
    volts: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    power_factor: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    efficiency: Option<f64>,
    #[arg(long, value_enum)]
    phase: Option<PhaseArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QuantityArg {
    Kva,
    Kw,
    Hp,
    Amps,
}

impl From<QuantityArg> for PowerQuantity {
    fn from(value: QuantityArg) -> Self {
        match value {
            QuantityArg::Kva => PowerQuantity::Kva,
            QuantityArg::Kw => PowerQuantity::Kw,
            QuantityArg::Hp => PowerQuantity::Hp,
            QuantityArg::Amps => PowerQuantity::Amps,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PhaseArg {
    Single,
    Three,
}

impl From<PhaseArg> for Phase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Single => Phase::Single,
            PhaseArg::Three => Phase::Three,
        }
    }
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "power_calc_cli failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load_or_default()?,
    };
    logging::init(cli.verbose, &cfg.log_level);

    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    let mut tr = i18n::Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());

    match cli.command {
        Some(Command::Solve(args)) => {
            let req = SolveRequest {
                from: args.from.into(),
                value: args.value,
                volts: args.volts,
                power_factor: args.power_factor,
                efficiency: args.efficiency,
                phase: args.phase.map(Phase::from),
            };
            let report = app::solve_once(&cfg, &req)?;
            for (q, v) in report.outputs {
                println!("{} {q}", format_value(v));
            }
            Ok(())
        }
        None => app::run(&mut cfg, &mut tr),
    }
}
