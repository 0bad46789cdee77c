use tracing_subscriber::EnvFilter;

/// `-v` 개수를 로그 레벨로 바꾼다. 0 이면 None (설정 파일 값을 사용).
pub fn level_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// stderr 로 출력하는 tracing subscriber 를 설치한다.
///
/// 우선순위: RUST_LOG → `-v` 플래그 → 설정 파일의 `log_level`.
/// 이미 설치되어 있으면 아무것도 하지 않는다.
pub fn init(verbose: u8, config_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_from_verbosity(verbose).unwrap_or(config_level);
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_from_verbosity(0), None);
        assert_eq!(level_from_verbosity(2), Some("debug"));
        assert_eq!(level_from_verbosity(9), Some("trace"));
    }
}
