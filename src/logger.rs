use crate::config::LogSettings;
use crate::error::StartupError;

use std::fmt::Display;
use std::str::FromStr;

use simplelog::{ColorChoice, LevelFilter, TerminalMode, TermLogger};


pub fn init_logger(cfg: &LogSettings) -> Result<(), StartupError> {
    let level = LevelFilter::from_str(&cfg.level)
        .map_err(|_| StartupError::Logger(format!("unknown log level `{}`", cfg.level)))?;

    TermLogger::init(
        level,
        prepare_logger_config(),
        TerminalMode::Stdout, ColorChoice::Auto
    ).map_err(|e| StartupError::Logger(e.to_string()))
}

/// Returns a closure for `map_err` that logs the error under `module` and
/// passes it through unchanged.
pub fn get_reporter<E: Display>(module: &'static str, what: &'static str) -> impl Fn(E) -> E {
    move |e| {
        warn!("[{}] {} failed: {}", module, what, e);
        e
    }
}


fn prepare_logger_config() -> simplelog::Config {
    let mut builder = simplelog::ConfigBuilder::new();
    builder.set_time_format_custom(
        simplelog::format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        )
    );
    // local offset is not always resolvable, timestamps stay in UTC then
    builder.set_time_offset_to_local().ok();
    builder.build()
}
