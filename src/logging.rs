use std::fmt::Display;

use colored::Colorize;
use log::Level;

use crate::config::LogLevel;

/// External crates only need to log warnings and errors
const ALLOWED_EXTERNAL_LEVELS: [Level; 2] = [Level::Warn, Level::Error];

pub fn init_logger(log_level: LogLevel) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = Target::from_str(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                level_to_string(&record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target,
                message
            ))
        })
        .filter(move |meta| is_logged(&Target::from_str(meta.target()), meta.level(), log_level))
        .chain(std::io::stdout())
        .apply()
}

/// Local records follow the configured level, external ones only get through when severe
fn is_logged(target: &Target, level: Level, log_level: LogLevel) -> bool {
    let is_allowed = level <= log_level.max_level();
    let is_severe = ALLOWED_EXTERNAL_LEVELS.contains(&level);

    target.is_local() && is_allowed || is_severe
}

enum Target {
    External(String),
    Main,
    Server,
    Party,
    Core,
}

impl Target {
    fn from_str(str: &str) -> Self {
        let module = str.split("::").next().unwrap_or_default();

        match module {
            "rating_party" => Self::Main,
            "rating_party_core" => Self::Core,
            "rating_party_server" => Self::Server,
            "rating_party_collab" => Self::Party,
            other => Target::External(other.to_string()),
        }
    }

    fn is_local(&self) -> bool {
        !matches!(self, Self::External(_))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Target::External(x) => x.as_str().clear(),
            Target::Main => "MAIN".bright_white(),
            Target::Server => "SERVER".bright_green(),
            Target::Party => "PARTY".bright_purple(),
            Target::Core => "CORE".blue(),
        };

        Display::fmt(&result, f)
    }
}

fn level_to_string(level: &Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}
