use crate::config;

/// Load settings, using the defaults when the file cannot be read or does not
/// validate.
///
/// Logging is configured from these settings, so the problem is handed back
/// for the caller to log once the subscriber exists.
pub fn load_settings() -> (config::Settings, Option<String>) {
    let problem = match config::Settings::load() {
        Ok(s) => match s.validate() {
            Ok(()) => return (s, None),
            Err(msg) => format!("invalid config, using defaults: {msg}"),
        },
        Err(e) => format!("failed to load config, using defaults: {e}"),
    };
    eprintln!("clickwheel: {problem}");
    (config::Settings::default(), Some(problem))
}
