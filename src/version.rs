/// Build version; `APP_VERSION` at compile time overrides the Cargo version.
pub const VERSION: &str = match option_env!("APP_VERSION") {
    Some(val) => val,
    None => env!("CARGO_PKG_VERSION"),
};

/// Value of the `User-Agent` header sent with every probe.
pub fn user_agent() -> String {
    format!("uptime-checker/{VERSION}")
}
