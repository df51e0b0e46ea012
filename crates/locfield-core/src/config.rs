use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        parse_flag(&raw).ok_or_else(|| invalid(var, format!("expected a boolean, got \"{raw}\"")))
    };

    let admin_url = require("LOCFIELD_ADMIN_URL")?;
    let admin_token = lookup("LOCFIELD_ADMIN_TOKEN")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let log_level = or_default("LOCFIELD_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("LOCFIELD_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("LOCFIELD_USER_AGENT", "locfield/0.1 (location-field)");
    let places_base_url = or_default("LOCFIELD_PLACES_BASE_URL", "https://maps.googleapis.com");
    let places_v1_base_url =
        or_default("LOCFIELD_PLACES_V1_BASE_URL", "https://places.googleapis.com");
    let photo_max_width = parse_u32("LOCFIELD_PHOTO_MAX_WIDTH", "800")?;
    let fetch_opening_hours = parse_bool("LOCFIELD_FETCH_OPENING_HOURS", "true")?;
    let field_name = or_default("LOCFIELD_FIELD_NAME", "location");

    Ok(AppConfig {
        admin_url,
        admin_token,
        log_level,
        request_timeout_secs,
        user_agent,
        places_base_url,
        places_v1_base_url,
        photo_max_width,
        fetch_opening_hours,
        field_name,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
