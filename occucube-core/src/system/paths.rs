use std::path::PathBuf;
use std::sync::OnceLock;

// Cached to avoid repeated environment lookups
static OCCUCUBE_HOME: OnceLock<PathBuf> = OnceLock::new();

/// Generate a UTC timestamp for run summaries
/// Returns RFC 3339 with second precision, e.g. 2024-03-01T12:00:00Z
pub fn generate_utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Get the occucube home directory
/// Checks OCCUCUBE_HOME environment variable, falls back to ~/.occucube
pub fn occucube_home() -> PathBuf {
    OCCUCUBE_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("OCCUCUBE_HOME") {
                PathBuf::from(path)
            } else {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".occucube")
            }
        })
        .clone()
}

/// Location of the user configuration file
pub fn default_config_path() -> PathBuf {
    occucube_home().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format() {
        let ts = generate_utc_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_config_path_is_under_home() {
        assert!(default_config_path().starts_with(occucube_home()));
        assert!(default_config_path().ends_with("config.toml"));
    }
}
