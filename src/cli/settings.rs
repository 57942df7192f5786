//! `lumon set` / `lumon unset` handling.

use crate::core::config::Config;
use crate::utils::url::validate_base_url;

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// Required arguments are missing.
    MissingValue {
        key: &'static str,
        example: &'static str,
    },
    /// The value could not be used for the key.
    InvalidValue { key: &'static str, reason: String },
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Known keys: base-url, timeout, welcome-message");
            }
            SettingError::MissingValue { key, example } => {
                eprintln!("⚠️  Specify a value for {key}.");
                eprintln!("Example: {example}");
            }
            SettingError::InvalidValue { key, reason } => {
                eprintln!("❌ Invalid value for {key}: {reason}");
            }
        }
    }
}

pub fn apply_set(config: &mut Config, key: &str, value: &str) -> Result<String, SettingError> {
    let value = value.trim();
    match key {
        "base-url" => {
            if value.is_empty() {
                return Err(SettingError::MissingValue {
                    key: "base-url",
                    example: "lumon set base-url http://127.0.0.1:5000",
                });
            }
            let url = validate_base_url(value).map_err(|reason| SettingError::InvalidValue {
                key: "base-url",
                reason,
            })?;
            let confirmation = format!("Set base-url to: {url}");
            config.base_url = Some(url);
            Ok(confirmation)
        }
        "timeout" => {
            if value.is_empty() {
                return Err(SettingError::MissingValue {
                    key: "timeout",
                    example: "lumon set timeout 60",
                });
            }
            let secs = value
                .trim_end_matches('s')
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| SettingError::InvalidValue {
                    key: "timeout",
                    reason: format!("'{value}' is not a positive number of seconds"),
                })?;
            config.timeout_secs = Some(secs);
            Ok(format!("Set timeout to: {secs}s"))
        }
        "welcome-message" => {
            if value.is_empty() {
                return Err(SettingError::MissingValue {
                    key: "welcome-message",
                    example: "lumon set welcome-message Hi! What are we growing today?",
                });
            }
            config.welcome_message = Some(value.to_string());
            Ok(format!("Set welcome-message to: {value}"))
        }
        _ => Err(SettingError::UnknownKey(key.to_string())),
    }
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    match key {
        "base-url" => config.base_url = None,
        "timeout" => config.timeout_secs = None,
        "welcome-message" => config.welcome_message = None,
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    Ok(format!("Unset {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_base_url_normalizes_and_validates() {
        let mut config = Config::default();
        let message = apply_set(&mut config, "base-url", "https://plants.example.com/")
            .expect("valid url");
        assert_eq!(message, "Set base-url to: https://plants.example.com");
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://plants.example.com")
        );

        let err = apply_set(&mut config, "base-url", "plants.example.com").unwrap_err();
        assert!(matches!(err, SettingError::InvalidValue { key: "base-url", .. }));
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://plants.example.com")
        );
    }

    #[test]
    fn set_timeout_accepts_seconds_suffix() {
        let mut config = Config::default();
        apply_set(&mut config, "timeout", "45s").expect("valid timeout");
        assert_eq!(config.timeout_secs, Some(45));

        for bad in ["0", "-3", "soon"] {
            assert!(
                apply_set(&mut config, "timeout", bad).is_err(),
                "timeout {bad:?} should be refused"
            );
        }
        assert_eq!(config.timeout_secs, Some(45));
    }

    #[test]
    fn missing_values_and_unknown_keys_are_reported() {
        let mut config = Config::default();
        assert!(matches!(
            apply_set(&mut config, "welcome-message", "   "),
            Err(SettingError::MissingValue { .. })
        ));
        assert_eq!(
            apply_set(&mut config, "theme", "dark"),
            Err(SettingError::UnknownKey("theme".to_string()))
        );
        assert_eq!(
            apply_unset(&mut config, "theme"),
            Err(SettingError::UnknownKey("theme".to_string()))
        );
    }

    #[test]
    fn unset_clears_the_key() {
        let mut config = Config {
            welcome_message: Some("Hi".to_string()),
            timeout_secs: Some(10),
            ..Default::default()
        };
        apply_unset(&mut config, "welcome-message").expect("known key");
        assert_eq!(config.welcome_message, None);
        assert_eq!(config.timeout_secs, Some(10));
    }
}
