use crate::language::Language;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Credentials are given in full or not at all
/// - Base URL ends with a slash (paths are appended to it)
/// - Timeout is not 0
/// - Every language code is known
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let provider = &config.provider;

    if provider.username.is_some() != provider.password.is_some() {
        return Err(ConfigError::ValidationError(
            "provider.username and provider.password must be set together".to_string(),
        ));
    }

    if !provider.base_url.ends_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "provider.base_url must end with '/': {}",
            provider.base_url
        )));
    }

    if provider.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "provider.timeout_secs cannot be 0".to_string(),
        ));
    }

    for code in &config.languages {
        Language::from_alpha2(code)
            .map_err(|e| ConfigError::ValidationError(format!("languages: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_half_credentials_fails() {
        let mut config = Config::default();
        config.provider.username = Some("user".to_string());
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        config.provider.username = None;
        config.provider.password = Some("secret".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_base_url_without_slash_fails() {
        let mut config = Config::default();
        config.provider.base_url = "http://example.com/he".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.provider.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_unknown_language_fails() {
        let mut config = Config::default();
        config.languages = vec!["he".to_string(), "xx".to_string()];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("xx"));
    }
}
