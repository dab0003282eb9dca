use super::errors::ConfigError;

/// Shared-secret transaction authentication key.
///
/// Configured as `name:secret`. The name is always kept fully qualified
/// (trailing dot) because that is how it appears on the wire; the secret
/// is the base64 string exactly as configured and only decoded when a
/// signature is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsigKey {
    pub name: String,
    pub secret: String,
}

impl TsigKey {
    /// Parses the `name:secret` form. An empty string means no key.
    pub fn parse(raw: &str) -> Result<Option<Self>, ConfigError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let (name, secret) = raw.split_once(':').ok_or_else(|| {
            ConfigError::Validation(format!(
                "TSIG key must have the form name:secret, got '{}'",
                raw
            ))
        })?;

        if name.trim_end_matches('.').is_empty() {
            return Err(ConfigError::Validation(
                "TSIG key name cannot be empty".to_string(),
            ));
        }
        if secret.is_empty() {
            return Err(ConfigError::Validation(
                "TSIG secret cannot be empty".to_string(),
            ));
        }

        Ok(Some(Self {
            name: fqdn(name),
            secret: secret.to_string(),
        }))
    }
}

/// Appends the root label if it is missing.
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_makes_name_fully_qualified() {
        let key = TsigKey::parse("examplekey:examplesecret").unwrap().unwrap();
        assert_eq!(key.name, "examplekey.");
        assert_eq!(key.secret, "examplesecret");
    }

    #[test]
    fn test_parse_keeps_existing_root_label() {
        let key = TsigKey::parse("key.example.:c2VjcmV0").unwrap().unwrap();
        assert_eq!(key.name, "key.example.");
    }

    #[test]
    fn test_secret_may_contain_colons() {
        let key = TsigKey::parse("k:a:b").unwrap().unwrap();
        assert_eq!(key.secret, "a:b");
    }

    #[test]
    fn test_empty_means_unauthenticated() {
        assert_eq!(TsigKey::parse("").unwrap(), None);
        assert_eq!(TsigKey::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        assert!(TsigKey::parse("justaname").is_err());
        assert!(TsigKey::parse(":secret").is_err());
        assert!(TsigKey::parse("name:").is_err());
    }
}
