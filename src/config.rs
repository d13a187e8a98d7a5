use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub frontend_origin: String,
    pub bind_addr: String,
    /// Reject request edits that the edit hooks disallow instead of only
    /// logging them.
    pub enforce_edit_policy: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let enforce_edit_policy = match lookup("ENFORCE_EDIT_POLICY") {
            None => false,
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "ENFORCE_EDIT_POLICY",
                value,
            })?,
        };

        Ok(Self {
            mongo_uri: required("MONGO_URI")?,
            database_name: lookup("DATABASE_NAME").unwrap_or_else(|| "gearguard".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            frontend_origin: lookup("FRONTEND_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            enforce_edit_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("MONGO_URI", "mongodb://db"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.database_name, "gearguard");
        assert_eq!(config.frontend_origin, "http://localhost:3000");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(!config.enforce_edit_policy);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = load(&[("MONGO_URI", "mongodb://db")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn edit_policy_flag_is_parsed() {
        let config = load(&[
            ("MONGO_URI", "mongodb://db"),
            ("JWT_SECRET", "s3cret"),
            ("ENFORCE_EDIT_POLICY", "true"),
        ])
        .unwrap();
        assert!(config.enforce_edit_policy);

        let err = load(&[
            ("MONGO_URI", "mongodb://db"),
            ("JWT_SECRET", "s3cret"),
            ("ENFORCE_EDIT_POLICY", "sometimes"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
