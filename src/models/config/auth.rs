use serde::{Deserialize, Serialize};

/// Shared secrets for dashboard users and field devices.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret the bearer tokens are signed with
    pub jwt_secret: String,

    /// Static key sensors and coolers send as `apikey` when posting readings
    pub device_api_key: String,
}

impl AuthConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("[auth] jwt_secret must be set");
        }
        if self.device_api_key.trim().is_empty() {
            anyhow::bail!("[auth] device_api_key must be set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_validate_rejects_blank_secrets() {
        let cfg = AuthConfig {
            jwt_secret: "   ".to_string(),
            device_api_key: "device".to_string(),
        };
        assert_err!(cfg.validate());

        let cfg = AuthConfig {
            jwt_secret: "secret".to_string(),
            device_api_key: String::new(),
        };
        assert_err!(cfg.validate());

        let cfg = AuthConfig {
            jwt_secret: "secret".to_string(),
            device_api_key: "device".to_string(),
        };
        assert_ok!(cfg.validate());
    }
}
