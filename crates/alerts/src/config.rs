//! SMS account configuration.

use serde::{Deserialize, Serialize};

/// Aliyun SMS account and template settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmsConfig {
    /// API access key id.
    pub access_id: String,
    /// API access key secret.
    pub access_key: String,
    /// Registered SMS sign name.
    pub sign_name: String,
    /// Registered SMS template code.
    pub template_code: String,
    /// Phone number that receives the alerts.
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_roundtrip() {
        let config = SmsConfig {
            access_id: "LTAI4example".to_string(),
            access_key: "secret".to_string(),
            sign_name: "coinwatch".to_string(),
            template_code: "SMS_135043012".to_string(),
            phone: "13800000000".to_string(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SmsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.template_code, config.template_code);
        assert_eq!(parsed.phone, config.phone);
    }
}
