//! The configuration structs used to build the AppConfig, and their impls.
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use strum_macros::AsRefStr;

use crate::config::ConfigError;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(Debug, AsRefStr)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub mailjet_config: MailjetConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

/// Mailjet REST API settings.
/// The three secrets are optional here: the service still starts without them and
/// answers subscription requests with a configuration error instead.
#[derive(Deserialize, Clone, Debug)]
pub struct MailjetConfig {
    pub base_url: String,
    pub timeout_millis: u64,
    #[serde(default, deserialize_with = "lossy_secret")]
    pub api_key: Option<SecretString>,
    #[serde(default, deserialize_with = "lossy_secret")]
    pub secret_key: Option<SecretString>,
    #[serde(default, deserialize_with = "lossy_string")]
    pub contact_list_id: Option<String>,
}

/// The complete set of Mailjet credentials, only available when none of them is missing.
#[derive(Clone, Debug)]
pub struct MailjetCredentials {
    pub api_key: SecretString,
    pub secret_key: SecretString,
    pub contact_list_id: String,
}

// ###################################
// ->   IMPLs
// ###################################
impl MailjetConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }

    pub fn credentials(&self) -> Option<MailjetCredentials> {
        Some(MailjetCredentials {
            api_key: self.api_key.clone()?,
            secret_key: self.secret_key.clone()?,
            contact_list_id: self.contact_list_id.clone()?,
        })
    }
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

// ###################################
// ->   HELPERS
// ###################################
/// Env values get parsed by figment, so a list id like `10245` arrives as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

/// Accepts strings and integers, treats empty strings as missing.
fn lossy_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|v| match v {
        StringOrNumber::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        StringOrNumber::Unsigned(n) => Some(n.to_string()),
        StringOrNumber::Signed(n) => Some(n.to_string()),
    });
    Ok(value)
}

fn lossy_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lossy_string(deserializer)?.map(SecretString::from))
}
