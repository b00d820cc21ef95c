//! Aliyun Dysms `SendSms` client.

use crate::SmsConfig;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use coinwatch_core::Observation;
use coinwatch_engine::{AlertSink, SinkError};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const API_URL: &str = "https://dysmsapi.aliyuncs.com/";
const API_VERSION: &str = "2017-05-25";
const REGION_ID: &str = "cn-hangzhou";

/// Errors from the SMS gateway.
#[derive(Debug, Error)]
pub enum SmsError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sms rejected: {code}: {message}")]
    Rejected { code: String, message: String },

    #[error("failed to encode template param: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Template parameter payload; keys match the SMS template placeholders.
#[derive(Debug, Serialize)]
struct TemplateParam<'a> {
    platform: &'a str,
    cointype: &'a str,
    price: &'a str,
    percent: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendSmsResponse {
    #[serde(rename = "Code", default)]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

/// SMS notification client for the Aliyun Dysms REST API.
#[derive(Debug, Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    config: SmsConfig,
}

impl SmsClient {
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, config })
    }

    /// Send one price alert.
    pub async fn send_alert(&self, observation: &Observation) -> Result<(), SmsError> {
        let template_param = serde_json::to_string(&TemplateParam {
            platform: &observation.platform,
            cointype: &observation.coin,
            price: &observation.price,
            percent: &observation.percent,
        })?;

        let params = self.request_params(
            &template_param,
            &Uuid::new_v4().to_string(),
            &Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        );
        let query = signed_query(&params, &self.config.access_key);

        let response = self
            .http
            .get(format!("{API_URL}?{query}"))
            .send()
            .await?;
        let body: SendSmsResponse = response.json().await?;
        if body.code != "OK" {
            return Err(SmsError::Rejected {
                code: body.code,
                message: body.message,
            });
        }

        debug!(coin = %observation.coin, "sms sent");
        Ok(())
    }

    /// Unsigned request parameters for one `SendSms` call.
    fn request_params(
        &self,
        template_param: &str,
        nonce: &str,
        timestamp: &str,
    ) -> Vec<(String, String)> {
        vec![
            ("AccessKeyId".to_string(), self.config.access_id.clone()),
            ("Action".to_string(), "SendSms".to_string()),
            ("Format".to_string(), "JSON".to_string()),
            ("PhoneNumbers".to_string(), self.config.phone.clone()),
            ("RegionId".to_string(), REGION_ID.to_string()),
            ("SignName".to_string(), self.config.sign_name.clone()),
            ("SignatureMethod".to_string(), "HMAC-SHA1".to_string()),
            ("SignatureNonce".to_string(), nonce.to_string()),
            ("SignatureVersion".to_string(), "1.0".to_string()),
            ("TemplateCode".to_string(), self.config.template_code.clone()),
            ("TemplateParam".to_string(), template_param.to_string()),
            ("Timestamp".to_string(), timestamp.to_string()),
            ("Version".to_string(), API_VERSION.to_string()),
        ]
    }
}

#[async_trait]
impl AlertSink for SmsClient {
    async fn send(&self, observation: &Observation) -> Result<(), SinkError> {
        self.send_alert(observation).await.map_err(Into::into)
    }
}

/// RFC3986 percent-encoding as the signature scheme requires: unreserved
/// characters pass through, space becomes `%20`, everything else `%XX`.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Canonical query string with the RPC signature appended.
///
/// Parameters are sorted by key, percent-encoded into `k=v` pairs, and the
/// string-to-sign is `GET&%2F&<encoded-query>` signed with HMAC-SHA1 under
/// `<access_key>&`.
fn signed_query(params: &[(String, String)], access_key: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let string_to_sign = format!("GET&{}&{}", percent_encode("/"), percent_encode(&canonical));

    let mut mac = Hmac::<Sha1>::new_from_slice(format!("{access_key}&").as_bytes())
        .expect("hmac accepts any key length");
    mac.update(string_to_sign.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    format!("{canonical}&Signature={}", percent_encode(&signature))
}
