//! HTTP client for the ticker site: login and user-ticker scraping.

use crate::{FeedError, Session};
use coinwatch_core::{Observation, WatchFilter};
use reqwest::header::{COOKIE, SET_COOKIE};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Endpoints and timeout for the ticker site.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub login_url: String,
    pub ticker_url: String,
    /// Request timeout applied to every call.
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            login_url: "https://api.feixiaohao.com/user/login".to_string(),
            ticker_url: "https://www.feixiaohao.com/userticker/".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Login payload; field names are what the login endpoint expects.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "PassWD")]
    pub password: String,
    #[serde(rename = "IsRemember")]
    pub remember: bool,
}

impl LoginCredentials {
    pub fn new(user_id: &str, password: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            password: password.to_string(),
            remember: false,
        }
    }
}

/// Login endpoint response envelope.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    status: String,
    #[serde(default)]
    #[allow(dead_code)]
    code: String,
    #[serde(default)]
    content: String,
}

/// HTTP client for the ticker site.
#[derive(Debug, Clone)]
pub struct TickerClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl TickerClient {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Authenticate and capture the cookie session.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, FeedError> {
        let response = self
            .http
            .post(&self.config.login_url)
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        // Cookies must be read before the body consumes the response.
        let session = Session::from_set_cookie_headers(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
        );

        let body: LoginResponse = response.json().await?;
        if body.status != "success" {
            return Err(FeedError::LoginRejected(body.content));
        }

        debug!(cookies = session.len(), "login succeeded");
        Ok(session)
    }

    /// Fetch the user-ticker page and extract the watched rows.
    pub async fn fetch_observations(
        &self,
        session: &Session,
        filter: &WatchFilter,
    ) -> Result<Vec<Observation>, FeedError> {
        let response = self
            .http
            .get(&self.config.ticker_url)
            .header(COOKIE, session.cookie_header())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        let body = response.text().await?;
        let observations = parse_ticker_table(&body, filter)?;
        debug!(rows = observations.len(), "ticker page fetched");
        Ok(observations)
    }
}

/// Extract watched rows from the user-ticker HTML table.
///
/// Cell layout on the page: 1 = coin, 2 = platform, 3 = price, 6 = percent.
pub fn parse_ticker_table(
    html: &str,
    filter: &WatchFilter,
) -> Result<Vec<Observation>, FeedError> {
    let rows = Selector::parse(".new-table.new-table-custom#table tbody>tr")
        .map_err(|e| FeedError::Parse(e.to_string()))?;
    let cells = Selector::parse("td").map_err(|e| FeedError::Parse(e.to_string()))?;

    let document = Html::parse_document(html);
    let mut observations = Vec::new();

    for row in document.select(&rows) {
        let text: Vec<String> = row
            .select(&cells)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if text.len() < 7 {
            continue;
        }
        if !filter.watches(&text[1]) {
            continue;
        }
        observations.push(Observation::new(&text[2], &text[1], &text[3], &text[6]));
    }

    Ok(observations)
}
