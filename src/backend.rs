// Backend client handle
//
// Built once at startup from a validated BackendConfig. URL helpers are always
// available; the HTTP calls need the `remote` feature (reqwest + tokio).
//
// The backend speaks a PostgREST-style API: rows live under /rest/v1/{table},
// filters are query params like `profile_id=eq.<value>`.

use crate::config::{BackendConfig, Environment};
use crate::errors::BackendError;

#[cfg(feature = "remote")]
use serde::{de::DeserializeOwned, Serialize};

/// Upsert on primary key; re-sending already pushed rows updates them in place
pub const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    api_key: String,
    #[cfg(feature = "remote")]
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &BackendConfig, environment: Environment) -> Result<Self, BackendError> {
        config.validate(environment)?;

        log::info!(
            "Backend client ready for {} ({})",
            config.url.trim(),
            environment.as_str()
        );

        Ok(BackendClient {
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            #[cfg(feature = "remote")]
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// `{table}?{column}=eq.{value}` with the value percent-encoded
    pub fn filter_url(&self, table: &str, column: &str, value: &str) -> String {
        format!(
            "{}?{}=eq.{}",
            self.rest_url(table),
            column,
            urlencoding::encode(value)
        )
    }

    /// Header pairs every request carries
    pub fn auth_headers(&self) -> [(&'static str, String); 2] {
        [
            ("apikey", self.api_key.clone()),
            ("Authorization", format!("Bearer {}", self.api_key)),
        ]
    }
}

#[cfg(feature = "remote")]
impl BackendClient {
    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        self.auth_headers()
            .into_iter()
            .fold(request, |req, (name, value)| req.header(name, value))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("Backend request failed with {}: {}", status, body);
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn fetch_rows<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, BackendError> {
        self.get_json(self.rest_url(table)).await
    }

    pub async fn fetch_where<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<T>, BackendError> {
        self.get_json(self.filter_url(table, column, value)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>, BackendError> {
        log::debug!("GET {}", url);
        let response = self.with_auth(self.http.get(&url)).send().await?;
        let rows = Self::check(response).await?.json::<Vec<T>>().await?;
        Ok(rows)
    }

    fn upsert_request<T: Serialize>(&self, table: &str, rows: &[T]) -> reqwest::RequestBuilder {
        self.with_auth(self.http.post(self.rest_url(table)))
            .header("Prefer", UPSERT_PREFER)
            .json(rows)
    }

    /// Insert-or-update rows by id, so pushing the same rows twice is safe
    pub async fn insert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<usize, BackendError> {
        if rows.is_empty() {
            return Ok(0);
        }

        log::debug!("POST {} ({} rows)", self.rest_url(table), rows.len());

        let response = self.upsert_request(table, rows).send().await?;
        Self::check(response).await?;

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;

    fn config(url: &str, key: &str) -> BackendConfig {
        BackendConfig {
            url: url.to_string(),
            api_key: key.to_string(),
        }
    }

    #[test]
    fn test_client_urls() {
        let client = BackendClient::new(
            &config("https://abc.example.co/", "anon"),
            Environment::Production,
        )
        .unwrap();

        assert_eq!(client.base_url(), "https://abc.example.co");
        assert_eq!(client.rest_url("savings"), "https://abc.example.co/rest/v1/savings");
        assert_eq!(
            client.filter_url("savings", "profile_id", "a b&c"),
            "https://abc.example.co/rest/v1/savings?profile_id=eq.a%20b%26c"
        );
    }

    #[test]
    fn test_auth_headers() {
        let client = BackendClient::new(
            &config("http://localhost:54321", " secret "),
            Environment::Development,
        )
        .unwrap();

        let headers = client.auth_headers();
        assert_eq!(headers[0], ("apikey", "secret".to_string()));
        assert_eq!(headers[1], ("Authorization", "Bearer secret".to_string()));
    }

    #[cfg(feature = "remote")]
    #[test]
    fn test_insert_request_is_an_upsert() {
        let client = BackendClient::new(
            &config("https://abc.example.co", "anon"),
            Environment::Production,
        )
        .unwrap();

        let rows = vec![serde_json::json!({ "id": "c-1", "title": "Trip" })];
        let request = client.upsert_request("challenges", &rows).build().unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://abc.example.co/rest/v1/challenges");

        let headers = request.headers();
        assert_eq!(headers.get("Prefer").unwrap(), UPSERT_PREFER);
        assert_eq!(headers.get("apikey").unwrap(), "anon");
        assert_eq!(headers.get("Authorization").unwrap(), "Bearer anon");
    }

    #[test]
    fn test_placeholder_credentials_rejected() {
        let err = BackendClient::new(&config("", ""), Environment::Development).unwrap_err();
        assert!(matches!(
            err,
            BackendError::Config(ConfigError::Empty { .. })
        ));
    }
}
