//! Electricity Outlook portal client.
//!
//! Logs in with the account's email and password, then downloads the
//! half-hourly usage CSV using the session cookie set at login.

use std::path::Path;
use std::time::Duration;

use jemena_core::error::{JemenaError, Result};
use jemena_core::settings::Credentials;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

// ── Endpoints ─────────────────────────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "https://electricityoutlook.jemena.com.au";
pub const LOGIN_PATH: &str = "/login_security_check";
pub const DOWNLOAD_PATH: &str = "/electricityView/download";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ── PortalClient ──────────────────────────────────────────────────────────────

/// HTTP session against the portal. Cookies persist across requests.
pub struct PortalClient {
    base_url: String,
    client: Client,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| JemenaError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Client for the production portal.
    pub fn production() -> Result<Self> {
        Self::new(DEFAULT_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit the login form. Anything other than HTTP 200 is a failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        debug!("Logging in as {} via {}", credentials.email, url);

        let form = [
            ("login_email", credentials.email.as_str()),
            ("login_password", credentials.password.as_str()),
            ("submit", "Sign In"),
        ];
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(http_error)?;

        match response.status() {
            StatusCode::OK => {
                info!("Logged in to {}", self.base_url);
                Ok(())
            }
            status => {
                error!("Login failed with status {}", status);
                Err(JemenaError::LoginFailed {
                    status: status.as_u16(),
                })
            }
        }
    }

    /// Fetch the usage CSV for the logged-in session.
    pub async fn download_csv(&self) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, DOWNLOAD_PATH);
        debug!("Downloading usage CSV from {}", url);

        let response = self.client.get(&url).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            error!("Download failed with status {}", status);
            return Err(JemenaError::DownloadFailed {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(http_error)?;
        debug!("Downloaded {} bytes", body.len());
        Ok(body.to_vec())
    }

    /// Log in, download the CSV and write it to `dest`, replacing any
    /// existing file. Returns the number of bytes written.
    pub async fn update(&self, credentials: &Credentials, dest: &Path) -> Result<u64> {
        self.login(credentials).await?;
        let body = self.download_csv().await?;
        tokio::fs::write(dest, &body).await?;
        info!("Saved {} bytes to {}", body.len(), dest.display());
        Ok(body.len() as u64)
    }
}

fn http_error(e: reqwest::Error) -> JemenaError {
    JemenaError::Http(e.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    const CSV_BODY: &str = "NMI,METER SERIAL NUMBER,CON/GEN,DATE,ESTIMATED?,00:00 - 00:30\n\
                            600,M1,CON,2024-01-01,N,0.1\n";

    fn credentials() -> Credentials {
        Credentials {
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        }
    }

    fn login_form_matcher() -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("login_email".into(), "me@example.com".into()),
            Matcher::UrlEncoded("login_password".into(), "hunter2".into()),
            Matcher::UrlEncoded("submit".into(), "Sign In".into()),
        ])
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = PortalClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_production_base_url() {
        let client = PortalClient::production().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_login_posts_form_fields() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", LOGIN_PATH)
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(login_form_matcher())
            .with_status(200)
            .create_async()
            .await;

        let client = PortalClient::new(server.url()).unwrap();
        client.login(&credentials()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", LOGIN_PATH)
            .with_status(401)
            .create_async()
            .await;

        let client = PortalClient::new(server.url()).unwrap();
        let result = client.login(&credentials()).await;

        assert!(matches!(result, Err(JemenaError::LoginFailed { status: 401 })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_failure_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", DOWNLOAD_PATH)
            .with_status(500)
            .create_async()
            .await;

        let client = PortalClient::new(server.url()).unwrap();
        let result = client.download_csv().await;

        assert!(matches!(result, Err(JemenaError::DownloadFailed { status: 500 })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_writes_csv() {
        let mut server = Server::new_async().await;
        let login = server
            .mock("POST", LOGIN_PATH)
            .match_body(login_form_matcher())
            .with_status(200)
            .with_header("set-cookie", "JSESSIONID=abc123; Path=/")
            .create_async()
            .await;
        let download = server
            .mock("GET", DOWNLOAD_PATH)
            .match_header("cookie", Matcher::Regex("JSESSIONID=abc123".to_string()))
            .with_status(200)
            .with_header("content-type", "text/csv")
            .with_body(CSV_BODY)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("electricity_outlook.csv");
        let client = PortalClient::new(server.url()).unwrap();
        let written = client.update(&credentials(), &dest).await.unwrap();

        assert_eq!(written, CSV_BODY.len() as u64);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), CSV_BODY);
        login.assert_async().await;
        download.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_stops_after_failed_login() {
        let mut server = Server::new_async().await;
        let login = server
            .mock("POST", LOGIN_PATH)
            .with_status(403)
            .create_async()
            .await;
        let download = server
            .mock("GET", DOWNLOAD_PATH)
            .expect(0)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("electricity_outlook.csv");
        let client = PortalClient::new(server.url()).unwrap();
        let result = client.update(&credentials(), &dest).await;

        assert!(matches!(result, Err(JemenaError::LoginFailed { status: 403 })));
        assert!(!dest.exists());
        login.assert_async().await;
        download.assert_async().await;
    }
}
