use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Proxy};
use std::time::Instant;
use url::Url;

use crate::error::ScanError;
use crate::models::{ResponseInfo, ScanConfig};

const MAX_REDIRECTS: usize = 10;

pub struct HttpClient {
    client: Client,
    auth: Option<(String, String)>,
}

impl HttpClient {
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let redirect = if config.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .redirect(redirect)
            .danger_accept_invalid_certs(!config.verify_tls)
            .user_agent(config.user_agent.as_str())
            .default_headers(Self::default_headers(config)?);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy).map_err(ScanError::Client)?);
        }

        let client = builder.build().map_err(ScanError::Client)?;

        Ok(Self {
            client,
            auth: config.auth.clone(),
        })
    }

    fn default_headers(config: &ScanConfig) -> Result<HeaderMap, ScanError> {
        let mut headers = HeaderMap::new();

        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ScanError::InvalidHeader(key.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ScanError::InvalidHeader(format!("{}: {}", key, value)))?;
            headers.insert(name, value);
        }

        if !config.cookies.is_empty() {
            let mut pairs: Vec<String> = config
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            pairs.sort();
            let cookie = pairs.join("; ");
            let value = HeaderValue::from_str(&cookie)
                .map_err(|_| ScanError::InvalidHeader(format!("Cookie: {}", cookie)))?;
            headers.insert(COOKIE, value);
        }

        Ok(headers)
    }

    /// Issues one GET. Transport failures and unreadable bodies are returned as errors.
    pub async fn get(&self, url: &Url) -> Result<ResponseInfo, reqwest::Error> {
        let start = Instant::now();

        let mut request = self.client.get(url.clone());
        if let Some((user, pass)) = &self.auth {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = Self::header(response.headers(), CONTENT_TYPE);
        let location = Self::header(response.headers(), LOCATION);

        let bytes = response.bytes().await?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(ResponseInfo {
            status,
            size: bytes.len(),
            body,
            content_type,
            location,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn header(headers: &HeaderMap, name: HeaderName) -> Option<String> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }
}
