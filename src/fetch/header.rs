use crate::fetch::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that sets a fixed header on every request.
///
/// The tunnelled backend answers with an HTML interstitial unless
/// `ngrok-skip-browser-warning` is present, so station requests go through
/// [`StaticHeader::skip_browser_warning`].
pub struct StaticHeader<C> {
    inner: C,
    name: HeaderName,
    value: HeaderValue,
}

impl<C> StaticHeader<C> {
    /// Wraps `inner`, validating the header up front.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` or `value` is not a legal HTTP header.
    pub fn new(inner: C, name: &str, value: &str) -> Result<Self> {
        Ok(Self {
            inner,
            name: HeaderName::from_bytes(name.as_bytes())?,
            value: HeaderValue::from_str(value)?,
        })
    }

    pub fn skip_browser_warning(inner: C) -> Self {
        Self {
            inner,
            name: HeaderName::from_static("ngrok-skip-browser-warning"),
            value: HeaderValue::from_static("true"),
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for StaticHeader<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(self.name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
