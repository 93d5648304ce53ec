mod basic;
mod client;
mod header;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use header::StaticHeader;

use anyhow::Result;

/// Issues a GET for `url` and returns the body.
///
/// # Errors
///
/// Returns an error for unparseable URLs, transport failures and non-2xx
/// responses.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
