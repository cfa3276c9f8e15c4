use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::warn;

use crate::error::{MonitorError, Result};

pub fn create_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .cookie_store(true)
        .pool_max_idle_per_host(2)
        .build()?;

    Ok(client)
}

/// A fetched document together with the URL it ended up at after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
}

/// GET a page once, bounded by `timeout`. Timeouts are not retried.
pub async fn fetch_page(client: &Client, url: &str, timeout: Duration) -> Result<FetchedPage> {
    let request = async {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {}: {}", status, url);
            return Err(MonitorError::Navigation {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        Ok(FetchedPage { url: final_url, html })
    };

    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result,
        Err(_) => Err(MonitorError::Timeout {
            url: url.to_string(),
            after: timeout,
        }),
    }
}
