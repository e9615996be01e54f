use std::time::Duration;

use scraper::{Html, Selector};
use tracing::debug;

use crate::error::{Error, Result};

/// Timeout applied when fetching schedule pages
const TIMEOUT: Duration = Duration::from_secs(10);

/// Get a webpage and parse it
pub async fn get_webpage(url: &str, user_agent: &str) -> Result<Html> {
    let transport = |source: reqwest::Error| Error::Transport {
        url: url.to_owned(),
        source,
    };

    // Use custom User-Agent
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(transport)?;

    debug!("GET {url}");
    let response = client
        .get(url)
        .timeout(TIMEOUT)
        .send()
        .await
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_owned(),
            status,
        });
    }

    let html = response.text().await.map_err(transport)?;

    // Parse document
    Ok(Html::parse_document(&html))
}

/// False when the page tells there is no schedule for this period
pub fn has_schedule(document: &Html) -> bool {
    let sel_info = Selector::parse("p.info").unwrap();

    document.select(&sel_info).next().is_none()
}

/// URL of the weekly plan of a group
pub fn schedule_url(base_url: &str, week: i32, group: &str) -> String {
    format!("{base_url}&week={week}&group={group}")
}

/// Check that a group is a non-negative integer
pub fn validate_group(raw: &str) -> Result<String> {
    let group = raw.trim();
    if !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()) {
        Ok(group.to_owned())
    } else {
        Err(Error::InvalidGroup(raw.to_owned()))
    }
}
