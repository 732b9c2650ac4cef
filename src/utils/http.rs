use anyhow::Context;
use reqwest::Client;
use std::time::Duration;
use teloxide::Bot;

/// Bot on top of teloxide's own reqwest settings, so the client type matches the one
/// teloxide was built against.
pub fn create_telegram_bot(token: impl Into<String>) -> anyhow::Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent(concat!("chatkeeper/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build Telegram client")?;

    Ok(Bot::with_client(token, client))
}

/// Client for the joke, comic and calendar sources. `timeout` bounds each whole request.
pub fn create_content_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .pool_idle_timeout(Duration::from_secs(60))
        .user_agent(concat!("chatkeeper/", env!("CARGO_PKG_VERSION")))
        .build()
}
