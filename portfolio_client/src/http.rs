use std::ops::Deref;

use anyhow::Context;

pub const USER_AGENT: &str = concat!("portfolio-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpClient(reqwest::Client);

impl HttpClient {
    pub fn new() -> anyhow::Result<Self> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map(Self)
            .context("Failed to create http client")
    }
}

impl Deref for HttpClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
