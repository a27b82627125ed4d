use std::time::Duration;

use async_trait::async_trait;

use cutbot_core::{errors::Error, Result};

/// Raw HTTP reply: status code plus undecoded body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    Connect(String),
    Other(String),
}

/// The single HTTP exchange the client needs. Swapped for a stub in tests.
#[async_trait]
pub trait CuttlyTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> std::result::Result<HttpReply, TransportFailure>;
}

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::from_builder(reqwest::Client::builder().timeout(timeout))
    }

    fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self> {
        let http = builder
            .user_agent(concat!("cutbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::External(format!("reqwest client build: {e}")))?;
        Ok(Self { http })
    }
}

fn classify(e: reqwest::Error) -> TransportFailure {
    if e.is_timeout() {
        TransportFailure::Timeout
    } else if e.is_connect() {
        TransportFailure::Connect(e.to_string())
    } else {
        TransportFailure::Other(e.to_string())
    }
}

#[async_trait]
impl CuttlyTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> std::result::Result<HttpReply, TransportFailure> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status().as_u16();
        // Body reads share the client timeout.
        let body = resp.text().await.map_err(classify)?;
        Ok(HttpReply { status, body })
    }
}
