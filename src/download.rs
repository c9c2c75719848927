//! Downloads a single subset file.

use std::{
    error::Error as StdError,
    future::Future,
    io::{self, Write},
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Why one download attempt failed. Every kind is retried.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("failed to reach a server: {0}")]
    Unreachable(String),
    #[error("server could not fulfill the request: {0}")]
    Rejected(StatusCode),
    #[error("socket timed out")]
    TimedOut,
    #[error("transfer failed: {0}")]
    Transfer(String),
    #[error("failed to write download: {0}")]
    Write(#[from] io::Error),
}

impl AttemptError {
    /// Short class name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Unreachable(_) => "unreachable",
            AttemptError::Rejected(_) => "rejected",
            AttemptError::TimedOut => "timeout",
            AttemptError::Transfer(_) => "transfer",
            AttemptError::Write(_) => "write",
        }
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AttemptError::TimedOut
        } else if let Some(status) = e.status() {
            AttemptError::Rejected(status)
        } else {
            AttemptError::Unreachable(reason(&e))
        }
    }
}

impl AttemptError {
    /// Classifies an error raised while reading a body the server already accepted.
    fn body(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AttemptError::TimedOut
        } else {
            AttemptError::Transfer(reason(&e))
        }
    }
}

// reqwest's own message only names the url, the cause is further down the chain
fn reason(e: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![e.to_string()];
    let mut source = e.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }

    parts.join(": ")
}

/// Something that can retrieve a url into a file.
pub trait Fetch {
    /// Fetches `url` into `dest`, returning the number of bytes written. `dest` is only
    /// created once the whole body has arrived.
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = Result<u64, AttemptError>>;
}

/// Fetches over HTTP with a shared client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Without a timeout the client waits as long as the transport does.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(HttpFetcher { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, AttemptError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Rejected(status));
        }

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::Builder::new()
            .prefix(".hycom-")
            .suffix(".part")
            .tempfile_in(dir)?;

        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(AttemptError::body)?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
        }

        file.flush()?;
        file.persist(dest).map_err(|e| AttemptError::Write(e.error))?;

        Ok(downloaded)
    }
}

// -- Tests -------------------------------------------------------------------
