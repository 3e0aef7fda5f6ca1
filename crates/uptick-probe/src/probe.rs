//! Single-attempt HTTP probe.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use http_body_util::Empty;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tokio::time::Instant;
use tracing::debug;

use uptick_core::ProbeOutcome;

use crate::error::ProbeInitResult;

const ACCEPT_VALUE: &str = "text/html,application/json";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// One GET attempt against one URL.
///
/// Implementations must capture every failure in the returned outcome.
pub trait Probe: Send + Sync {
    fn probe(
        &self,
        url: &str,
        timeout: Duration,
        identity: &str,
    ) -> impl Future<Output = ProbeOutcome> + Send;
}

impl<P: Probe> Probe for Arc<P> {
    fn probe(
        &self,
        url: &str,
        timeout: Duration,
        identity: &str,
    ) -> impl Future<Output = ProbeOutcome> + Send {
        (**self).probe(url, timeout, identity)
    }
}

/// HTTP/HTTPS probe backed by a pooled hyper client.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
}

impl HttpProbe {
    /// Build a client that speaks plain HTTP and HTTPS (webpki roots).
    pub fn new() -> ProbeInitResult<Self> {
        let connector = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_secs(30))
            .build(connector);

        Ok(Self { client })
    }
}

impl Probe for HttpProbe {
    async fn probe(&self, url: &str, timeout: Duration, identity: &str) -> ProbeOutcome {
        let started = Instant::now();

        let request = http::Request::get(url)
            .header(USER_AGENT, identity)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .body(Empty::<Bytes>::new());
        let request = match request {
            Ok(req) => req,
            Err(e) => {
                debug!(error = %e, %url, "probe request could not be built");
                return ProbeOutcome::connection_error(url, started.elapsed(), e.to_string());
            }
        };

        // Dropping the pending request on timeout closes its connection.
        match tokio::time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(resp)) => {
                let code = resp.status().as_u16();
                debug!(status = code, %url, "probe got response");
                ProbeOutcome::response(url, code, started.elapsed())
            }
            Ok(Err(e)) => {
                debug!(error = %e, connect = e.is_connect(), %url, "probe request failed");
                ProbeOutcome::connection_error(url, started.elapsed(), error_chain(&e))
            }
            Err(_) => {
                debug!(%url, "probe timed out");
                ProbeOutcome::timeout(url, started.elapsed())
            }
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    msg
}
