//! Exponential backoff for re-establishing the live feed.
//!
//! When the feed connection drops, [`reconnect_loop`] keeps retrying with
//! increasing delays until a connection succeeds or the subscription is
//! cancelled.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

/// An open connection to the server's spot feed.
pub type FeedStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Tunable parameters for the backoff strategy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Next backoff delay, clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Open one feed connection, mapping the failure to a display string.
pub async fn connect(ws_url: &str) -> Result<FeedStream, String> {
    connect_async(ws_url)
        .await
        .map(|(ws_stream, _response)| ws_stream)
        .map_err(|e| format!("Failed to connect to spot feed at {ws_url}: {e}"))
}

/// Retry [`connect`] with exponential backoff.
///
/// Returns `Some(stream)` once a connection succeeds, or `None` if `cancel`
/// fires first.
pub async fn reconnect_loop(
    ws_url: &str,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<FeedStream> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
        tracing::info!(
            url = %ws_url,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting to spot feed",
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Reconnect cancelled");
                return None;
            }
            result = connect(ws_url) => match result {
                Ok(ws_stream) => {
                    tracing::info!(attempt, "Reconnected to spot feed");
                    return Some(ws_stream);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Reconnect attempt {attempt} failed");
                }
            }
        }

        delay = next_delay(delay, config);
    }
}
