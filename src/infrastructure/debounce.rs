// Debounce gate between rapid UI parameter changes and aggregation
use futures::stream::Stream;
use std::time::Duration;
use tokio::sync::mpsc;

/// Coalesce bursts of values from `rx` into the last value of each burst.
///
/// A value is yielded once `quiet` has passed without a newer one arriving.
/// When the sender side closes, the pending value (if any) is flushed and
/// the stream ends.
pub fn debounced<T>(mut rx: mpsc::UnboundedReceiver<T>, quiet: Duration) -> impl Stream<Item = T>
where
    T: Send + 'static,
{
    async_stream::stream! {
        let mut closed = false;
        while !closed {
            let Some(mut latest) = rx.recv().await else {
                break;
            };

            let mut superseded = 0usize;
            loop {
                match tokio::time::timeout(quiet, rx.recv()).await {
                    Ok(Some(next)) => {
                        latest = next;
                        superseded += 1;
                    }
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            if superseded > 0 {
                tracing::trace!("Debounce coalesced {} superseded requests", superseded);
            }
            yield latest;
        }
    }
}
