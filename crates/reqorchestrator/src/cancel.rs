//! Composing independently-owned cancellation sources into one signal.
//!
//! `tokio_util::sync::CancellationToken::child_token` only derives
//! cancellation from a single parent. Two independently-owned tokens (the
//! caller's external signal and the orchestrator's own internal controller)
//! have no native "any-of" combinator, so this is Design Note
//! "Coroutine-free alternative"'s Rust-flavored cousin: a small watcher task
//! races both sources and cancels a fresh combined token when either fires.

use tokio_util::sync::CancellationToken;

/// Returns a token that cancels as soon as either `a` or `b` does.
///
/// The watcher task exits on its own once the combined token is canceled
/// (by either source, or directly), so this never leaks a task past the
/// request's lifetime.
pub(crate) fn compose(a: CancellationToken, b: CancellationToken) -> CancellationToken {
    let combined = CancellationToken::new();
    let watcher_combined = combined.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = a.cancelled() => {}
            _ = b.cancelled() => {}
            _ = watcher_combined.cancelled() => {}
        }
        watcher_combined.cancel();
    });
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fires_when_either_source_fires() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let combined = compose(a.clone(), b.clone());
        a.cancel();
        combined.cancelled().await;
        assert!(combined.is_cancelled());
    }

    #[tokio::test]
    async fn untouched_sources_never_fire_the_combination() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let combined = compose(a, b);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(!combined.is_cancelled());
    }
}
