//! An ordered pipeline of request/response/error transformers.
//!
//! Interceptors carry a numeric `weight` and up to three optional async
//! hooks. Requests run through hooks weight-descending; responses run
//! weight-ascending, so a high-weight interceptor that wraps the request on
//! the way out unwinds last on the way back, LIFO-style. Error hooks run in
//! reverse registration order and are best-effort: a hook that itself fails
//! is logged and skipped rather than aborting the chain.
//!
//! Grounded in the same "ordered, composable wrapping" idea as
//! `tower::ServiceBuilder` layering, but expressed directly as a sorted
//! `Vec` rather than `tower::Layer`, since interceptors transform a value in
//! place instead of wrapping a `Service`.

use std::sync::Arc;

use async_trait::async_trait;

/// One stage of the pipeline. `Req`, `Res`, and `Err` are the orchestrator's
/// request, response, and error types; all three default hook
/// implementations are no-ops, so an interceptor only needs to implement
/// the hooks it cares about.
#[async_trait]
pub trait Interceptor<Req, Res, Err>: Send + Sync
where
    Req: Send + 'static,
    Res: Send + 'static,
    Err: Send + 'static,
{
    /// A short name used in tracing/logging.
    fn name(&self) -> &str {
        "interceptor"
    }

    /// Transforms an outgoing request. Returning `Err` short-circuits the
    /// request before it reaches the adapter.
    async fn on_request(&self, req: Req) -> Result<Req, Err> {
        Ok(req)
    }

    /// Transforms an incoming response.
    async fn on_response(&self, res: Res) -> Result<Res, Err> {
        Ok(res)
    }

    /// Transforms a terminal error. Best-effort: if this hook itself fails,
    /// the original error is kept and the failure is logged.
    async fn on_error(&self, err: Err) -> Result<Err, Box<dyn std::error::Error + Send + Sync>> {
        Ok(err)
    }
}

struct Entry<Req, Res, Err> {
    weight: i32,
    registration_order: usize,
    interceptor: Arc<dyn Interceptor<Req, Res, Err>>,
}

/// A handle returned by [`Pipeline::register`] that removes the
/// interceptor when dropped is *not* automatic — call [`Pipeline::remove`]
/// explicitly with it, mirroring `useInterceptor`'s returned `dispose`
/// callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterceptorId(usize);

/// The ordered interceptor pipeline.
pub struct Pipeline<Req, Res, Err> {
    entries: std::sync::Mutex<Vec<Entry<Req, Res, Err>>>,
    next_order: std::sync::atomic::AtomicUsize,
}

impl<Req, Res, Err> Default for Pipeline<Req, Res, Err> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res, Err> Pipeline<Req, Res, Err>
where
    Req: Send + 'static,
    Res: Send + 'static,
    Err: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(Vec::new()),
            next_order: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Adds an interceptor at the given weight. Higher weights run first
    /// on the request path and last on the response path.
    pub fn register(
        &self,
        weight: i32,
        interceptor: Arc<dyn Interceptor<Req, Res, Err>>,
    ) -> InterceptorId {
        let order = self
            .next_order
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut entries = self.entries.lock().expect("interceptor pipeline poisoned");
        entries.push(Entry {
            weight,
            registration_order: order,
            interceptor,
        });
        InterceptorId(order)
    }

    /// Removes a previously registered interceptor. A no-op if it was
    /// already removed.
    pub fn remove(&self, id: InterceptorId) {
        let mut entries = self.entries.lock().expect("interceptor pipeline poisoned");
        entries.retain(|e| e.registration_order != id.0);
    }

    /// Runs every interceptor's `on_request` hook, weight-descending (ties
    /// broken by earlier registration first), short-circuiting on the
    /// first error.
    pub async fn run_request(&self, mut req: Req) -> Result<Req, Err> {
        for interceptor in self.ordered_for_request() {
            req = interceptor.on_request(req).await?;
        }
        Ok(req)
    }

    /// Runs every interceptor's `on_response` hook, weight-ascending (the
    /// mirror image of request order, so the pipeline unwinds LIFO).
    pub async fn run_response(&self, mut res: Res) -> Result<Res, Err> {
        for interceptor in self.ordered_for_response() {
            res = interceptor.on_response(res).await?;
        }
        Ok(res)
    }

    /// Runs every interceptor's `on_error` hook in reverse registration
    /// order. Each hook is best-effort: a hook that fails is logged and
    /// skipped, leaving the error as it was before that hook ran.
    pub async fn run_error(&self, original: Err) -> Err
    where
        Err: Clone,
    {
        let mut err = original;
        for interceptor in self.reverse_registration_order() {
            let before = err.clone();
            match interceptor.on_error(err).await {
                Ok(next) => err = next,
                Err(hook_error) => {
                    log_hook_error(interceptor.name(), hook_error.as_ref());
                    err = before;
                }
            }
        }
        err
    }

    fn ordered_for_request(&self) -> Vec<Arc<dyn Interceptor<Req, Res, Err>>> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .expect("interceptor pipeline poisoned")
            .iter()
            .map(|e| (e.weight, e.registration_order, Arc::clone(&e.interceptor)))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        entries.into_iter().map(|(_, _, i)| i).collect()
    }

    fn ordered_for_response(&self) -> Vec<Arc<dyn Interceptor<Req, Res, Err>>> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .expect("interceptor pipeline poisoned")
            .iter()
            .map(|e| (e.weight, e.registration_order, Arc::clone(&e.interceptor)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        entries.into_iter().map(|(_, _, i)| i).collect()
    }

    fn reverse_registration_order(&self) -> Vec<Arc<dyn Interceptor<Req, Res, Err>>> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .expect("interceptor pipeline poisoned")
            .iter()
            .map(|e| (e.registration_order, Arc::clone(&e.interceptor)))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.into_iter().map(|(_, i)| i).collect()
    }
}

fn log_hook_error(name: &str, error: &(dyn std::error::Error + Send + Sync)) {
    #[cfg(feature = "tracing")]
    tracing::warn!(interceptor = name, %error, "onError hook failed, ignoring");
    #[cfg(not(feature = "tracing"))]
    {
        let _ = name;
        let _ = error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tag(&'static str, Arc<std::sync::Mutex<Vec<&'static str>>>);

    #[async_trait]
    impl Interceptor<Vec<&'static str>, Vec<&'static str>, String> for Tag {
        fn name(&self) -> &str {
            self.0
        }

        async fn on_request(
            &self,
            mut req: Vec<&'static str>,
        ) -> Result<Vec<&'static str>, String> {
            req.push(self.0);
            self.1.lock().unwrap().push(self.0);
            Ok(req)
        }

        async fn on_response(
            &self,
            mut res: Vec<&'static str>,
        ) -> Result<Vec<&'static str>, String> {
            res.push(self.0);
            Ok(res)
        }
    }

    #[tokio::test]
    async fn request_hooks_run_weight_descending() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let pipeline: Pipeline<Vec<&'static str>, Vec<&'static str>, String> = Pipeline::new();
        pipeline.register(1, Arc::new(Tag("low", Arc::clone(&log))));
        pipeline.register(10, Arc::new(Tag("high", Arc::clone(&log))));
        let result = pipeline.run_request(Vec::new()).await.unwrap();
        assert_eq!(result, vec!["high", "low"]);
    }

    #[tokio::test]
    async fn response_hooks_run_weight_ascending() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let pipeline: Pipeline<Vec<&'static str>, Vec<&'static str>, String> = Pipeline::new();
        pipeline.register(1, Arc::new(Tag("low", Arc::clone(&log))));
        pipeline.register(10, Arc::new(Tag("high", Arc::clone(&log))));
        let result = pipeline.run_response(Vec::new()).await.unwrap();
        assert_eq!(result, vec!["low", "high"]);
    }

    #[tokio::test]
    async fn equal_weight_preserves_registration_order_on_request() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let pipeline: Pipeline<Vec<&'static str>, Vec<&'static str>, String> = Pipeline::new();
        pipeline.register(5, Arc::new(Tag("first", Arc::clone(&log))));
        pipeline.register(5, Arc::new(Tag("second", Arc::clone(&log))));
        let result = pipeline.run_request(Vec::new()).await.unwrap();
        assert_eq!(result, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn removed_interceptor_no_longer_runs() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let pipeline: Pipeline<Vec<&'static str>, Vec<&'static str>, String> = Pipeline::new();
        let id = pipeline.register(0, Arc::new(Tag("only", Arc::clone(&log))));
        pipeline.remove(id);
        let result = pipeline.run_request(Vec::new()).await.unwrap();
        assert!(result.is_empty());
    }

    struct FailingErrorHook(AtomicUsize);

    #[async_trait]
    impl Interceptor<(), (), String> for FailingErrorHook {
        async fn on_error(
            &self,
            _err: String,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err("hook exploded".into())
        }
    }

    #[tokio::test]
    async fn failing_error_hook_is_swallowed_and_keeps_original_error() {
        let pipeline: Pipeline<(), (), String> = Pipeline::new();
        pipeline.register(0, Arc::new(FailingErrorHook(AtomicUsize::new(0))));
        let result = pipeline.run_error("boom".to_string()).await;
        assert_eq!(result, "boom");
    }

    #[tokio::test]
    async fn error_hooks_run_in_reverse_registration_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        struct Recorder(&'static str, Arc<std::sync::Mutex<Vec<&'static str>>>);

        #[async_trait]
        impl Interceptor<(), (), String> for Recorder {
            async fn on_error(
                &self,
                err: String,
            ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
                self.1.lock().unwrap().push(self.0);
                Ok(err)
            }
        }

        let pipeline: Pipeline<(), (), String> = Pipeline::new();
        pipeline.register(0, Arc::new(Recorder("a", Arc::clone(&log))));
        pipeline.register(0, Arc::new(Recorder("b", Arc::clone(&log))));
        let _ = pipeline.run_error("err".to_string()).await;
        assert_eq!(*log.lock().unwrap(), vec!["b", "a"]);
    }
}
