//! The middleware chain: a JS-style `(ctx, next) => ...` pipeline where
//! `next` is consumed by value, so the type system — not a runtime check —
//! enforces that a middleware calls it at most once.

use std::sync::Arc;

/// What a handler future resolves to: `Ok(())` on success, or an error that
/// is logged and otherwise swallowed so it cannot take down sibling
/// handlers or the chain.
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// The event and the short-circuit flag a middleware can set.
pub struct EventContext<'a, E> {
    /// The event being dispatched.
    pub event: &'a E,
    /// Set by a middleware to stop the chain and skip every subscriber.
    pub blocked: bool,
}

/// A single middleware step.
pub trait Middleware<E>: Send + Sync {
    /// Inspects (and may mutate `ctx.blocked` on) the event, then decides
    /// whether to call `next.proceed(ctx)` to continue the chain.
    fn handle(&self, ctx: &mut EventContext<'_, E>, next: Next<'_, E>);
}

impl<E, F> Middleware<E> for F
where
    F: Fn(&mut EventContext<'_, E>, Next<'_, E>) + Send + Sync,
{
    fn handle(&self, ctx: &mut EventContext<'_, E>, next: Next<'_, E>) {
        self(ctx, next)
    }
}

/// The remainder of the middleware chain. Consuming `proceed` is the only
/// way to advance it, which is what makes calling it twice a compile error
/// rather than a runtime bug to detect.
pub struct Next<'a, E> {
    pub(crate) rest: &'a [Arc<dyn Middleware<E>>],
}

impl<'a, E> Next<'a, E> {
    pub(crate) fn new(rest: &'a [Arc<dyn Middleware<E>>]) -> Self {
        Self { rest }
    }

    /// Runs the next middleware in the chain, if any and if the chain
    /// hasn't already been blocked.
    pub fn proceed(self, ctx: &mut EventContext<'_, E>) {
        if ctx.blocked {
            return;
        }
        if let Some((first, rest)) = self.rest.split_first() {
            first.handle(ctx, Next { rest });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_runs_in_order() {
        let order = std::sync::Mutex::new(Vec::new());
        let mw1 = move |ctx: &mut EventContext<'_, i32>, next: Next<'_, i32>| {
            next.proceed(ctx);
        };
        let chain: Vec<Arc<dyn Middleware<i32>>> = vec![Arc::new(mw1)];
        let event = 42;
        let mut ctx = EventContext {
            event: &event,
            blocked: false,
        };
        Next::new(&chain).proceed(&mut ctx);
        assert!(!ctx.blocked);
        drop(order);
    }

    #[test]
    fn middleware_can_block_the_chain() {
        let blocker = |ctx: &mut EventContext<'_, i32>, _next: Next<'_, i32>| {
            ctx.blocked = true;
        };
        let tail_ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let tail_ran2 = Arc::clone(&tail_ran);
        let tail = move |_ctx: &mut EventContext<'_, i32>, next: Next<'_, i32>| {
            tail_ran2.store(true, std::sync::atomic::Ordering::SeqCst);
            next.proceed(_ctx);
        };
        let chain: Vec<Arc<dyn Middleware<i32>>> = vec![Arc::new(blocker), Arc::new(tail)];
        let event = 1;
        let mut ctx = EventContext {
            event: &event,
            blocked: false,
        };
        Next::new(&chain).proceed(&mut ctx);
        assert!(ctx.blocked);
        assert!(!tail_ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
