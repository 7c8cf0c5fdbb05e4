//! End-to-end event bus ordering scenarios, independent of the orchestrator.

use std::sync::{Arc, Mutex};

use reqevents::{EventBus, EventContext, Next, NamedEvent};

#[derive(Clone)]
struct Topic(&'static str);

impl NamedEvent for Topic {
    fn event_name(&self) -> &str {
        self.0
    }
}

#[tokio::test]
async fn exact_handler_and_middleware_ordering() {
    let bus: EventBus<Topic> = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let m1_log = Arc::clone(&log);
    bus.use_middleware(move |_ctx: &mut EventContext<'_, Topic>, next: Next<'_, Topic>| {
        m1_log.lock().unwrap().push("m1:before");
        next.proceed(_ctx);
        m1_log.lock().unwrap().push("m1:after");
    });
    let m2_log = Arc::clone(&log);
    bus.use_middleware(move |_ctx: &mut EventContext<'_, Topic>, next: Next<'_, Topic>| {
        m2_log.lock().unwrap().push("m2:before");
        next.proceed(_ctx);
        m2_log.lock().unwrap().push("m2:after");
    });
    let h_log = Arc::clone(&log);
    bus.on("x", move |_event| {
        let log = Arc::clone(&h_log);
        async move {
            log.lock().unwrap().push("h");
            Ok(())
        }
    });

    bus.emit_async(Topic("x")).await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["m1:before", "m2:before", "h", "m2:after", "m1:after"],
    );
}

#[tokio::test]
async fn pattern_subscription_matches_once_and_carries_the_name() {
    let bus: EventBus<Topic> = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen2 = Arc::clone(&seen);
    bus.on("user:*", move |event| {
        let seen = Arc::clone(&seen2);
        async move {
            seen.lock().unwrap().push(event.event_name().to_string());
            Ok(())
        }
    });

    bus.emit_async(Topic("user:create")).await;
    bus.emit_async(Topic("order:create")).await;

    assert_eq!(*seen.lock().unwrap(), vec!["user:create"]);
}

#[tokio::test]
async fn sibling_handler_runs_despite_an_erroring_handler() {
    let bus: EventBus<Topic> = EventBus::new();
    let ran = Arc::new(Mutex::new(false));

    bus.on("x", |_event| async { Err("boom".into()) });
    let ran2 = Arc::clone(&ran);
    bus.on("x", move |_event| {
        let ran = Arc::clone(&ran2);
        async move {
            *ran.lock().unwrap() = true;
            Ok(())
        }
    });

    bus.emit_async(Topic("x")).await;
    assert!(*ran.lock().unwrap());
}
