//! Middleware chain integration tests.

use std::sync::{Arc, Mutex};

use caravel_core::{Request, Response};
use caravel_middleware::{
    FnMiddleware, Middleware, MiddlewareChain, MiddlewareRegistry, Phase, RequestIdMiddleware,
    TimingMiddleware,
};
use http::Method;

type Log = Arc<Mutex<Vec<String>>>;

struct Recording {
    name: &'static str,
    log: Log,
    fail_before: bool,
    fail_after: bool,
}

impl Middleware for Recording {
    fn on_before(&mut self, _request: &Request, _response: &mut Response) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("before:{}", self.name));
        if self.fail_before {
            anyhow::bail!("{} refused", self.name);
        }
        Ok(())
    }

    fn on_after(&mut self, _request: &Request, _response: &mut Response) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("after:{}", self.name));
        if self.fail_after {
            anyhow::bail!("{} broke", self.name);
        }
        Ok(())
    }
}

fn registry(log: &Log, failing_before: &'static str, failing_after: &'static str) -> MiddlewareRegistry {
    let mut registry = MiddlewareRegistry::new();
    for name in ["first", "second", "third"] {
        let log = Arc::clone(log);
        registry.register(name, move || Recording {
            name,
            log: Arc::clone(&log),
            fail_before: name == failing_before,
            fail_after: name == failing_after,
        });
    }
    registry
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn after_hooks_run_in_registration_order() {
    let log = Log::default();
    let registry = registry(&log, "", "");
    let request = Request::new(Method::GET, "/");
    let mut response = Response::new();

    let mut chain = MiddlewareChain::new();
    chain
        .run_before(&registry, ["first", "second", "third"], &request, &mut response)
        .unwrap();
    chain.run_after(&request, &mut response).unwrap();

    assert_eq!(
        entries(&log),
        vec![
            "before:first",
            "before:second",
            "before:third",
            "after:first",
            "after:second",
            "after:third",
        ]
    );
    assert!(chain.is_empty());
}

#[test]
fn unknown_names_are_skipped() {
    let log = Log::default();
    let registry = registry(&log, "", "");
    let request = Request::new(Method::GET, "/");
    let mut response = Response::new();

    let mut chain = MiddlewareChain::new();
    chain
        .run_before(&registry, ["ghost", "second"], &request, &mut response)
        .unwrap();
    assert_eq!(chain.started(), vec!["second"]);
}

#[test]
fn failing_before_hook_stops_the_chain() {
    let log = Log::default();
    let registry = registry(&log, "second", "");
    let request = Request::new(Method::GET, "/");
    let mut response = Response::new();

    let mut chain = MiddlewareChain::new();
    let err = chain
        .run_before(&registry, ["first", "second", "third"], &request, &mut response)
        .unwrap_err();
    assert_eq!(err.name, "second");
    assert_eq!(err.phase, Phase::Before);
    assert_eq!(chain.started(), vec!["first"]);

    chain.run_after(&request, &mut response).unwrap();
    assert_eq!(
        entries(&log),
        vec!["before:first", "before:second", "after:first"]
    );
}

#[test]
fn failing_after_hook_does_not_stop_others() {
    let log = Log::default();
    let registry = registry(&log, "", "first");
    let request = Request::new(Method::GET, "/");
    let mut response = Response::new();

    let mut chain = MiddlewareChain::new();
    chain
        .run_before(&registry, ["first", "second"], &request, &mut response)
        .unwrap();
    let err = chain.run_after(&request, &mut response).unwrap_err();
    assert_eq!(err.phase, Phase::After);
    assert!(err.to_string().contains("first broke"));
    assert!(entries(&log).contains(&"after:second".to_string()));
}

#[test]
fn hooks_share_the_response() {
    let mut registry = MiddlewareRegistry::new();
    registry
        .register("teapot", || {
            FnMiddleware::before(|_, res| {
                res.set_status(418);
                Ok(())
            })
        })
        .register("check", || {
            FnMiddleware::after(|_, res| {
                let status = res.status();
                res.set_header("X-Seen-Status", status.to_string(), true);
                Ok(())
            })
        })
        .register_default::<RequestIdMiddleware>("request_id")
        .register_default::<TimingMiddleware>("timing");

    let request = Request::new(Method::GET, "/");
    let mut response = Response::new();
    let mut chain = MiddlewareChain::new();
    chain
        .run_before(
            &registry,
            ["request_id", "timing", "teapot", "check"],
            &request,
            &mut response,
        )
        .unwrap();
    chain.run_after(&request, &mut response).unwrap();

    assert_eq!(response.status(), 418);
    assert_eq!(response.header("x-seen-status"), Some("418"));
    assert!(response.header("x-request-id").is_some());
    assert!(response.header("server-timing").is_some());
}
