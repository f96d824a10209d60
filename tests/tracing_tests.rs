//! The router's structured events, captured through a JSON fmt subscriber.

use http::Method;
use routeweave::{route_values, Endpoint, LinkRequest, Router, RouterOptions};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::Level;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn events(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn with_captured_logs(f: impl FnOnce()) -> Vec<serde_json::Value> {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    logs.events()
}

fn messages(events: &[serde_json::Value]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| e["fields"]["message"].as_str())
        .collect()
}

#[test]
fn test_table_build_and_match_events() {
    let events = with_captured_logs(|| {
        let router = Router::build(
            vec![Endpoint::builder("show_user", "users/{id:int}").build().unwrap()],
            RouterOptions::default(),
        )
        .unwrap();
        assert!(router.route(Method::GET, "/users/7").is_some());
        assert!(router.route(Method::GET, "/users/x").is_none());
    });

    let messages = messages(&events);
    assert!(messages.contains(&"Routing table loaded"));
    assert!(messages.contains(&"Route match attempt"));
    assert!(messages.contains(&"Route matched"));
    assert!(messages.contains(&"No route matched"));

    let loaded = events
        .iter()
        .find(|e| e["fields"]["message"] == "Routing table loaded")
        .unwrap();
    assert_eq!(loaded["level"], "INFO");
    assert_eq!(loaded["fields"]["endpoints_count"], 1);

    let matched = events
        .iter()
        .find(|e| e["fields"]["message"] == "Route matched")
        .unwrap();
    assert_eq!(matched["fields"]["handler_name"], "show_user");
    assert_eq!(matched["fields"]["route_pattern"], "users/{id:int}");
}

#[test]
fn test_slow_match_warning() {
    let events = with_captured_logs(|| {
        let router = Router::build(
            vec![Endpoint::builder("h", "a/{b}").build().unwrap()],
            RouterOptions {
                slow_match_threshold_us: 0,
                ..RouterOptions::default()
            },
        )
        .unwrap();
        // zero threshold: any measurable match time is slow
        for _ in 0..100 {
            assert!(router.route(Method::GET, "/a/1").is_some());
        }
    });
    assert!(events
        .iter()
        .any(|e| e["level"] == "WARN" && e["fields"]["message"] == "Slow route matching detected"));
}

#[test]
fn test_link_generation_events() {
    let events = with_captured_logs(|| {
        let router = Router::build(
            vec![Endpoint::builder("show_user", "users/{id:int}").build().unwrap()],
            RouterOptions::default(),
        )
        .unwrap();
        assert!(router
            .generate(&LinkRequest::new(route_values! { "id" => 1 }))
            .is_some());
        assert!(router
            .generate(&LinkRequest::new(route_values! { "id" => "x" }))
            .is_none());
    });
    let messages = messages(&events);
    assert!(messages.contains(&"Link generated"));
    assert!(messages.contains(&"No link generated"));
}
