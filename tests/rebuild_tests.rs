//! Concurrent reads while the route table is rebuilt.

use http::Method;
use routeweave::{route_values, Endpoint, LinkRequest, Router, RouterOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn generation(version: u32) -> Vec<Endpoint> {
    vec![
        Endpoint::builder("version", format!("v{version}/status").as_str())
            .build()
            .unwrap(),
        Endpoint::builder("item", "items/{id:int}").build().unwrap(),
    ]
}

#[test]
fn test_readers_always_see_a_complete_table() {
    let router = Arc::new(Router::build(generation(0), RouterOptions::default()).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let router = Arc::clone(&router);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut checks = 0u64;
                while !done.load(Ordering::Acquire) {
                    // one snapshot: the version route and its link agree
                    let table = router.snapshot();
                    let m = table.route(Method::GET, "/items/5").unwrap();
                    assert_eq!(m.handler_name(), "item");
                    let link = table
                        .generate_for_handler("version", &LinkRequest::default())
                        .unwrap();
                    assert!(table.route(Method::GET, &link.path).is_some());
                    checks += 1;
                }
                checks
            })
        })
        .collect();

    for version in 1..=50 {
        router.rebuild(generation(version)).unwrap();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert!(router.route(Method::GET, "/v50/status").is_some());
    assert!(router.route(Method::GET, "/v0/status").is_none());
}

#[test]
fn test_router_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Router>();
    assert_send_sync::<routeweave::RouteTable>();
}

#[test]
fn test_snapshot_outlives_rebuild() {
    let router = Router::build(generation(1), RouterOptions::default()).unwrap();
    let old = router.snapshot();
    router.rebuild(generation(2)).unwrap();

    assert!(old.route(Method::GET, "/v1/status").is_some());
    assert!(router.route(Method::GET, "/v1/status").is_none());
    assert_eq!(
        old.generate(&LinkRequest::new(route_values! { "id" => 3 }))
            .unwrap()
            .path,
        "/items/3"
    );
}
