mod common;

use common::{catalogue_endpoints, catalogue_router, zoo_router};
use http::Method;
use routeweave::{route_values, Endpoint, LinkRequest, RouteValues, Router, RouterOptions};

fn path(router: &Router, request: &LinkRequest) -> Option<String> {
    router.generate(request).map(|link| link.path)
}

#[test]
fn test_customers_and_products_scenario() {
    let router = catalogue_router();

    let link = router
        .generate(&LinkRequest::new(route_values! {
            "controller" => "Customers",
            "action" => "Details",
            "category" => "Administration",
            "region" => "US",
            "id" => 10,
        }))
        .unwrap();
    assert_eq!(link.path, "/Customers/Details/Administration/US/10");
    assert_eq!(link.endpoint.handler_name(), "customers_details");

    let link = router
        .generate(&LinkRequest::new(route_values! {
            "controller" => "Products",
            "action" => "Details",
        }))
        .unwrap();
    assert_eq!(link.path, "/Products/Details");
    assert_eq!(link.endpoint.handler_name(), "products_details");
}

#[test]
fn test_conventional_route_elides_trailing_defaults() {
    let router = catalogue_router();
    let request = |values: RouteValues| LinkRequest::new(values).with_route_name("default");

    assert_eq!(
        path(&router, &request(route_values! { "controller" => "Home", "action" => "Index" })),
        Some("/".to_string())
    );
    assert_eq!(
        path(&router, &request(route_values! { "controller" => "Blog", "action" => "Index" })),
        Some("/Blog".to_string())
    );
    // a default that is followed by a rendered segment stays
    assert_eq!(
        path(
            &router,
            &request(route_values! { "controller" => "Home", "action" => "Index", "id" => 3 })
        ),
        Some("/Home/Index/3".to_string())
    );
}

#[test]
fn test_elision_disabled_by_options() {
    let router = Router::build(
        catalogue_endpoints(),
        RouterOptions {
            elide_trailing_defaults: false,
            ..RouterOptions::default()
        },
    )
    .unwrap();
    let request = LinkRequest::new(route_values! { "controller" => "Home", "action" => "Index" })
        .with_route_name("default");
    assert_eq!(path(&router, &request), Some("/Home/Index".to_string()));
}

#[test]
fn test_ambient_values_fill_missing_parameters() {
    let router = catalogue_router();
    let ambient = route_values! {
        "controller" => "Customers",
        "action" => "Details",
        "category" => "Administration",
        "region" => "US",
        "id" => 10,
    };
    let link = router
        .generate(&LinkRequest::new(route_values! { "id" => 11 }).with_ambient(ambient))
        .unwrap();
    assert_eq!(link.path, "/Customers/Details/Administration/US/11");
}

#[test]
fn test_explicit_value_without_ambient_keeps_later_ambient() {
    let router = Router::build(
        vec![Endpoint::builder("pair", "{a}/{b}").build().unwrap()],
        RouterOptions::default(),
    )
    .unwrap();
    let request =
        LinkRequest::new(route_values! { "a" => 1 }).with_ambient(route_values! { "b" => 2 });
    assert_eq!(path(&router, &request), Some("/1/2".to_string()));

    // a differing ambient value for `a` still stops ambient use for `b`
    let request = LinkRequest::new(route_values! { "a" => 1 })
        .with_ambient(route_values! { "a" => 5, "b" => 2 });
    assert_eq!(path(&router, &request), None);
}

#[test]
fn test_ambient_values_do_not_leak() {
    let router = Router::build(
        vec![Endpoint::builder("search", "search/{term}").build().unwrap()],
        RouterOptions::default(),
    )
    .unwrap();
    let ambient = route_values! { "term" => "rust", "page" => 4, "sort" => "stars" };

    // page and sort appear in no template or default: not in the link
    let link = router
        .generate(&LinkRequest::new(RouteValues::new()).with_ambient(ambient.clone()))
        .unwrap();
    assert_eq!(link.path, "/search/rust");

    // explicit extras are kept
    let link = router
        .generate(&LinkRequest::new(route_values! { "page" => 2 }).with_ambient(ambient))
        .unwrap();
    assert_eq!(link.path, "/search/rust?page=2");
}

#[test]
fn test_ambient_dropped_when_required_value_changes() {
    let router = catalogue_router();
    let ambient = route_values! {
        "controller" => "Customers",
        "action" => "Details",
        "category" => "Administration",
        "region" => "US",
        "id" => 10,
    };
    // switching controller invalidates the customer values
    let link = router
        .generate(
            &LinkRequest::new(route_values! { "controller" => "Products" }).with_ambient(ambient),
        )
        .unwrap();
    assert_eq!(link.path, "/Products/Details");
}

#[test]
fn test_constraint_violations_never_generate() {
    let router = catalogue_router();
    let request = LinkRequest::new(route_values! {
        "controller" => "Customers",
        "action" => "Details",
        "category" => "Administration",
        "region" => "US",
        "id" => "ten",
    });
    // falls through to the conventional route, which has no category slot
    let link = router.generate(&request).unwrap();
    assert_eq!(link.endpoint.handler_name(), "default");
    assert_eq!(
        link.path,
        "/Customers/Details/ten?category=Administration&region=US"
    );
}

#[test]
fn test_round_trip_reproduces_endpoint() {
    let router = zoo_router();
    let paths = [
        "/zoo/animals",
        "/zoo/animals/123",
        "/zoo/animals/leo",
        "/zoo/animals/4/toys/ball",
        "/static/css/site.css",
    ];
    for original in paths {
        let m = router.route(Method::GET, original).unwrap();
        let link = router
            .generate_for_handler(m.handler_name(), &LinkRequest::new(m.values.clone()))
            .unwrap();
        assert_eq!(link.path, original);
        let again = router.route(Method::GET, &link.path).unwrap();
        assert_eq!(again.handler_name(), m.handler_name());
        assert_eq!(again.values, m.values);
    }
}

#[test]
fn test_round_trip_through_any_endpoint() {
    let router = catalogue_router();
    for original in ["/Products/Details", "/Customers/Details/Retail/EU/5", "/Blog/Post/7"] {
        let m = router.route(Method::GET, original).unwrap();
        let link = router.generate(&LinkRequest::new(m.values.clone())).unwrap();
        assert_eq!(link.path, original);
        assert_eq!(link.endpoint.handler_name(), m.handler_name());
    }
}

#[test]
fn test_tie_break_determinism() {
    for _ in 0..20 {
        let router = Router::build(
            vec![
                Endpoint::builder("first", "a/{id}").build().unwrap(),
                Endpoint::builder("second", "b/{id}").build().unwrap(),
            ],
            RouterOptions::default(),
        )
        .unwrap();
        let link = router
            .generate(&LinkRequest::new(route_values! { "id" => 1 }))
            .unwrap();
        assert_eq!(link.path, "/a/1");
    }
}

#[test]
fn test_named_routes_with_required_values() {
    let router = Router::build(
        vec![
            Endpoint::builder("admin_home", "admin")
                .route_name("home")
                .required_value("area", "admin")
                .build()
                .unwrap(),
            Endpoint::builder("site_home", "")
                .route_name("home")
                .required_value("area", "")
                .build()
                .unwrap(),
        ],
        RouterOptions::default(),
    )
    .unwrap();
    let home = |values: RouteValues| LinkRequest::new(values).with_route_name("Home");

    assert_eq!(path(&router, &home(RouteValues::new())), Some("/".to_string()));
    assert_eq!(
        path(&router, &home(route_values! { "area" => "Admin" })),
        Some("/admin".to_string())
    );
    assert_eq!(path(&router, &home(route_values! { "area" => "shop" })), None);
}

#[test]
fn test_catch_all_encoding() {
    let router = zoo_router();
    let link = router
        .generate_for_handler(
            "static_files",
            &LinkRequest::new(route_values! { "path" => "docs/read me.txt" }),
        )
        .unwrap();
    assert_eq!(link.path, "/static/docs/read%20me.txt");
}

#[test]
fn test_path_base_and_fragment() {
    let router = zoo_router();
    let link = router
        .generate_for_handler(
            "get_animal",
            &LinkRequest::new(route_values! { "id" => 9 })
                .with_path_base("/zoo-app")
                .with_fragment("feeding times"),
        )
        .unwrap();
    assert_eq!(link.path, "/zoo-app/zoo/animals/9#feeding%20times");
}

#[test]
fn test_lowercase_urls_keep_path_base_case() {
    let router = Router::build(
        vec![Endpoint::builder("show", "Users/{Id}").build().unwrap()],
        RouterOptions {
            lowercase_urls: true,
            ..RouterOptions::default()
        },
    )
    .unwrap();
    let request = LinkRequest::new(route_values! { "Id" => "ABC" }).with_path_base("/MyApp");
    assert_eq!(path(&router, &request), Some("/MyApp/users/abc".to_string()));
}
