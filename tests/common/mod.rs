#![allow(dead_code)]

use http::Method;
use routeweave::{Endpoint, Router, RouterOptions};

/// A small zoo API: one endpoint per (method, template).
pub fn zoo_endpoints() -> Vec<Endpoint> {
    let routes: &[(Method, &str, &str)] = &[
        (Method::GET, "", "root_handler"),
        (Method::GET, "zoo/animals", "get_animals"),
        (Method::POST, "zoo/animals", "create_animal"),
        (Method::GET, "zoo/animals/{id:int}", "get_animal"),
        (Method::PUT, "zoo/animals/{id:int}", "update_animal"),
        (Method::PATCH, "zoo/animals/{id:int}", "patch_animal"),
        (Method::DELETE, "zoo/animals/{id:int}", "delete_animal"),
        (Method::GET, "zoo/animals/{name}", "get_animal_by_name"),
        (Method::GET, "zoo/animals/{id:int}/toys/{toy_id}", "animal_toy"),
        (Method::GET, "zoo/health", "health_check"),
        (Method::OPTIONS, "zoo/health", "supported_ops"),
        (Method::TRACE, "zoo/health", "trace_route"),
        (Method::GET, "static/{**path}", "static_files"),
    ];
    routes
        .iter()
        .map(|(method, template, handler)| {
            Endpoint::builder(*handler, template)
                .method(method.clone())
                .build()
                .expect("zoo route must parse")
        })
        .collect()
}

pub fn zoo_router() -> Router {
    Router::build(zoo_endpoints(), RouterOptions::default()).expect("zoo table must build")
}

/// The two catalogue routes plus a conventional fallback.
pub fn catalogue_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::builder("products_details", "Products/Details")
            .required_value("controller", "Products")
            .required_value("action", "Details")
            .build()
            .expect("route must parse"),
        Endpoint::builder(
            "customers_details",
            "Customers/Details/{category}/{region}/{id:int}",
        )
        .required_value("controller", "Customers")
        .required_value("action", "Details")
        .build()
        .expect("route must parse"),
        Endpoint::builder("default", "{controller=Home}/{action=Index}/{id?}")
            .route_name("default")
            .build()
            .expect("route must parse"),
    ]
}

pub fn catalogue_router() -> Router {
    Router::build(catalogue_endpoints(), RouterOptions::default())
        .expect("catalogue table must build")
}
