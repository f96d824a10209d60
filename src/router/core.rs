//! Router core: the immutable route table and the atomically swapped router
//! that serves matches and links from it.

use arc_swap::ArcSwap;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::tree::MatchTree;
use crate::endpoint::{Endpoint, EndpointBuilder};
use crate::error::{AmbiguousRouteNameError, RouteTableError};
use crate::link::{GeneratedLink, LinkGenerator, LinkRequest};
use crate::options::RouterOptions;
use crate::values::{values_equal, RouteValues};

/// Result of successfully matching a request path to an endpoint.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub endpoint: Arc<Endpoint>,
    /// Captured parameters, then parameter defaults, then the pattern's
    /// other defaults, then the endpoint's required values.
    pub values: RouteValues,
}

impl RouteMatch {
    #[inline]
    #[must_use]
    pub fn handler_name(&self) -> &str {
        self.endpoint.handler_name()
    }

    /// Get a route value by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name)
    }
}

/// An immutable, fully indexed set of endpoints.
///
/// Endpoints are ranked by `(order, precedence, registration index)`; the
/// match tree and the link generator share that ranking.
#[derive(Debug, Default)]
pub struct RouteTable {
    tree: MatchTree,
    links: LinkGenerator,
    options: RouterOptions,
}

impl RouteTable {
    /// Rank `endpoints`, validate route names and build both indexes.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError::AmbiguousRouteName`] when two endpoints share
    /// a route name and required values but not a template.
    pub fn build(
        endpoints: impl IntoIterator<Item = Endpoint>,
        options: RouterOptions,
    ) -> Result<Self, RouteTableError> {
        let mut ranked: Vec<(usize, Endpoint)> = endpoints.into_iter().enumerate().collect();
        ranked.sort_by(|(ia, a), (ib, b)| {
            a.order()
                .cmp(&b.order())
                .then_with(|| a.pattern().precedence().cmp(b.pattern().precedence()))
                .then_with(|| ia.cmp(ib))
        });
        let endpoints: Vec<Arc<Endpoint>> =
            ranked.into_iter().map(|(_, e)| Arc::new(e)).collect();

        check_route_names(&endpoints)?;

        let tree = MatchTree::build(endpoints.clone());
        let links = LinkGenerator::new(endpoints, options.clone());

        let routes_summary: Vec<String> = tree
            .endpoints()
            .iter()
            .take(10)
            .map(ToString::to_string)
            .collect();
        info!(
            endpoints_count = tree.endpoints().len(),
            tree_nodes = tree.node_count(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Ok(Self {
            tree,
            links,
            options,
        })
    }

    /// Build endpoints from their builders, then the table.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError::Template`] for the first endpoint whose
    /// template does not parse, or any error from [`RouteTable::build`].
    pub fn from_builders<'a>(
        builders: impl IntoIterator<Item = EndpointBuilder<'a>>,
        options: RouterOptions,
    ) -> Result<Self, RouteTableError> {
        let endpoints = builders
            .into_iter()
            .map(EndpointBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(endpoints, options)
    }

    /// Endpoints in rank order.
    #[must_use]
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        self.tree.endpoints()
    }

    #[must_use]
    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    #[must_use]
    pub fn match_tree(&self) -> &MatchTree {
        &self.tree
    }

    #[must_use]
    pub fn link_generator(&self) -> &LinkGenerator {
        &self.links
    }

    /// Route templates in rank order, e.g. for pre-registering metrics labels.
    #[must_use]
    pub fn route_patterns(&self) -> Vec<String> {
        self.endpoints()
            .iter()
            .map(|e| e.pattern().raw_text().to_string())
            .collect()
    }

    /// Match `path` against endpoints accepting `method`.
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");
        self.find(path, &|e: &Endpoint| e.metadata().accepts_method(&method))
    }

    /// Match `path` against endpoints for which `filter` returns true.
    #[must_use]
    pub fn match_path(&self, path: &str, filter: impl Fn(&Endpoint) -> bool) -> Option<RouteMatch> {
        debug!(path = %path, "Route match attempt");
        self.find(path, &filter)
    }

    fn find(&self, path: &str, filter: &dyn Fn(&Endpoint) -> bool) -> Option<RouteMatch> {
        let match_start = Instant::now();
        let result = self.tree.find(path, filter);
        let match_duration = match_start.elapsed();
        let slow = match_duration > Duration::from_micros(self.options.slow_match_threshold_us);

        let Some(found) = result else {
            if slow {
                warn!(
                    path = %path,
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            }
            debug!(
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            return None;
        };

        let endpoint = Arc::clone(&self.tree.endpoints()[found.index]);
        if slow {
            warn!(
                path = %path,
                handler_name = %endpoint.handler_name(),
                route_pattern = %endpoint.pattern().raw_text(),
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        } else {
            debug!(
                path = %path,
                handler_name = %endpoint.handler_name(),
                route_pattern = %endpoint.pattern().raw_text(),
                route_values = ?found.values,
                duration_us = match_duration.as_micros(),
                "Route matched"
            );
        }
        let mut values = found.values;
        for (key, value) in endpoint.required_values().iter() {
            if !value.is_empty() && !values.contains_key(key) {
                values.insert(key, value);
            }
        }
        Some(RouteMatch { endpoint, values })
    }

    #[must_use]
    pub fn generate(&self, request: &LinkRequest) -> Option<GeneratedLink> {
        self.links.generate(request)
    }

    #[must_use]
    pub fn generate_for_handler(
        &self,
        handler_name: &str,
        request: &LinkRequest,
    ) -> Option<GeneratedLink> {
        self.links.generate_for_handler(handler_name, request)
    }
}

/// Endpoints sharing a route name must differ in required values, or share a
/// template.
fn check_route_names(endpoints: &[Arc<Endpoint>]) -> Result<(), AmbiguousRouteNameError> {
    let mut by_name: HashMap<String, Vec<&Endpoint>> = HashMap::new();
    for endpoint in endpoints {
        if let Some(name) = endpoint.route_name() {
            by_name
                .entry(name.to_ascii_lowercase())
                .or_default()
                .push(endpoint);
        }
    }

    for group in by_name.values() {
        for (i, first) in group.iter().enumerate() {
            for second in &group[i + 1..] {
                if same_required_values(first.required_values(), second.required_values())
                    && first.pattern().template() != second.pattern().template()
                {
                    return Err(AmbiguousRouteNameError {
                        route_name: first.route_name().unwrap_or_default().to_string(),
                        first_template: first.pattern().raw_text().to_string(),
                        second_template: second.pattern().raw_text().to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn same_required_values(a: &RouteValues, b: &RouteValues) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| values_equal(Some(v), b.get(k)))
}

/// Matches requests and generates links against the current [`RouteTable`].
///
/// The table is never mutated. [`Router::rebuild`] builds a new one from the
/// full endpoint list and publishes it with a single atomic swap; calls in
/// flight keep the table they loaded.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use routeweave::{route_values, Endpoint, LinkRequest, Router, RouterOptions};
///
/// let router = Router::build(
///     vec![Endpoint::builder("show_user", "users/{id:int}").build().unwrap()],
///     RouterOptions::default(),
/// )
/// .unwrap();
///
/// let m = router.route(Method::GET, "/users/42").unwrap();
/// assert_eq!(m.handler_name(), "show_user");
/// assert_eq!(m.get("id"), Some("42"));
///
/// let link = router.generate(&LinkRequest::new(route_values! { "id" => 7 })).unwrap();
/// assert_eq!(link.path, "/users/7");
/// ```
#[derive(Debug)]
pub struct Router {
    table: ArcSwap<RouteTable>,
}

impl Default for Router {
    fn default() -> Self {
        Self::empty()
    }
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// A router with no endpoints; every match and link is `None`.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(RouteTable::default())
    }

    /// # Errors
    ///
    /// See [`RouteTable::build`].
    pub fn build(
        endpoints: impl IntoIterator<Item = Endpoint>,
        options: RouterOptions,
    ) -> Result<Self, RouteTableError> {
        RouteTable::build(endpoints, options).map(Self::new)
    }

    /// Replace the route table with one built from `endpoints`, keeping the
    /// current options. On error the current table stays in place.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::build`].
    pub fn rebuild(
        &self,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Result<(), RouteTableError> {
        let options = self.table.load().options().clone();
        let table = RouteTable::build(endpoints, options)?;
        self.replace(table);
        Ok(())
    }

    /// Publish `table`.
    pub fn replace(&self, table: RouteTable) {
        self.table.store(Arc::new(table));
        info!("Routing table swapped");
    }

    /// The current table, for several calls that must see the same routes.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        self.table.load().route(method, path)
    }

    #[must_use]
    pub fn match_path(&self, path: &str, filter: impl Fn(&Endpoint) -> bool) -> Option<RouteMatch> {
        self.table.load().match_path(path, filter)
    }

    #[must_use]
    pub fn generate(&self, request: &LinkRequest) -> Option<GeneratedLink> {
        self.table.load().generate(request)
    }

    #[must_use]
    pub fn generate_for_handler(
        &self,
        handler_name: &str,
        request: &LinkRequest,
    ) -> Option<GeneratedLink> {
        self.table.load().generate_for_handler(handler_name, request)
    }
}
