use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::binder::bind;
use super::encode::{push_fragment, push_query};
use crate::endpoint::Endpoint;
use crate::options::RouterOptions;
use crate::values::RouteValues;

/// Input to link generation.
#[derive(Debug, Clone, Default)]
pub struct LinkRequest {
    /// Restrict candidates to endpoints with this route name
    /// (case-insensitive).
    pub route_name: Option<String>,
    /// Values supplied for this link.
    pub values: RouteValues,
    /// Values of the current request's match, used to fill parameters the
    /// caller did not supply.
    pub ambient_values: RouteValues,
    /// Prefix for the generated path, e.g. `/app`.
    pub path_base: Option<String>,
    pub fragment: Option<String>,
}

impl LinkRequest {
    #[must_use]
    pub fn new(values: RouteValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
        self.route_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_ambient(mut self, values: RouteValues) -> Self {
        self.ambient_values = values;
        self
    }

    #[must_use]
    pub fn with_path_base(mut self, base: impl Into<String>) -> Self {
        self.path_base = Some(base.into());
        self
    }

    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }
}

/// A generated link and the endpoint it leads to.
#[derive(Debug, Clone)]
pub struct GeneratedLink {
    /// Encoded path, including any query string and fragment.
    pub path: String,
    pub endpoint: Arc<Endpoint>,
}

impl fmt::Display for GeneratedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

type Candidates = SmallVec<[usize; 2]>;

/// Reverse routing over a ranked endpoint list.
///
/// Candidates are tried in rank order and the first one that binds wins, so
/// a tie between equally specific endpoints goes to the one registered
/// first.
#[derive(Debug, Default)]
pub struct LinkGenerator {
    endpoints: Vec<Arc<Endpoint>>,
    /// Every endpoint not flagged `suppress_link_generation`.
    eligible: Vec<usize>,
    /// Keyed by lower-cased route name.
    by_route_name: HashMap<Box<str>, Candidates>,
    by_handler: HashMap<Arc<str>, Candidates>,
    options: RouterOptions,
}

impl LinkGenerator {
    /// Index `endpoints`, which must already be in rank order.
    #[must_use]
    pub fn new(endpoints: Vec<Arc<Endpoint>>, options: RouterOptions) -> Self {
        let mut eligible = Vec::with_capacity(endpoints.len());
        let mut by_route_name: HashMap<Box<str>, Candidates> = HashMap::new();
        let mut by_handler: HashMap<Arc<str>, Candidates> = HashMap::new();

        for (index, endpoint) in endpoints.iter().enumerate() {
            if endpoint.metadata().suppress_link_generation {
                continue;
            }
            eligible.push(index);
            if let Some(name) = endpoint.route_name() {
                by_route_name
                    .entry(name.to_ascii_lowercase().into_boxed_str())
                    .or_default()
                    .push(index);
            }
            by_handler
                .entry(Arc::from(endpoint.handler_name()))
                .or_default()
                .push(index);
        }

        Self {
            endpoints,
            eligible,
            by_route_name,
            by_handler,
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Generate a link from the request's route name, or from every eligible
    /// endpoint when no name is given. `None` when no candidate can be bound.
    #[must_use]
    pub fn generate(&self, request: &LinkRequest) -> Option<GeneratedLink> {
        match &request.route_name {
            Some(name) => {
                let candidates = self
                    .by_route_name
                    .get(name.to_ascii_lowercase().as_str())
                    .map_or(&[][..], |c| c.as_slice());
                self.generate_from(candidates, request, name)
            }
            None => self.generate_from(&self.eligible, request, "*"),
        }
    }

    /// Generate a link to one of the endpoints registered for `handler_name`.
    /// A route name on the request further narrows the candidates.
    #[must_use]
    pub fn generate_for_handler(
        &self,
        handler_name: &str,
        request: &LinkRequest,
    ) -> Option<GeneratedLink> {
        let candidates = self.by_handler.get(handler_name)?;
        let candidates: Candidates = match &request.route_name {
            Some(name) => candidates
                .iter()
                .copied()
                .filter(|&i| {
                    self.endpoints[i]
                        .route_name()
                        .is_some_and(|n| n.eq_ignore_ascii_case(name))
                })
                .collect(),
            None => candidates.clone(),
        };
        self.generate_from(&candidates, request, handler_name)
    }

    fn generate_from(
        &self,
        candidates: &[usize],
        request: &LinkRequest,
        selector: &str,
    ) -> Option<GeneratedLink> {
        for &index in candidates {
            let endpoint = &self.endpoints[index];
            let Some(binding) = bind(
                endpoint,
                &request.values,
                &request.ambient_values,
                &self.options,
            ) else {
                continue;
            };
            let path = self.finish(binding.path, &binding.query, request);
            debug!(
                selector = %selector,
                handler_name = %endpoint.handler_name(),
                route_pattern = %endpoint.pattern().raw_text(),
                path = %path,
                candidates = candidates.len(),
                "Link generated"
            );
            return Some(GeneratedLink {
                path,
                endpoint: Arc::clone(endpoint),
            });
        }

        debug!(
            selector = %selector,
            candidates = candidates.len(),
            values = ?request.values,
            "No link generated"
        );
        None
    }

    /// Apply base, case, trailing slash, query and fragment.
    fn finish(&self, path: String, query: &[(&str, &str)], request: &LinkRequest) -> String {
        let mut out = String::with_capacity(path.len() + 32);
        if let Some(base) = request.path_base.as_deref() {
            let base = base.trim_end_matches('/');
            if !base.is_empty() && !base.starts_with('/') {
                out.push('/');
            }
            out.push_str(base);
        }
        // the base belongs to the caller and keeps its case
        if self.options.lowercase_urls {
            out.push_str(&path.to_lowercase());
        } else {
            out.push_str(&path);
        }
        if self.options.append_trailing_slash && !out.ends_with('/') {
            out.push('/');
        }

        let query_start = out.len();
        push_query(&mut out, query.iter().copied());
        if self.options.lowercase_urls && self.options.lowercase_query_strings {
            let lowered = out[query_start..].to_lowercase();
            out.truncate(query_start);
            out.push_str(&lowered);
        }

        if let Some(fragment) = request.fragment.as_deref() {
            push_fragment(&mut out, fragment);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_values;

    fn generator(endpoints: Vec<Endpoint>, options: RouterOptions) -> LinkGenerator {
        LinkGenerator::new(endpoints.into_iter().map(Arc::new).collect(), options)
    }

    #[test]
    fn test_route_name_selects_candidates() {
        let g = generator(
            vec![
                Endpoint::builder("list", "users").route_name("users").build().unwrap(),
                Endpoint::builder("show", "users/{id}").route_name("user").build().unwrap(),
            ],
            RouterOptions::default(),
        );
        let link = g
            .generate(&LinkRequest::new(route_values! { "id" => 3 }).with_route_name("USER"))
            .unwrap();
        assert_eq!(link.path, "/users/3");
        assert_eq!(link.endpoint.handler_name(), "show");
        assert!(g
            .generate(&LinkRequest::new(RouteValues::new()).with_route_name("missing"))
            .is_none());
    }

    #[test]
    fn test_first_bindable_candidate_wins() {
        let g = generator(
            vec![
                Endpoint::builder("a", "a/{id:int}").build().unwrap(),
                Endpoint::builder("b", "b/{id}").build().unwrap(),
            ],
            RouterOptions::default(),
        );
        let link = g.generate(&LinkRequest::new(route_values! { "id" => "x" })).unwrap();
        assert_eq!(link.path, "/b/x");
        let link = g.generate(&LinkRequest::new(route_values! { "id" => 1 })).unwrap();
        assert_eq!(link.path, "/a/1");
    }

    #[test]
    fn test_suppressed_endpoints_are_skipped() {
        let g = generator(
            vec![
                Endpoint::builder("hidden", "hidden/{id}")
                    .suppress_link_generation()
                    .build()
                    .unwrap(),
                Endpoint::builder("shown", "shown/{id}").build().unwrap(),
            ],
            RouterOptions::default(),
        );
        let link = g.generate(&LinkRequest::new(route_values! { "id" => 1 })).unwrap();
        assert_eq!(link.path, "/shown/1");
        assert!(g
            .generate_for_handler("hidden", &LinkRequest::new(route_values! { "id" => 1 }))
            .is_none());
    }

    #[test]
    fn test_generate_for_handler() {
        let g = generator(
            vec![
                Endpoint::builder("show", "users/{id}").build().unwrap(),
                Endpoint::builder("other", "other/{id}").build().unwrap(),
            ],
            RouterOptions::default(),
        );
        let link = g
            .generate_for_handler("other", &LinkRequest::new(route_values! { "id" => 1 }))
            .unwrap();
        assert_eq!(link.to_string(), "/other/1");
        assert!(g
            .generate_for_handler("nobody", &LinkRequest::new(RouteValues::new()))
            .is_none());
    }

    #[test]
    fn test_url_shaping_options() {
        let options = RouterOptions {
            lowercase_urls: true,
            append_trailing_slash: true,
            ..RouterOptions::default()
        };
        let g = generator(vec![Endpoint::builder("h", "Users/{Id}").build().unwrap()], options);
        let request = LinkRequest::new(route_values! { "Id" => "ABC", "Q" => "Mixed" })
            .with_path_base("app/")
            .with_fragment("Top");
        assert_eq!(
            g.generate(&request).unwrap().path,
            "/app/users/abc/?Q=Mixed#Top"
        );

        let options = RouterOptions {
            lowercase_urls: true,
            lowercase_query_strings: true,
            ..RouterOptions::default()
        };
        let g = generator(vec![Endpoint::builder("h", "Users/{Id}").build().unwrap()], options);
        assert_eq!(
            g.generate(&LinkRequest::new(route_values! { "Id" => "ABC", "Q" => "Mixed" }))
                .unwrap()
                .path,
            "/users/abc?q=mixed"
        );
    }
}
