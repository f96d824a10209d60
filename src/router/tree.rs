//! Segment tree used for inbound matching.
//!
//! Each node stands for a path position. Children are tried in a fixed
//! order: the literal child for the segment (one hash lookup, ASCII
//! case-insensitive), then parameter edges from most to least specific, then
//! catch-all edges. Matching is a depth-first search. A constraint failure or
//! a dead end unwinds the captured values and the search continues with the
//! next candidate, and every complete path is visited so the best endpoint
//! wins regardless of which branch found it.
//!
//! Endpoints are stored as indices into the ranked endpoint list; a lower
//! index is a better endpoint. An endpoint whose trailing segments are all
//! omittable is registered at every node from the first omittable segment
//! on, so `{controller=Home}/{action=Index}` answers `/`, `/Home` and
//! `/Home/Index`.
//!
//! Edges are shared between patterns when their segment text and constraint
//! identities are equal, so constraints can be checked on the edge itself.

use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::precedence::segment_digit;
use crate::constraints::RouteDirection;
use crate::endpoint::Endpoint;
use crate::pattern::RoutePattern;
use crate::template::{RoutePart, RouteSegment};
use crate::values::RouteValues;

const IN: RouteDirection = RouteDirection::IncomingRequest;

/// Request paths rarely have more segments than this.
type PathSegments<'p> = SmallVec<[(usize, &'p str); 16]>;

/// A successful tree search.
#[derive(Debug, Clone)]
pub struct TreeMatch {
    /// Index into [`MatchTree::endpoints`].
    pub index: usize,
    /// Captured parameters followed by defaults.
    pub values: RouteValues,
}

/// Immutable matching structure over a ranked endpoint list.
#[derive(Debug, Default)]
pub struct MatchTree {
    root: Node,
    endpoints: Vec<Arc<Endpoint>>,
}

#[derive(Debug, Default)]
struct Node {
    /// Endpoints whose path may end here, ascending.
    endpoints: Vec<usize>,
    /// Keyed by lower-cased literal text.
    literals: HashMap<Box<str>, Node>,
    params: Vec<ParamEdge>,
    catch_alls: Vec<CatchAllEdge>,
}

#[derive(Debug)]
struct ParamEdge {
    key: String,
    score: u8,
    matcher: SegmentMatcher,
    pattern: Arc<RoutePattern>,
    child: Node,
}

#[derive(Debug)]
struct CatchAllEdge {
    key: String,
    name: Arc<str>,
    pattern: Arc<RoutePattern>,
    endpoints: Vec<usize>,
}

#[derive(Debug)]
enum SegmentMatcher {
    Parameter(Arc<str>),
    Complex(ComplexSegment),
}

#[derive(Debug)]
enum ComplexPart {
    /// Lower-cased.
    Literal(Box<str>),
    Parameter(Arc<str>),
}

/// A segment such as `{name}.{ext?}`.
#[derive(Debug)]
struct ComplexSegment {
    parts: Vec<ComplexPart>,
    /// The last part is an optional parameter that may be dropped together
    /// with the literal before it.
    optional_tail: bool,
}

impl MatchTree {
    /// Build a tree over `endpoints`, which must already be in rank order.
    /// Endpoints flagged `suppress_matching` are left out.
    #[must_use]
    pub fn build(endpoints: Vec<Arc<Endpoint>>) -> Self {
        let mut root = Node::default();
        for (index, endpoint) in endpoints.iter().enumerate() {
            if endpoint.metadata().suppress_matching {
                continue;
            }
            root.insert(index, endpoint.pattern(), 0);
        }
        root.sort_edges();
        Self { root, endpoints }
    }

    #[must_use]
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Find the best endpoint for `path` accepted by `filter`.
    ///
    /// `path` is already percent-decoded; a leading `/` and one trailing `/`
    /// are ignored.
    pub fn find(&self, path: &str, filter: &dyn Fn(&Endpoint) -> bool) -> Option<TreeMatch> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);

        let mut segments = PathSegments::new();
        if !path.is_empty() {
            let mut offset = 0;
            for segment in path.split('/') {
                segments.push((offset, segment));
                offset += segment.len() + 1;
            }
        }

        let mut search = Search {
            tree: self,
            path,
            segments,
            filter,
            values: RouteValues::new(),
            best: None,
        };
        search.visit(&self.root, 0);
        search.best
    }
}

impl Node {
    fn insert(&mut self, index: usize, pattern: &Arc<RoutePattern>, depth: usize) {
        let template = pattern.template();
        if depth >= template.omittable_from() {
            self.endpoints.push(index);
        }
        let Some(segment) = template.segments().get(depth) else {
            return;
        };

        if let Some(literal) = segment.as_literal() {
            self.literals
                .entry(literal.to_ascii_lowercase().into_boxed_str())
                .or_default()
                .insert(index, pattern, depth + 1);
            return;
        }

        let key = edge_key(segment, pattern);
        if let Some(p) = segment.as_parameter().filter(|p| p.is_catch_all()) {
            match self.catch_alls.iter_mut().find(|e| e.key == key) {
                Some(edge) => edge.endpoints.push(index),
                None => self.catch_alls.push(CatchAllEdge {
                    key,
                    name: Arc::clone(&p.name),
                    pattern: Arc::clone(pattern),
                    endpoints: vec![index],
                }),
            }
            return;
        }

        let position = match self.params.iter().position(|e| e.key == key) {
            Some(position) => position,
            None => {
                let score = segment_digit(segment, &|name: &str| {
                    !pattern.constraints_for(name).is_empty()
                });
                self.params.push(ParamEdge {
                    key,
                    score,
                    matcher: SegmentMatcher::new(segment),
                    pattern: Arc::clone(pattern),
                    child: Node::default(),
                });
                self.params.len() - 1
            }
        };
        self.params[position]
            .child
            .insert(index, pattern, depth + 1);
    }

    fn sort_edges(&mut self) {
        self.params.sort_by_key(|e| e.score);
        for child in self.literals.values_mut() {
            child.sort_edges();
        }
        for edge in &mut self.params {
            edge.child.sort_edges();
        }
    }

    fn count(&self) -> usize {
        1 + self.literals.values().map(Node::count).sum::<usize>()
            + self.params.iter().map(|e| e.child.count()).sum::<usize>()
    }
}

/// Segment text plus the identity of every constraint on its parameters.
fn edge_key(segment: &RouteSegment, pattern: &RoutePattern) -> String {
    let mut key = segment.to_string();
    for p in segment.parameters() {
        for c in pattern.constraints_for(&p.name) {
            key.push('|');
            key.push_str(&c.identity);
        }
    }
    key
}

impl SegmentMatcher {
    fn new(segment: &RouteSegment) -> Self {
        if let Some(p) = segment.as_parameter() {
            return Self::Parameter(Arc::clone(&p.name));
        }
        let parts: Vec<ComplexPart> = segment
            .parts
            .iter()
            .map(|part| match part {
                RoutePart::Literal(text) => {
                    ComplexPart::Literal(text.to_ascii_lowercase().into_boxed_str())
                }
                RoutePart::Parameter(p) => ComplexPart::Parameter(Arc::clone(&p.name)),
            })
            .collect();
        let optional_tail = segment
            .parts
            .last()
            .and_then(RoutePart::as_parameter)
            .is_some_and(|p| p.is_optional());
        Self::Complex(ComplexSegment {
            parts,
            optional_tail,
        })
    }

    /// Capture this edge's parameters from `segment` into `values`, checking
    /// constraints. Leaves `values` untouched on failure.
    fn capture(&self, segment: &str, pattern: &RoutePattern, values: &mut RouteValues) -> bool {
        match self {
            Self::Parameter(name) => {
                if segment.is_empty() || !pattern.accepts(name, Some(segment), IN) {
                    return false;
                }
                values.push_unique(Arc::clone(name), segment.to_string());
                true
            }
            Self::Complex(complex) => {
                let mut captured = SmallVec::<[(&Arc<str>, &str); 4]>::new();
                if !complex.match_segment(segment, &mut captured) {
                    return false;
                }
                if !captured
                    .iter()
                    .all(|(name, value)| pattern.accepts(name, Some(*value), IN))
                {
                    return false;
                }
                // captured right to left
                for (name, value) in captured.into_iter().rev() {
                    values.push_unique(Arc::clone(name), value.to_string());
                }
                true
            }
        }
    }
}

impl ComplexSegment {
    fn match_segment<'a, 's>(
        &'a self,
        segment: &'s str,
        captured: &mut SmallVec<[(&'a Arc<str>, &'s str); 4]>,
    ) -> bool {
        let lower: Cow<'_, str> = if segment.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(segment.to_ascii_lowercase())
        } else {
            Cow::Borrowed(segment)
        };

        if match_parts(&self.parts, segment, &lower, captured) {
            return true;
        }
        captured.clear();
        // retry without the optional parameter and its separator
        self.optional_tail
            && self.parts.len() >= 3
            && match_parts(
                &self.parts[..self.parts.len() - 2],
                segment,
                &lower,
                captured,
            )
    }
}

/// Right-to-left match of alternating literals and parameters. Each
/// parameter takes at least one character; literals are found with the last
/// occurrence that leaves room for the parameter after them.
fn match_parts<'a, 's>(
    parts: &'a [ComplexPart],
    segment: &'s str,
    lower: &str,
    captured: &mut SmallVec<[(&'a Arc<str>, &'s str); 4]>,
) -> bool {
    let mut end = segment.len();
    let mut pending: Option<&'a Arc<str>> = None;

    for part in parts.iter().rev() {
        match part {
            ComplexPart::Parameter(name) => pending = Some(name),
            ComplexPart::Literal(literal) => {
                let start = match pending.take() {
                    Some(name) => {
                        let Some((last_char, _)) = segment[..end].char_indices().next_back()
                        else {
                            return false;
                        };
                        let Some(position) = lower[..last_char].rfind(&**literal) else {
                            return false;
                        };
                        captured.push((name, &segment[position + literal.len()..end]));
                        position
                    }
                    None => {
                        if !lower[..end].ends_with(&**literal) {
                            return false;
                        }
                        end - literal.len()
                    }
                };
                end = start;
            }
        }
    }

    match pending {
        Some(name) if end > 0 => {
            captured.push((name, &segment[..end]));
            true
        }
        Some(_) => false,
        None => end == 0,
    }
}

struct Search<'t, 'p, 'f> {
    tree: &'t MatchTree,
    path: &'p str,
    segments: PathSegments<'p>,
    filter: &'f dyn Fn(&Endpoint) -> bool,
    /// Captures along the current branch.
    values: RouteValues,
    best: Option<TreeMatch>,
}

impl<'t> Search<'t, '_, '_> {
    fn visit(&mut self, node: &'t Node, depth: usize) {
        let Some(&(offset, segment)) = self.segments.get(depth) else {
            self.consider(&node.endpoints);
            return;
        };

        if !node.literals.is_empty() {
            let key: Cow<'_, str> = if segment.bytes().any(|b| b.is_ascii_uppercase()) {
                Cow::Owned(segment.to_ascii_lowercase())
            } else {
                Cow::Borrowed(segment)
            };
            if let Some(child) = node.literals.get(key.as_ref()) {
                self.visit(child, depth + 1);
            }
        }

        for edge in &node.params {
            let mark = self.values.len();
            if edge.matcher.capture(segment, &edge.pattern, &mut self.values) {
                self.visit(&edge.child, depth + 1);
            }
            self.values.truncate(mark);
        }

        if node.catch_alls.is_empty() {
            return;
        }
        let path = self.path;
        let rest = path[offset..].trim_start_matches('/');
        for edge in &node.catch_alls {
            if !edge.pattern.accepts(&edge.name, Some(rest), IN) {
                continue;
            }
            let mark = self.values.len();
            self.values
                .push_unique(Arc::clone(&edge.name), rest.to_string());
            self.consider(&edge.endpoints);
            self.values.truncate(mark);
        }
    }

    /// Offer endpoints reachable with the current captures.
    fn consider(&mut self, candidates: &[usize]) {
        for &index in candidates {
            if self.best.as_ref().is_some_and(|b| b.index <= index) {
                return;
            }
            let endpoint = &self.tree.endpoints[index];
            if !(self.filter)(endpoint) {
                continue;
            }
            if let Some(values) = complete_values(endpoint.pattern(), &self.values) {
                self.best = Some(TreeMatch { index, values });
                return;
            }
        }
    }
}

/// Add defaults to the captures, checking constraints on everything that was
/// not captured from the path.
fn complete_values(pattern: &RoutePattern, captured: &RouteValues) -> Option<RouteValues> {
    let mut values = captured.clone();
    for p in pattern.template().parameters() {
        if values.contains_key(&p.name) {
            continue;
        }
        let default = pattern.default_value(&p.name);
        if !pattern.accepts(&p.name, default, IN) {
            return None;
        }
        if let Some(default) = default {
            values.push_unique(Arc::clone(&p.name), default.to_string());
        }
    }
    for key in pattern.constrained_keys() {
        if !pattern.is_parameter(key) && !pattern.accepts(key, pattern.default_value(key), IN) {
            return None;
        }
    }
    for (key, value) in pattern.non_parameter_defaults() {
        values.insert(key, value);
    }
    Some(values)
}
