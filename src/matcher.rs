//! Route pattern matching with an explicit priority order
//!
//! Patterns are compiled once from strings like `/users/:id` or `/posts/*`.
//! Matching is a pure function of pattern and URL path; no state is kept.
//!
//! Priority (used by the route table to order dynamic candidates):
//! - longest static prefix first
//! - then fewest dynamic segments
//! - then plain dynamic before catch-all
//! - registration order breaks the remaining ties

use crate::params::{is_valid_identifier, sanitize_param_value, RouteParams};
use crate::{trace_log, warn_log};
use std::cmp::Reverse;

/// Parameter name used for a catch-all segment that has no explicit name
pub const DEFAULT_CATCH_ALL_NAME: &str = "slug";

/// A single segment in a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text that must match exactly
    Static(String),
    /// `:name` - captures one URL segment
    Param(String),
    /// `*` - captures the remaining URL segments (always last)
    CatchAll,
}

impl Segment {
    /// Parse a segment from its pattern text
    ///
    /// - `"users"` -> `Static("users")`
    /// - `":id"` -> `Param("id")`
    /// - `"*"` -> `CatchAll`
    pub fn parse(s: &str) -> Self {
        if s == "*" {
            return Segment::CatchAll;
        }
        match s.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Static(s.to_string()),
        }
    }

    /// Whether this segment captures a value
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Segment::Static(_))
    }
}

/// Ordering key for dynamic candidates. Smaller sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchPriority {
    static_prefix: Reverse<usize>,
    dynamic_count: usize,
    catch_all: bool,
}

impl MatchPriority {
    /// Number of leading literal segments
    pub fn static_prefix(&self) -> usize {
        self.static_prefix.0
    }

    /// Number of `:param` and `*` segments
    pub fn dynamic_count(&self) -> usize {
        self.dynamic_count
    }
}

/// A compiled route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    catch_all_name: Option<String>,
}

impl RoutePattern {
    /// Compile a pattern such as `/users/:id` or `/docs/*`
    ///
    /// A `*` that is not the final segment is treated as a literal, since a
    /// catch-all is only meaningful at the end.
    pub fn parse(pattern: &str) -> Self {
        let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let last = parts.len().saturating_sub(1);

        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| match Segment::parse(part) {
                Segment::CatchAll if i != last => Segment::Static((*part).to_string()),
                other => other,
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
            catch_all_name: None,
        }
    }

    /// Set the parameter name the catch-all tail is stored under
    pub fn with_catch_all_name(mut self, name: impl Into<String>) -> Self {
        self.catch_all_name = Some(name.into());
        self
    }

    /// Pattern text this was compiled from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compiled segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the last segment is a catch-all
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll))
    }

    /// Whether the pattern has no dynamic segments at all
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| !s.is_dynamic())
    }

    /// Name the catch-all value is stored under
    pub fn catch_all_name(&self) -> &str {
        self.catch_all_name
            .as_deref()
            .unwrap_or(DEFAULT_CATCH_ALL_NAME)
    }

    /// Priority key for ordering dynamic candidates
    pub fn priority(&self) -> MatchPriority {
        let static_prefix = self
            .segments
            .iter()
            .take_while(|s| !s.is_dynamic())
            .count();
        let dynamic_count = self.segments.iter().filter(|s| s.is_dynamic()).count();

        MatchPriority {
            static_prefix: Reverse(static_prefix),
            dynamic_count,
            catch_all: self.is_catch_all(),
        }
    }

    /// Structural match: does `path` fit this pattern?
    ///
    /// Plain patterns need an equal segment count with every segment equal or
    /// a parameter. Catch-all patterns need at least as many URL segments as
    /// pattern segments, so the tail is never empty.
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = split_segments(path);
        self.matches_segments(&path_segments)
    }

    fn matches_segments(&self, path_segments: &[&str]) -> bool {
        if self.is_catch_all() {
            if path_segments.len() < self.segments.len() {
                return false;
            }
        } else if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments)
            .all(|(segment, actual)| match segment {
                Segment::Static(expected) => expected == actual,
                Segment::Param(_) | Segment::CatchAll => true,
            })
    }

    /// Match and extract parameters in one step
    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        let path_segments = split_segments(path);
        if !self.matches_segments(&path_segments) {
            trace_log!("pattern '{}' rejected '{}'", self.raw, path);
            return None;
        }
        Some(self.collect_params(&path_segments))
    }

    /// Extract parameters from a path already known to match.
    ///
    /// See [`extract_params`] for the validation applied.
    pub fn extract_params(&self, path: &str) -> RouteParams {
        self.collect_params(&split_segments(path))
    }

    fn collect_params(&self, path_segments: &[&str]) -> RouteParams {
        let mut params = RouteParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            let (name, raw_value) = match segment {
                Segment::Static(_) => continue,
                Segment::Param(name) => match path_segments.get(i) {
                    Some(value) => (name.as_str(), decode_segment(value)),
                    None => continue,
                },
                Segment::CatchAll => {
                    let tail = path_segments.get(i..).unwrap_or_default();
                    let joined = tail
                        .iter()
                        .map(|s| decode_segment(s))
                        .collect::<Vec<_>>()
                        .join("/");
                    (self.catch_all_name(), joined)
                }
            };

            if !is_valid_identifier(name) {
                warn_log!(
                    "dropping parameter '{}' of pattern '{}': not a valid identifier",
                    name,
                    self.raw
                );
                continue;
            }

            params.insert(name.to_string(), sanitize_param_value(&raw_value));
        }

        params
    }
}

/// Extract parameters from `url_path` according to `route_pattern`.
///
/// `:name` segments take the matching URL segment; a trailing `*` takes the
/// rest of the URL joined by `/` under `catch_all_name` (default `slug`).
/// Names that are not valid identifiers are dropped, and every value is
/// sanitized (control characters removed, length bounded).
///
/// ```
/// use sparoute::matcher::extract_params;
///
/// let params = extract_params("/posts/*", "/posts/2024/12/19", None);
/// assert_eq!(params.get("slug"), Some(&"2024/12/19".to_string()));
/// ```
pub fn extract_params(route_pattern: &str, url_path: &str, catch_all_name: Option<&str>) -> RouteParams {
    let mut pattern = RoutePattern::parse(route_pattern);
    if let Some(name) = catch_all_name {
        pattern = pattern.with_catch_all_name(name);
    }
    pattern.extract_params(url_path)
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_parsing() {
        assert_eq!(Segment::parse("users"), Segment::Static("users".to_string()));
        assert_eq!(Segment::parse(":id"), Segment::Param("id".to_string()));
        assert_eq!(Segment::parse("*"), Segment::CatchAll);
    }

    #[test]
    fn test_star_in_middle_is_literal() {
        let pattern = RoutePattern::parse("/a/*/b");
        assert!(!pattern.is_catch_all());
        assert!(pattern.matches("/a/*/b"));
        assert!(!pattern.matches("/a/x/b"));
    }

    #[test]
    fn test_static_route_matching() {
        let pattern = RoutePattern::parse("/users");

        assert!(pattern.matches("/users"));
        assert!(!pattern.matches("/posts"));
        assert!(!pattern.matches("/users/123"));
    }

    #[test]
    fn test_dynamic_route_matching() {
        let pattern = RoutePattern::parse("/users/:id");

        let params = pattern.match_path("/users/123").unwrap();
        assert_eq!(params.get("id"), Some(&"123".to_string()));

        assert!(pattern.match_path("/users").is_none());
        assert!(pattern.match_path("/users/123/extra").is_none());
    }

    #[test]
    fn test_catch_all_matching() {
        let pattern = RoutePattern::parse("/posts/*");

        let params = pattern.match_path("/posts/2024/12/19").unwrap();
        assert_eq!(params.get("slug"), Some(&"2024/12/19".to_string()));

        assert!(pattern.matches("/posts/one"));
        assert!(!pattern.matches("/posts"));
        assert!(!pattern.matches("/other/one"));
    }

    #[test]
    fn test_named_catch_all() {
        let pattern = RoutePattern::parse("/docs/*").with_catch_all_name("rest");
        let params = pattern.match_path("/docs/guide/intro").unwrap();
        assert_eq!(params.get("rest"), Some(&"guide/intro".to_string()));
        assert!(!params.contains("slug"));
    }

    #[test]
    fn test_invalid_param_name_is_dropped() {
        let params = extract_params("/x/:bad-name/:ok", "/x/1/2", None);
        assert!(!params.contains("bad-name"));
        assert_eq!(params.get("ok"), Some(&"2".to_string()));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_invalid_catch_all_name_is_dropped() {
        let params = extract_params("/x/*", "/x/a/b", Some("not valid"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_values_are_decoded_and_sanitized() {
        let params = extract_params("/q/:term", "/q/hello%20world%0A", None);
        assert_eq!(params.get("term"), Some(&"hello world".to_string()));
    }

    #[test]
    fn test_priority_ordering() {
        let literal_heavy = RoutePattern::parse("/users/:id/posts").priority();
        let one_param = RoutePattern::parse("/users/:id").priority();
        let two_params = RoutePattern::parse("/:a/:b").priority();
        let catch_all = RoutePattern::parse("/users/*").priority();

        assert_eq!(one_param.static_prefix(), 1);
        assert_eq!(two_params.dynamic_count(), 2);

        // same static prefix and dynamic count: catch-all sorts last
        assert!(one_param < catch_all);
        // longer static prefix wins over fewer params
        assert!(one_param < two_params);
        assert!(literal_heavy.static_prefix() == one_param.static_prefix());
    }
}
