//! URL path helpers
//!
//! Normalization, query splitting and the ancestor walk used for layout and
//! middleware inheritance.

use std::borrow::Cow;

/// Normalize a URL path.
///
/// - Backslashes become `/`
/// - Duplicate slashes collapse: `/a//b` → `/a/b`
/// - Trailing slash is removed except for root
/// - A leading `/` is always present
///
/// Already-normal paths are returned borrowed.
///
/// ```
/// use sparoute::path::normalize_path;
///
/// assert_eq!(normalize_path("/users/"), "/users");
/// assert_eq!(normalize_path("users//42"), "/users/42");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_normalized(path) {
        return Cow::Borrowed(path);
    }

    let joined = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    Cow::Owned(format!("/{}", joined))
}

/// Check whether a path is already in normal form
pub fn is_normalized(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    path.starts_with('/')
        && !path.ends_with('/')
        && !path.contains("//")
        && !path.contains('\\')
}

/// Split a URL (path + optional query + optional fragment) into its path and
/// query parts. The fragment is dropped.
///
/// ```
/// use sparoute::path::split_url;
///
/// assert_eq!(split_url("/a?x=1#top"), ("/a", Some("x=1")));
/// assert_eq!(split_url("/a#top"), ("/a", None));
/// ```
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
    match without_fragment.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path, Some(query)),
        Some((path, _)) => (path, None),
        None => (without_fragment, None),
    }
}

/// Join a base path and a route path, both assumed normalized.
///
/// A base of `/` (or empty) leaves the path untouched.
pub fn join_base(base_path: &str, path: &str) -> String {
    if base_path.is_empty() || base_path == "/" {
        return path.to_string();
    }
    if path == "/" {
        return base_path.to_string();
    }
    format!("{}{}", base_path, path)
}

/// Strip a base path from a URL path.
///
/// Returns `None` when the path is not inside the base. The boundary must be
/// a `/` or the end of the string, so `/appx` is not inside `/app`.
pub fn strip_base<'a>(base_path: &str, path: &'a str) -> Option<&'a str> {
    if base_path.is_empty() || base_path == "/" {
        return Some(path);
    }
    let rest = path.strip_prefix(base_path)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Lazy iterator over a path and its ancestors.
///
/// For `/a/b/c` yields `/a/b/c`, `/a/b`, `/a`, `/`.
///
/// ```
/// use sparoute::path::PathHierarchy;
///
/// let paths: Vec<&str> = PathHierarchy::new("/a/b/c").collect();
/// assert_eq!(paths, vec!["/a/b/c", "/a/b", "/a", "/"]);
/// ```
#[derive(Debug, Clone)]
pub struct PathHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> PathHierarchy<'a> {
    /// Start the walk at `path`
    pub fn new(path: &'a str) -> Self {
        Self {
            current: Some(path),
        }
    }
}

impl<'a> Iterator for PathHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = if current == "/" || current.is_empty() {
            None
        } else {
            match current.rfind('/') {
                Some(0) => Some("/"),
                Some(pos) => Some(&current[..pos]),
                None => None,
            }
        };

        Some(current)
    }
}
