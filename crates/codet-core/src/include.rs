//! Include extension point
//!
//! A compiled template asks for named content at render time through an
//! [`IncludeRequest`]. Whoever resolves it fills in the content and marks the
//! request handled; a request nobody handles fails the render.

use std::collections::BTreeMap;

use crate::error::{CodetError, Result};

/// One render-time request for named content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRequest {
    name: String,
    content: String,
    handled: bool,
}

impl IncludeRequest {
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `name` is empty or whitespace only.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CodetError::invalid_argument(
                "name",
                "include name must not be blank",
            ));
        }

        Ok(Self {
            name,
            content: String::new(),
            handled: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Store `content` with surrounding whitespace removed
    pub fn set_content(&mut self, content: &str) {
        self.content = content.trim().to_string();
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }

    /// Set the content and mark the request handled
    pub fn fulfill(&mut self, content: &str) {
        self.set_content(content);
        self.handled = true;
    }
}

/// Resolves include requests during a render
pub trait IncludeResolver: Send + Sync {
    fn resolve(&self, request: &mut IncludeRequest);
}

impl<F> IncludeResolver for F
where
    F: Fn(&mut IncludeRequest) + Send + Sync,
{
    fn resolve(&self, request: &mut IncludeRequest) {
        self(request)
    }
}

/// Fixed name → content table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIncludes {
    entries: BTreeMap<String, String>,
}

impl StaticIncludes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(name.into(), content.into());
    }

    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IncludeResolver for StaticIncludes {
    fn resolve(&self, request: &mut IncludeRequest) {
        if let Some(content) = self.entries.get(request.name()) {
            request.fulfill(content);
        }
    }
}

/// Run one include through `resolver` and return its content
///
/// # Errors
///
/// - `InvalidArgument` for a blank name
/// - `UnresolvedInclude` when no resolver is set or the resolver leaves the
///   request unhandled
pub fn resolve_include(resolver: Option<&dyn IncludeResolver>, name: &str) -> Result<String> {
    let mut request = IncludeRequest::new(name)?;
    if let Some(resolver) = resolver {
        resolver.resolve(&mut request);
    }

    if !request.is_handled() {
        tracing::debug!("Include '{}' was not handled", name);
        return Err(CodetError::UnresolvedInclude {
            name: name.to_string(),
        });
    }

    Ok(request.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_names_are_rejected() {
        for name in ["", " ", " \t\r\n "] {
            let result = IncludeRequest::new(name);
            assert!(
                matches!(result, Err(CodetError::InvalidArgument { name: "name", .. })),
                "'{}' should be rejected",
                name.escape_debug()
            );
        }
    }

    #[test]
    fn test_new_request_is_unhandled_and_empty() {
        let request = IncludeRequest::new("header").unwrap();
        assert_eq!(request.name(), "header");
        assert_eq!(request.content(), "");
        assert!(!request.is_handled());
    }

    #[test]
    fn test_content_is_trimmed() {
        let mut request = IncludeRequest::new("header").unwrap();
        request.set_content("  x  ");
        assert_eq!(request.content(), "x");
        assert!(!request.is_handled());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |request: &mut IncludeRequest| {
            if request.name() == "year" {
                request.fulfill("2024\n");
            }
        };

        assert_eq!(resolve_include(Some(&resolver), "year").unwrap(), "2024");
        assert!(matches!(
            resolve_include(Some(&resolver), "month"),
            Err(CodetError::UnresolvedInclude { name }) if name == "month"
        ));
    }

    #[test]
    fn test_handled_without_content_is_empty() {
        let resolver = |request: &mut IncludeRequest| request.set_handled(true);
        assert_eq!(resolve_include(Some(&resolver), "blank").unwrap(), "");
    }

    #[test]
    fn test_static_includes() {
        let includes = StaticIncludes::new().with("header", "  <h1>Title</h1>  ");
        assert_eq!(includes.len(), 1);
        assert_eq!(
            resolve_include(Some(&includes), "header").unwrap(),
            "<h1>Title</h1>"
        );
        assert!(resolve_include(Some(&includes), "footer").is_err());
    }

    #[test]
    fn test_no_resolver_is_unresolved() {
        assert!(matches!(
            resolve_include(None, "header"),
            Err(CodetError::UnresolvedInclude { .. })
        ));
    }
}
