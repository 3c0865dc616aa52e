//! Library reference resolution
//!
//! Every compilation references a fixed host set (the core runtime, the
//! support library and the library that defines the state type) followed by
//! the libraries the template declares.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::state::StateType;
use crate::config::consts::library;

/// Where a reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceOrigin {
    /// Always referenced, provided by the host process
    Host,
    /// Declared by a `ref` directive
    Directive,
}

/// One library handed to the compiler backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryReference {
    /// Name as declared
    pub name: String,
    /// Resolved location; equal to `name` when nothing better was found
    pub path: PathBuf,
    pub origin: ReferenceOrigin,
}

impl LibraryReference {
    pub fn host(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            origin: ReferenceOrigin::Host,
        }
    }

    pub fn is_host(&self) -> bool {
        self.origin == ReferenceOrigin::Host
    }
}

/// Build the ordered, deduplicated reference list for one compilation
pub fn resolve_references<'a, I>(
    state_type: &StateType,
    declared: I,
    runtime_dir: Option<&Path>,
) -> Vec<LibraryReference>
where
    I: IntoIterator<Item = &'a String>,
{
    let host = [library::CORE_RUNTIME, library::SUPPORT, state_type.library.as_str()]
        .into_iter()
        .filter(|name| !name.is_empty())
        .map(LibraryReference::host);

    let directive = declared.into_iter().map(|name| LibraryReference {
        name: name.clone(),
        path: resolve_path(name, runtime_dir),
        origin: ReferenceOrigin::Directive,
    });

    let mut seen = HashSet::new();
    host.chain(directive)
        .filter(|reference| seen.insert(reference.name.clone()))
        .collect()
}

/// Absolute paths pass through; relative ones are looked up in `runtime_dir`
/// and left untouched if no such file exists there
pub fn resolve_path(name: &str, runtime_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Some(dir) = runtime_dir {
        let candidate = dir.join(path);
        if candidate.is_file() {
            tracing::debug!("Resolved reference '{}' to {}", name, candidate.display());
            return candidate;
        }
    }

    tracing::warn!("Reference '{}' not found next to the runtime; passing it through", name);
    path.to_path_buf()
}
