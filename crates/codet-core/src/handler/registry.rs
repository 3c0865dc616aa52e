//! Language identifier → handler lookup

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::LanguageHandler;

/// Creates a fresh handler for one compilation
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn LanguageHandler> + Send + Sync>;

/// Maps normalized language identifiers to handler factories
///
/// Supplied by the caller of an execution context; the core never registers
/// anything on its own.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: BTreeMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` for `language`, replacing any earlier entry
    pub fn register<F>(&mut self, language: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn LanguageHandler> + Send + Sync + 'static,
    {
        let language = language.into();
        tracing::debug!("Registering handler for {}", language);
        self.factories.insert(language, Arc::new(factory));
        self
    }

    /// Register a handler type built with [`Default`]
    pub fn register_default<H>(&mut self, language: impl Into<String>) -> &mut Self
    where
        H: LanguageHandler + Default + 'static,
    {
        self.register(language, || Box::new(H::default()))
    }

    /// Instantiate the handler for `language`
    pub fn create(&self, language: &str) -> Option<Box<dyn LanguageHandler>> {
        self.factories.get(language).map(|factory| factory())
    }

    pub fn contains(&self, language: &str) -> bool {
        self.factories.contains_key(language)
    }

    /// Registered identifiers, sorted
    pub fn languages(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
