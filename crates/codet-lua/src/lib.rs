//! Lua 5.4 language handler for codet
//!
//! Templates compile into a Lua chunk that runs in its own sandboxed VM. The
//! sandbox exposes only the `string`, `table`, `math` and `utf8` libraries;
//! code loaders are removed and an optional memory limit applies.
//!
//! ```no_run
//! use codet_core::config::HandlerConfig;
//! use codet_core::{ExecutionContext, HandlerRegistry, StateType};
//!
//! let mut registry = HandlerRegistry::new();
//! codet_lua::register(&mut registry, HandlerConfig::default());
//!
//! let mut context = ExecutionContext::new();
//! context.compile("Hello <%= name %>!", &registry, &StateType::new("Greeting", "app").with_properties(["name"]), "")?;
//! assert_eq!(context.execute(&serde_json::json!({ "name": "World" }))?, "Hello World!");
//! # Ok::<(), codet_core::CodetError>(())
//! ```

mod artifact;
pub mod codegen;
mod handler;

pub use artifact::LuaArtifact;
pub use handler::{CHUNK_NAME, LuaHandler, diagnostic_from, sandbox};

use codet_core::HandlerRegistry;
use codet_core::config::HandlerConfig;
use codet_core::config::consts::language;

/// Register [`LuaHandler`] for the Lua language identifier
pub fn register(registry: &mut HandlerRegistry, config: HandlerConfig) {
    registry.register(language::LUA_5_4, move || {
        Box::new(LuaHandler::new(config.clone()))
    });
}
