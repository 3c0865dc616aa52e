//! Compiled Lua template

use mlua::{Function, Lua, LuaSerdeExt, SerializeOptions, Table};
use serde_json::Value;
use std::sync::Arc;

use codet_core::handler::CompiledArtifact;
use codet_core::include::{IncludeResolver, resolve_include};
use codet_core::{CodetError, Result};

/// Render entry point together with the sandbox that owns it
pub struct LuaArtifact {
    lua: Lua,
    entry: Function,
    support: Table,
}

impl LuaArtifact {
    pub(crate) fn new(lua: Lua, entry: Function, support: Table) -> Self {
        Self {
            lua,
            entry,
            support,
        }
    }

    /// Bytes currently allocated by the sandbox
    pub fn used_memory(&self) -> usize {
        self.lua.used_memory()
    }

    fn bind_includes(&self, includes: Option<Arc<dyn IncludeResolver>>) -> mlua::Result<()> {
        let include = self.lua.create_function(move |_, name: String| {
            resolve_include(includes.as_deref(), &name).map_err(mlua::Error::external)
        })?;
        self.support.set("include", include)
    }
}

impl CompiledArtifact for LuaArtifact {
    fn render(
        &self,
        state: &Value,
        includes: Option<Arc<dyn IncludeResolver>>,
    ) -> Result<Option<String>> {
        self.bind_includes(includes).map_err(render_error)?;

        let options = SerializeOptions::new()
            .serialize_none_to_null(false)
            .serialize_unit_to_null(false);
        let state = self
            .lua
            .to_value_with(state, options)
            .map_err(|e| CodetError::StateSerialization(e.to_string()))?;

        let output = self.entry.call::<Option<String>>(state);
        // Drop the resolver so it does not outlive the render
        self.bind_includes(None).map_err(render_error)?;

        output.map_err(render_error)
    }
}

/// Recover host errors raised inside callbacks; everything else is a
/// failed render
fn render_error(err: mlua::Error) -> CodetError {
    match host_error(&err) {
        Some(CodetError::UnresolvedInclude { name }) => {
            CodetError::UnresolvedInclude { name: name.clone() }
        }
        Some(CodetError::InvalidArgument { name, reason }) => CodetError::InvalidArgument {
            name: *name,
            reason: reason.clone(),
        },
        _ => CodetError::RenderFailed(err.to_string()),
    }
}

fn host_error(err: &mlua::Error) -> Option<&CodetError> {
    match err {
        mlua::Error::CallbackError { cause, .. } => host_error(cause),
        mlua::Error::WithContext { cause, .. } => host_error(cause),
        mlua::Error::ExternalError(inner) => inner.downcast_ref::<CodetError>(),
        _ => None,
    }
}
