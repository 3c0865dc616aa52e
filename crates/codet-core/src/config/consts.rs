//! Constants shared across the pipeline

/// Canonical language identifiers produced by `language` directives
pub mod language {
    /// C# 3.5 (`C#`, `C#v3.5`, `C#3.5`)
    pub const CSHARP_3_5: &str = "C#v3.5";

    /// C# 4.0 (`C#v4.0`, `C#4`, `C#v4`, `C#4.0`)
    pub const CSHARP_4_0: &str = "C#v4.0";

    /// Lua 5.4 (`Lua`, `Lua5.4`, `Lua54`)
    pub const LUA_5_4: &str = "Lua5.4";

    /// Language used when a template carries no `language` directive
    pub const DEFAULT: &str = LUA_5_4;
}

/// Library names every compilation references implicitly
pub mod library {
    /// Core runtime of the generated program
    pub const CORE_RUNTIME: &str = "lua54";

    /// Support library exposing the include extension point to generated code
    pub const SUPPORT: &str = "codet";

    /// Suffix appended by `ref` directives when the value has no such extension
    pub const DEFAULT_SUFFIX: &str = ".lua";
}

/// Imports every compilation unit starts with
pub const DEFAULT_IMPORTS: &[&str] = &["string", "table", "codet"];

/// Name of the configuration file looked up by [`super::Config::discover`]
pub const CONFIG_FILE_NAME: &str = "codet.toml";
