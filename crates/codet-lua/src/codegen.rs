//! Lua program generation
//!
//! A generated program is a chunk that receives the referenced-module table
//! as its only argument and returns the render entry point:
//!
//! ```lua
//! local __modules = ...
//! -- helpers, one `local x = __import("x")` per import
//! local function __render(page)
//!   -- one statement per code part
//! end
//! return function(__state)
//!   return __render(__state)
//! end
//! ```

use std::fmt::Write as _;

use codet_core::config::consts::library;
use codet_core::handler::HandlerInput;
use codet_core::template::directive::{self, DirectiveKind};
use codet_core::template::parser::{BLOCK_END, BLOCK_START};
use codet_core::{CodetError, Result};

const KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

const PRELUDE: &str = r#"local __modules = ...
local __concat = table.concat
local __tostring = tostring
local __type = type
local __gmatch = string.gmatch

local function __import(path)
  local module = __modules[path]
  if module ~= nil then
    return module
  end
  local value = _G
  for segment in __gmatch(path, "[^%.]+") do
    if __type(value) ~= "table" then
      value = nil
      break
    end
    value = value[segment]
  end
  if value == nil then
    error("module '" .. path .. "' not found", 2)
  end
  return value
end
"#;

/// Prefix of every name the generated program defines for itself
const GENERATED_PREFIX: &str = "__";

/// True for a name Lua accepts as a local variable
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

/// True for a name template code may not rebind: generated helpers, the
/// environment and the support table
fn is_reserved(name: &str) -> bool {
    name.starts_with(GENERATED_PREFIX) || name == "_ENV" || name == library::SUPPORT
}

/// Quote `text` as a Lua string literal
pub fn lua_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(quoted, "\\{:03}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Local name an import binds to: the last dotted segment
fn import_binding(path: &str) -> Result<&str> {
    let binding = path.rsplit('.').next().unwrap_or(path);
    let usable = is_identifier(binding)
        && (!is_reserved(binding) || path == library::SUPPORT);
    if usable {
        Ok(binding)
    } else {
        Err(CodetError::invalid_argument(
            "imports",
            format!("import '{}' does not end in a usable Lua name", path),
        ))
    }
}

/// Render-function parameters and the matching arguments drawn from `__state`
fn parameters(input: &HandlerInput<'_>) -> Result<(Vec<String>, Vec<String>)> {
    if !input.is_property_mode() {
        let name = input.parameter_name.trim();
        if !is_identifier(name) || is_reserved(name) {
            return Err(CodetError::invalid_argument(
                "parameter_name",
                format!("'{}' is not a usable Lua identifier", name),
            ));
        }
        return Ok((vec![name.to_string()], vec!["__state".to_string()]));
    }

    let mut params = Vec::with_capacity(input.state_type.properties.len());
    let mut args = Vec::with_capacity(input.state_type.properties.len());
    for property in &input.state_type.properties {
        if !is_identifier(property) || is_reserved(property) {
            return Err(CodetError::invalid_argument(
                "state_type",
                format!(
                    "property '{}' of {} is not a usable Lua identifier",
                    property, input.state_type.name
                ),
            ));
        }
        params.push(property.clone());
        args.push(format!("__state[{}]", lua_quote(property)));
    }
    Ok((params, args))
}

/// Statement for one code part
fn translate_part(part: &str, out: &mut String) -> Result<()> {
    let is_code = part.starts_with(BLOCK_START) && part.ends_with(BLOCK_END);
    if !is_code {
        if !part.is_empty() {
            let _ = writeln!(out, "  __write({})", lua_quote(part));
        }
        return Ok(());
    }

    match directive::classify_text(part) {
        Some(DirectiveKind::Include) => {
            let name = directive::include_name(part).unwrap_or_default();
            let _ = writeln!(out, "  __write(codet.include({}))", lua_quote(name));
            return Ok(());
        }
        Some(DirectiveKind::Configuration) => {
            return Err(CodetError::invalid_argument(
                "code_parts",
                format!("configuration directive left in code parts: {}", part),
            ));
        }
        None => {}
    }

    let inner = &part[BLOCK_START.len()..part.len() - BLOCK_END.len()];
    match inner.strip_prefix('=') {
        Some(expression) => {
            let _ = writeln!(out, "  __write({})", expression.trim());
        }
        None => {
            let _ = writeln!(out, "  {}", inner.trim());
        }
    }
    Ok(())
}

/// Generate the program for `input`
///
/// # Errors
///
/// Returns `InvalidArgument` when the parameter name, a state property or the
/// last segment of an import is not a usable Lua identifier. Names starting
/// with `__`, `_ENV` and `codet` are reserved for the generated program.
pub fn generate(input: &HandlerInput<'_>) -> Result<String> {
    let (params, args) = parameters(input)?;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "-- codet template program ({}, state {})",
        input.language, input.state_type.name
    );
    out.push_str(PRELUDE);
    out.push('\n');

    for import in input.imports {
        let binding = import_binding(import)?;
        let _ = writeln!(out, "local {} = __import({})", binding, lua_quote(import));
    }
    if !input.imports.contains(library::SUPPORT) {
        let _ = writeln!(
            out,
            "local {0} = __import({1})",
            library::SUPPORT,
            lua_quote(library::SUPPORT)
        );
    }
    out.push('\n');

    let _ = writeln!(out, "local function __render({})", params.join(", "));
    out.push_str("  local __out = {}\n");
    out.push_str("  local function __write(value)\n");
    out.push_str("    if value ~= nil then\n");
    out.push_str("      __out[#__out + 1] = __tostring(value)\n");
    out.push_str("    end\n");
    out.push_str("  end\n");
    for part in input.code_parts {
        translate_part(part, &mut out)?;
    }
    out.push_str("  return __concat(__out)\n");
    out.push_str("end\n\n");

    out.push_str("return function(__state)\n");
    let _ = writeln!(out, "  return __render({})", args.join(", "));
    out.push_str("end\n");

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codet_core::StateType;
    use codet_core::template::parse;

    fn generate_for(source: &str, state_type: &StateType, parameter: &str) -> Result<String> {
        let unit = parse(source).unwrap();
        generate(&HandlerInput::from_unit(&unit, state_type, parameter))
    }

    fn page() -> StateType {
        StateType::new("Page", "app").with_properties(["title", "items"])
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(lua_quote("plain"), "\"plain\"");
        assert_eq!(lua_quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(lua_quote("l1\r\nl2\t"), "\"l1\\r\\nl2\\t\"");
        assert_eq!(lua_quote("\u{1}"), "\"\\001\"");
        assert_eq!(lua_quote("é"), "\"é\"");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("page"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("end"));
        assert!(!is_identifier("first-name"));
    }

    #[test]
    fn test_named_parameter_program() {
        let program = generate_for("Hello <%= page.title %>!", &page(), "page").unwrap();

        assert!(program.contains("local function __render(page)"));
        assert!(program.contains("  return __render(__state)"));
        assert!(program.contains("  __write(\"Hello \")"));
        assert!(program.contains("  __write(page.title)"));
        assert!(program.contains("  __write(\"!\")"));
    }

    #[test]
    fn test_property_parameters_program() {
        let program = generate_for("<%= title %>", &page(), "").unwrap();

        assert!(program.contains("local function __render(title, items)"));
        assert!(program.contains("return __render(__state[\"title\"], __state[\"items\"])"));
    }

    #[test]
    fn test_imports_bind_last_segment() {
        let program = generate_for("<%@ use string.format %>x", &page(), "page").unwrap();

        assert!(program.contains("local codet = __import(\"codet\")"));
        assert!(program.contains("local format = __import(\"string.format\")"));
        assert!(program.contains("local table = __import(\"table\")"));
    }

    #[test]
    fn test_statements_are_verbatim() {
        let program = generate_for("<% for i = 1, 3 do %>\n<%= i %>\n<% end %>", &page(), "page")
            .unwrap();

        assert!(program.contains("  for i = 1, 3 do\n"));
        assert!(program.contains("  __write(i)\n"));
        assert!(program.contains("  __write(\"\\n\")\n"));
        assert!(program.contains("  end\n"));
    }

    #[test]
    fn test_support_library_always_bound() {
        let mut unit = parse("<%@ include footer %>").unwrap();
        unit.imports.clear();
        let program = generate(&HandlerInput::from_unit(&unit, &page(), "page")).unwrap();
        assert!(program.contains("local codet = __import(\"codet\")"));
    }

    #[test]
    fn test_include_becomes_support_call() {
        let program = generate_for("<%@ include 'header' %>", &page(), "page").unwrap();
        assert!(program.contains("  __write(codet.include(\"header\"))"));
    }

    #[test]
    fn test_invalid_parameter_name() {
        let result = generate_for("x", &page(), "not valid");
        assert!(matches!(
            result,
            Err(CodetError::InvalidArgument {
                name: "parameter_name",
                ..
            })
        ));
    }

    #[test]
    fn test_import_without_usable_name() {
        for source in ["<%@ use no.such.end %>x", "<%@ use my-lib %>x", "<%@ use x.__out %>x"] {
            let result = generate_for(source, &page(), "page");
            assert!(
                matches!(result, Err(CodetError::InvalidArgument { name: "imports", .. })),
                "{source} was accepted"
            );
        }
    }

    #[test]
    fn test_reserved_names_are_rejected() {
        for property in ["__concat", "__write", "_ENV", "codet"] {
            let state = StateType::new("S", "app").with_properties([property]);
            let result = generate_for("hi", &state, "");
            assert!(
                matches!(result, Err(CodetError::InvalidArgument { name: "state_type", .. })),
                "{property} was accepted"
            );
        }

        let result = generate_for("hi", &page(), "__out");
        assert!(matches!(
            result,
            Err(CodetError::InvalidArgument {
                name: "parameter_name",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_property_name() {
        let state = StateType::new("Row", "app").with_properties(["first-name"]);
        let result = generate_for("x", &state, "");
        assert!(matches!(
            result,
            Err(CodetError::InvalidArgument {
                name: "state_type",
                ..
            })
        ));
    }
}
