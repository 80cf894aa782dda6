// CrashSleuth - core/strings.rs
//
// Message template storage and positional formatting.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::registry_mgr which feeds content here.

use crate::util::error::StringsError;
use std::collections::HashMap;
use std::path::Path;

/// Source of message templates, keyed by "{namespace}.{key}".
pub trait TemplateStore: Send + Sync {
    /// Template for a namespaced key, if the store has one.
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Template for a namespaced key, or `fallback` when unresolved.
    fn resolve<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(fallback)
    }
}

/// Template table loaded from TOML, one table per namespace:
///
/// ```toml
/// [error]
/// need_new_java = "You need Java {}."
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    templates: HashMap<String, String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document into a table.
    ///
    /// `source_path` is used for error messages only (not for I/O).
    pub fn from_toml(content: &str, source_path: &Path) -> Result<Self, StringsError> {
        let root: toml::Table = toml::from_str(content).map_err(|e| StringsError::TomlParse {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        let mut templates = HashMap::new();
        for (namespace, value) in root {
            let toml::Value::Table(table) = value else {
                return Err(StringsError::NotAString {
                    path: source_path.to_path_buf(),
                    key: namespace,
                });
            };
            for (key, value) in table {
                let full_key = format!("{namespace}.{key}");
                match value {
                    toml::Value::String(template) => {
                        templates.insert(full_key, template);
                    }
                    _ => {
                        return Err(StringsError::NotAString {
                            path: source_path.to_path_buf(),
                            key: full_key,
                        })
                    }
                }
            }
        }
        Ok(Self { templates })
    }

    /// The English templates embedded in the binary.
    pub fn builtin() -> Self {
        let path = Path::new("<builtin>/strings.toml");
        match Self::from_toml(BUILTIN_STRINGS, path) {
            Ok(table) => table,
            Err(e) => {
                // A broken built-in table is a bug; report raw keys instead.
                tracing::error!(error = %e, "Failed to load built-in strings");
                Self::new()
            }
        }
    }

    /// Overlay `other` on top of this table; its keys win.
    pub fn merge(&mut self, other: StringTable) {
        self.templates.extend(other.templates);
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for StringTable {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }
}

/// Embedded TOML content for the built-in templates.
pub const BUILTIN_STRINGS: &str = include_str!("../../assets/strings.toml");

/// Substitute positional arguments into a brace template.
///
/// `{}` takes the next argument, `{N}` takes argument N, `{{` and `}}` are
/// literal braces. Placeholders without a matching argument are kept as-is.
pub fn format_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_auto = 0;
    let mut rest = template;

    while let Some(pos) = rest.find(&['{', '}'][..]) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(close) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        let field = &tail[1..close];
        let index = if field.is_empty() {
            next_auto += 1;
            Some(next_auto - 1)
        } else {
            field.parse::<usize>().ok()
        };
        match index.and_then(|idx| args.get(idx)) {
            Some(arg) => out.push_str(arg),
            None => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    out
}
