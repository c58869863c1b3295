//! Parser options.
//!
//! Options deserialize from the camelCase JSON shape used by Babylon
//! configuration files. Every field is optional.

use esparse_ast::SourceType;
use serde::Deserialize;

/// Default limit on syntactic nesting.
///
/// Sized so an unoptimized build stays within a 2 MiB thread stack. Each
/// level costs several parser frames; optimized builds can afford a much
/// higher limit through `max_nesting_depth`.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserOptions {
    pub source_type: SourceType,
    /// Accept `import`/`export` in nested positions.
    pub allow_import_export_everywhere: bool,
    pub allow_return_outside_function: bool,
    pub allow_super_outside_method: bool,
    /// `None` infers strictness from the source type.
    pub strict_mode: Option<bool>,
    pub source_filename: Option<String>,
    /// Extension names, in the order they are applied.
    pub plugins: Vec<String>,
    pub max_nesting_depth: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            source_type: SourceType::Script,
            allow_import_export_everywhere: false,
            allow_return_outside_function: false,
            allow_super_outside_method: false,
            strict_mode: None,
            source_filename: None,
            plugins: Vec::new(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ParserOptions {
    /// Options for module code.
    pub fn module() -> Self {
        Self {
            source_type: SourceType::Module,
            ..Self::default()
        }
    }

    /// Add an extension by name.
    pub fn with_plugin(mut self, name: &str) -> Self {
        self.plugins.push(name.to_string());
        self
    }

    pub fn is_module(&self) -> bool {
        self.source_type == SourceType::Module
    }

    /// Whether parsing starts in strict mode.
    pub fn is_strict(&self) -> bool {
        self.strict_mode.unwrap_or_else(|| self.is_module())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParserOptions::default();
        assert_eq!(options.source_type, SourceType::Script);
        assert!(!options.is_strict());
        assert!(ParserOptions::module().is_strict());
        assert_eq!(options.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_strict_mode_overrides_source_type() {
        let options = ParserOptions {
            strict_mode: Some(false),
            ..ParserOptions::module()
        };
        assert!(!options.is_strict());
    }
}
