use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Configuration for which rewrite passes to run.
///
/// All passes are enabled by default. Disable individual passes by setting
/// their fields to `false`, or use `from_skip_list` with pass name strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassConfig {
    /// Memoize reactive blocks found by the IR analysis.
    pub ir_blocks: bool,
    /// Wrap expensive method-call initializers in place.
    pub direct_rewrite: bool,
    /// Add the memo primitive to the module's runtime import.
    pub imports: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            ir_blocks: true,
            direct_rewrite: true,
            imports: true,
        }
    }
}

impl PassConfig {
    /// Create a config with all passes enabled except those in the skip list.
    ///
    /// Pass names:
    /// - `"ir-blocks"`
    /// - `"direct-rewrite"`
    /// - `"imports"`
    pub fn from_skip_list(skip: &[&str]) -> Self {
        let mut config = Self::default();
        for name in skip {
            match *name {
                "ir-blocks" => config.ir_blocks = false,
                "direct-rewrite" => config.direct_rewrite = false,
                "imports" => config.imports = false,
                _ => {}
            }
        }
        config
    }
}

/// Names and tables the analysis and codegen are parameterized over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoConfig {
    /// Module the memo and state primitives are imported from.
    pub runtime_module: String,
    pub memo_primitive: String,
    pub state_primitive: String,
    /// Callee names whose last segment starts with this are hooks.
    pub hook_prefix: String,
    /// Method names that make a call expensive.
    pub expensive_methods: Vec<String>,
    /// Dotted callee names; a call is expensive when its callee contains the
    /// part before the first `.` of any of them.
    pub expensive_callees: Vec<String>,
    /// Identifiers never reported as dependencies by the direct rewrite.
    pub free_ident_blacklist: Vec<String>,
    pub passes: PassConfig,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            runtime_module: "react".into(),
            memo_primitive: "useMemo".into(),
            state_primitive: "useState".into(),
            hook_prefix: "use".into(),
            expensive_methods: ["map", "filter", "reduce", "sort", "find", "findIndex"]
                .map(String::from)
                .to_vec(),
            expensive_callees: ["Math.sqrt", "Math.pow", "Math.sin", "Math.cos"]
                .map(String::from)
                .to_vec(),
            free_ident_blacklist: [
                "Math",
                "console",
                "JSON",
                "Object",
                "Array",
                "String",
                "Number",
                "Boolean",
                "Date",
                "Promise",
                "undefined",
                "NaN",
                "Infinity",
                "window",
                "document",
                "globalThis",
            ]
            .map(String::from)
            .to_vec(),
            passes: PassConfig::default(),
        }
    }
}

impl MemoConfig {
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn is_expensive_method(&self, name: &str) -> bool {
        self.expensive_methods.iter().any(|m| m == name)
    }

    /// Whether a resolved callee name matches one of the expensive callee
    /// tokens (`Math.sqrt` contributes `Math`).
    pub fn is_expensive_callee(&self, callee: &str) -> bool {
        self.expensive_callees.iter().any(|c| {
            let token = c.split('.').next().unwrap_or(c);
            !token.is_empty() && callee.contains(token)
        })
    }

    /// Whether a resolved callee name follows the hook naming convention.
    /// The whole dotted name is tested, so `React.useState` is not a hook.
    pub fn is_hook(&self, callee: &str) -> bool {
        callee.starts_with(&self.hook_prefix)
    }

    pub fn is_blacklisted(&self, ident: &str) -> bool {
        self.free_ident_blacklist.iter().any(|b| b == ident)
    }
}
