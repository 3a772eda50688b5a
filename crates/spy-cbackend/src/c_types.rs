//! C-level names for types and function signatures.

use std::fmt;

/// A C type as it is spelled in declarations, e.g. `int32_t` or `spy_Str *`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CType(String);

impl CType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFuncParam {
    pub name: String,
    pub c_type: CType,
}

/// A C function prototype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFunction {
    pub name: String,
    pub params: Vec<CFuncParam>,
    pub restype: CType,
}

impl CFunction {
    /// `<restype> <name>(<params>)`, with `void` for an empty parameter list.
    pub fn decl(&self) -> String {
        let params = if self.params.is_empty() {
            "void".to_string()
        } else {
            self.params
                .iter()
                .map(|p| format!("{} {}", p.c_type, p.name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("{} {}({})", self.restype, self.name, params)
    }
}
