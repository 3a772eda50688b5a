//! Qualified names: structured, parseable identifiers for every entity the
//! compiler knows about.
//!
//! A [`QualifiedName`] is a sequence of [`Segment`]s separated by `::`.
//! Each segment has a name, an optional list of qualifiers (used for generic
//! instantiations such as `unsafe::ptr[builtins::i32]`) and an optional
//! disambiguation suffix (`fn#2`).
//!
//! # Textual forms
//!
//! - **canonical**: `mod::dict[i32, f64]::foo#0`. Equality and hashing are
//!   defined exclusively on this form, and [`QualifiedName::parse`] is its exact
//!   inverse.
//! - **human**: like canonical, but the leading `builtins::` is dropped and
//!   `builtins::def[p0, ..., r]` renders as `def(p0, ...) -> r`.
//! - **mangled**: a flat C identifier, `spy_mod$dict__i32_f64$foo$0`.
//!
//! Mangling replaces `.` by `_` inside names and joins qualifiers with `_`,
//! so pathological names mixing the two (`a.b` vs `a_b`) can collide. Names
//! produced by the compiler itself never do.
//!
//! # Example
//!
//! ```
//! use spy_core::{QualifiedName, Segment};
//!
//! let qn = QualifiedName::new([
//!     Segment::new("mod"),
//!     Segment::with_qualifiers("dict", vec!["i32".parse().unwrap(), "f64".parse().unwrap()]),
//!     Segment::new("foo").suffixed("0"),
//! ]);
//! assert_eq!(qn.fullname(), "mod::dict[i32, f64]::foo#0");
//! assert_eq!(qn.mangled(), "spy_mod$dict__i32_f64$foo$0");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::QnParseError;
use crate::qn_parser::QnParser;

/// Name of the module whose prefix is hidden in human-readable names.
pub const ROOT_MODULE: &str = "builtins";

/// Prefix of every mangled identifier.
pub const MANGLE_PREFIX: &str = "spy_";

/// Returns true if `name` only uses the characters allowed in a segment name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// One `::`-separated part of a qualified name.
#[derive(Clone, PartialEq, Eq)]
pub struct Segment {
    name: String,
    qualifiers: Vec<QualifiedName>,
    suffix: Option<String>,
}

impl Segment {
    /// Create an unqualified segment.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_qualifiers(name, Vec::new())
    }

    /// Create a segment carrying generic qualifiers.
    pub fn with_qualifiers(name: impl Into<String>, qualifiers: Vec<QualifiedName>) -> Self {
        let name = name.into();
        debug_assert!(is_valid_name(&name), "invalid segment name {name:?}");
        Self {
            name,
            qualifiers,
            suffix: None,
        }
    }

    /// Return this segment with the given disambiguation suffix.
    ///
    /// An empty suffix is the same as no suffix.
    pub fn suffixed(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        self.suffix = (!suffix.is_empty()).then_some(suffix);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifiers(&self) -> &[QualifiedName] {
        &self.qualifiers
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    fn write(&self, out: &mut String, human: bool) {
        out.push_str(&self.name);
        if !self.qualifiers.is_empty() {
            out.push('[');
            for (i, q) in self.qualifiers.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if human {
                    out.push_str(&q.human_name());
                } else {
                    out.push_str(q.fullname());
                }
            }
            out.push(']');
        }
        if let Some(suffix) = &self.suffix {
            out.push('#');
            out.push_str(suffix);
        }
    }

    fn write_mangled(&self, out: &mut String) {
        out.push_str(&self.name.replace('.', "_"));
        if !self.qualifiers.is_empty() {
            out.push_str("__");
            for (i, q) in self.qualifiers.iter().enumerate() {
                if i > 0 {
                    out.push('_');
                }
                out.push_str(&q.mangled_plain());
            }
        }
        if let Some(suffix) = &self.suffix {
            out.push('$');
            out.push_str(suffix);
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out, false);
        f.write_str(&out)
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Segment({self})")
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Segment::new(name)
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Segment::new(name)
    }
}

/// A fully qualified name.
///
/// Immutable: [`join`](Self::join) and [`with_suffix`](Self::with_suffix)
/// build new names. The canonical string is computed once at construction.
#[derive(Clone)]
pub struct QualifiedName {
    segments: Vec<Segment>,
    fullname: String,
}

impl QualifiedName {
    /// Build a name from explicit segments.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        let segments: Vec<Segment> = segments.into_iter().map(Into::into).collect();
        assert!(
            !segments.is_empty(),
            "a qualified name needs at least one segment"
        );
        let mut fullname = String::new();
        for (i, seg) in segments.iter().enumerate() {
            if i > 0 {
                fullname.push_str("::");
            }
            seg.write(&mut fullname, false);
        }
        Self { segments, fullname }
    }

    /// Parse the canonical textual form.
    pub fn parse(text: &str) -> Result<Self, QnParseError> {
        QnParser::new(text)?.parse()
    }

    /// A name nested inside this one.
    pub fn join(&self, name: impl Into<String>, qualifiers: Vec<QualifiedName>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::with_qualifiers(name, qualifiers));
        Self::new(segments)
    }

    /// A copy of this name whose last segment carries `suffix`.
    pub fn with_suffix(&self, suffix: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.pop() {
            segments.push(last.suffixed(suffix));
        }
        Self::new(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Canonical form, e.g. `mod::dict[i32, f64]::foo#0`.
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// Human-readable form used in diagnostics.
    pub fn human_name(&self) -> String {
        if let Some(sig) = self.human_def_signature() {
            return sig;
        }
        let skip = usize::from(self.segments.len() > 1 && self.modname() == ROOT_MODULE);
        let mut out = String::new();
        for (i, seg) in self.segments.iter().skip(skip).enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            seg.write(&mut out, true);
        }
        out
    }

    /// `builtins::def[p0, ..., r]` is rendered as `def(p0, ...) -> r`, and
    /// `builtins::blue_def[...]` as `@blue def(p0, ...) -> r`.
    fn human_def_signature(&self) -> Option<String> {
        let [module, def] = self.segments.as_slice() else {
            return None;
        };
        if module.to_string() != ROOT_MODULE {
            return None;
        }
        let prefix = match def.name.as_str() {
            "def" => "",
            "blue_def" => "@blue ",
            _ => return None,
        };
        let (ret, params) = def.qualifiers.split_last()?;
        let params: Vec<String> = params.iter().map(QualifiedName::human_name).collect();
        Some(format!(
            "{prefix}def({}) -> {}",
            params.join(", "),
            ret.human_name()
        ))
    }

    /// Flat C identifier, e.g. `spy_mod$dict__i32_f64$foo$0`.
    pub fn mangled(&self) -> String {
        format!("{MANGLE_PREFIX}{}", self.mangled_plain())
    }

    /// Like [`mangled`](Self::mangled) without the `spy_` prefix.
    pub fn mangled_plain(&self) -> String {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('$');
            }
            seg.write_mangled(&mut out);
        }
        out
    }

    /// The module: rendering of the first segment.
    pub fn modname(&self) -> String {
        self.segments[0].to_string()
    }

    /// Everything but the last segment, or `None` for a module name.
    pub fn namespace(&self) -> Option<QualifiedName> {
        let (_, init) = self.segments.split_last()?;
        (!init.is_empty()).then(|| QualifiedName::new(init.to_vec()))
    }

    /// Rendering of the last segment.
    pub fn symbol_name(&self) -> String {
        self.last().to_string()
    }

    /// Suffix of the last segment.
    pub fn suffix(&self) -> Option<&str> {
        self.last().suffix()
    }

    pub fn is_module(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn is_object(&self) -> bool {
        !self.is_module()
    }

    fn last(&self) -> &Segment {
        // non-empty by construction
        &self.segments[self.segments.len() - 1]
    }
}

impl PartialEq for QualifiedName {
    fn eq(&self, other: &Self) -> bool {
        self.fullname == other.fullname
    }
}

impl Eq for QualifiedName {}

impl Hash for QualifiedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fullname.hash(state);
    }
}

impl PartialOrd for QualifiedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QualifiedName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fullname.cmp(&other.fullname)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname)
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QN({:?})", self.fullname)
    }
}

impl FromStr for QualifiedName {
    type Err = QnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
