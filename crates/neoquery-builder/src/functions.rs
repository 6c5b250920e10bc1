//! List predicates and scalar functions rendered as query fragments.
//!
//! Pure functions: the builder appends their output, but they can also be
//! used directly inside `return_` or `where_` expressions.

/// Variable name used when a predicate is called without one.
const DEFAULT_PREDICATE_VARIABLE: &str = "item";

/// List predicate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    All,
    Any,
    None,
    Single,
}

impl Predicate {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Any => "ANY",
            Self::None => "NONE",
            Self::Single => "SINGLE",
        }
    }
}

/// Renders ` ALL (x IN list WHERE x.predicate)`.
///
/// The predicate is written relative to the variable, so `"age > 30"`
/// becomes `x.age > 30`. Returns an empty string when `list` is empty.
pub fn predicate(kind: Predicate, variable: &str, list: &str, predicate: &str) -> String {
    if list.is_empty() {
        return String::new();
    }
    let variable = if variable.is_empty() {
        DEFAULT_PREDICATE_VARIABLE
    } else {
        variable
    };

    let mut out = format!(" {} ({variable} IN {list}", kind.keyword());
    if !predicate.is_empty() {
        out.push_str(&format!(" WHERE {variable}.{predicate}"));
    }
    out.push(')');
    out
}

/// Renders ` EXISTS (pattern)` with an optional ` AS name`.
pub fn exists(pattern: &str, as_name: Option<&str>) -> String {
    if pattern.is_empty() {
        return String::new();
    }
    let mut out = format!(" EXISTS ({pattern})");
    push_alias(&mut out, as_name);
    out
}

/// Argument of [`size`]: a pattern/expression or a literal list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeOf {
    Pattern(String),
    List(Vec<String>),
}

impl From<&str> for SizeOf {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_owned())
    }
}

impl From<Vec<String>> for SizeOf {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for SizeOf {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(str::to_owned).collect())
    }
}

/// Renders ` SIZE (pattern)` or ` SIZE ([a, b])` with an optional ` AS name`.
/// Returns an empty string for an empty pattern or list.
pub fn size(of: &SizeOf, as_name: Option<&str>) -> String {
    let inner = match of {
        SizeOf::Pattern(p) if !p.is_empty() => p.clone(),
        SizeOf::List(items) if !items.is_empty() => format!("[{}]", items.join(", ")),
        _ => return String::new(),
    };
    let mut out = format!(" SIZE ({inner})");
    push_alias(&mut out, as_name);
    out
}

fn push_alias(out: &mut String, as_name: Option<&str>) {
    if let Some(name) = as_name
        && !name.is_empty()
    {
        out.push_str(" AS ");
        out.push_str(name);
    }
}
