//! Builder usage errors.
//!
//! A fluent chain cannot abort halfway, so these are recorded on the builder
//! instead of being returned. Callers inspect them with
//! [`QueryBuilder::errors`](crate::QueryBuilder::errors).

/// What went wrong while building a CASE expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderErrorKind {
    /// `When` on a generic CASE without the field to compare.
    GenericCaseFieldMissing,
    /// `When`/`Then` called with a null value.
    NoValue,
    /// `Then` called before a successful `When`.
    ThenBeforeWhen,
    /// `End` called before both `When` and `Then` succeeded.
    EndBeforeWhenThen,
    /// `When`/`Then`/`Else`/`End` without an open `Case`.
    CaseNotOpen,
}

impl BuilderErrorKind {
    /// Stable numeric code.
    pub fn code(self) -> u16 {
        match self {
            Self::GenericCaseFieldMissing => 1200,
            Self::NoValue => 1201,
            Self::ThenBeforeWhen => 1202,
            Self::EndBeforeWhenThen => 1203,
            Self::CaseNotOpen => 1204,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::GenericCaseFieldMissing => "field is missing on generic case",
            Self::NoValue => "no value given",
            Self::ThenBeforeWhen => "CASE method \"Then\" called before \"When\"",
            Self::EndBeforeWhenThen => "CASE method \"End\" called before \"When\" or \"Then\"",
            Self::CaseNotOpen => "CASE method called before \"Case\"",
        }
    }
}

/// A usage error recorded by the builder method that detected it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} (in `{method}`, code {})", .kind.message(), .kind.code())]
pub struct BuilderError {
    pub kind: BuilderErrorKind,
    /// Name of the builder method, e.g. `"then"`.
    pub method: &'static str,
}

impl BuilderError {
    pub fn new(kind: BuilderErrorKind, method: &'static str) -> Self {
        Self { kind, method }
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(BuilderErrorKind::GenericCaseFieldMissing.code(), 1200);
        assert_eq!(BuilderErrorKind::NoValue.code(), 1201);
        assert_eq!(BuilderErrorKind::ThenBeforeWhen.code(), 1202);
        assert_eq!(BuilderErrorKind::EndBeforeWhenThen.code(), 1203);
        assert_eq!(BuilderErrorKind::CaseNotOpen.code(), 1204);
    }

    #[test]
    fn display_names_the_method() {
        let err = BuilderError::new(BuilderErrorKind::ThenBeforeWhen, "then");
        let text = err.to_string();
        assert!(text.contains("\"Then\" called before \"When\""));
        assert!(text.contains("`then`"));
        assert!(text.contains("1202"));
    }
}
