//! SQL type names as written in column definitions and casts.

use core::fmt;

use crate::lexer::Span;

/// A column type as written in source.
///
/// The parser does not interpret type names: `name` holds the uppercased
/// words (`DOUBLE PRECISION`, `VARCHAR`) and `args` the raw text of any
/// parenthesized arguments (`255`, `10`, `2`). Deciding what a name means is
/// left to the active dialect's resolver chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Uppercased type words joined by single spaces.
    pub name: String,
    /// Raw argument text, one entry per comma-separated argument.
    pub args: Vec<String>,
    /// Source span covering the name and its arguments.
    pub span: Span,
}

impl TypeName {
    /// Creates a type name without arguments.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: normalize(name.as_ref()),
            args: Vec::new(),
            span: Span::default(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Returns true if the name matches, ignoring case and spacing.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name == normalize(name)
    }

    /// Returns the first argument parsed as an integer, if any.
    #[must_use]
    pub fn size(&self) -> Option<u32> {
        self.args.first().and_then(|a| a.trim().parse().ok())
    }

    /// Returns the SQL representation of the type.
    #[must_use]
    pub fn to_sql(&self) -> String {
        if self.args.is_empty() {
            self.name.clone()
        } else {
            format!("{}({})", self.name, self.args.join(", "))
        }
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_name() {
        let ty = TypeName::new("double   precision");
        assert_eq!(ty.name, "DOUBLE PRECISION");
        assert!(ty.is("Double Precision"));
    }

    #[test]
    fn test_to_sql_with_args() {
        let ty = TypeName::new("decimal").with_arg("10").with_arg("2");
        assert_eq!(ty.to_sql(), "DECIMAL(10, 2)");
        assert_eq!(ty.size(), Some(10));
        assert_eq!(TypeName::new("text").size(), None);
    }
}
