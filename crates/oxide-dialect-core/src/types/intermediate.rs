//! The resolved type of one SQL value.

use core::fmt;

use serde::Serialize;

use super::ansi::AnsiType;
use super::dialect_type::{Affinity, NativeType, TypeRef};

/// A dialect type plus nullability and an optional column name.
///
/// Values are immutable; the `as_*`/`with_*` methods return modified copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateType {
    kind: TypeRef,
    name: Option<String>,
    nullable: bool,
}

impl IntermediateType {
    /// Creates a non-null type of the given kind.
    #[must_use]
    pub const fn new(kind: TypeRef) -> Self {
        Self {
            kind,
            name: None,
            nullable: false,
        }
    }

    /// Creates a nullable type of the given kind.
    #[must_use]
    pub const fn nullable(kind: TypeRef) -> Self {
        Self {
            kind,
            name: None,
            nullable: true,
        }
    }

    /// Creates a non-null baseline type.
    #[must_use]
    pub fn ansi(kind: AnsiType) -> Self {
        Self::new(kind.type_ref())
    }

    /// The type of an unbound parameter nothing constrains.
    #[must_use]
    pub fn argument() -> Self {
        Self::ansi(AnsiType::Argument)
    }

    /// The type of the `NULL` literal.
    #[must_use]
    pub fn null() -> Self {
        Self::nullable(AnsiType::Null.type_ref())
    }

    /// The dialect variant.
    #[must_use]
    pub const fn kind(&self) -> TypeRef {
        self.kind
    }

    /// The column name this type was declared under, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the value may be `NULL`.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The wire affinity of the kind, `None` for placeholders.
    #[must_use]
    pub fn affinity(&self) -> Option<Affinity> {
        self.kind.affinity()
    }

    /// Whether the kind is the given baseline variant.
    #[must_use]
    pub fn is(&self, kind: AnsiType) -> bool {
        self.kind == kind.type_ref()
    }

    /// Returns a copy that may be `NULL`.
    #[must_use]
    pub fn as_nullable(self) -> Self {
        self.with_nullable(true)
    }

    /// Returns a copy that is never `NULL`.
    #[must_use]
    pub fn as_non_null(self) -> Self {
        self.with_nullable(false)
    }

    /// Returns a copy with the given nullability.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Returns a copy carrying a column name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns a copy without the column name.
    #[must_use]
    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Changes the nullability in place.
    pub const fn set_nullable(&mut self, nullable: bool) {
        self.nullable = nullable;
    }

    /// Renames in place.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Returns a copy with the kind replaced.
    #[must_use]
    pub fn with_kind(mut self, kind: TypeRef) -> Self {
        self.kind = kind;
        self
    }

    /// Returns the serializable descriptor handed to code emitters.
    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor {
            dialect: self.kind.dialect(),
            sql_type: self.kind.name(),
            affinity: self.kind.affinity(),
            native: self.kind.native(),
            nullable: self.nullable,
            name: self.name.clone(),
        }
    }
}

impl From<TypeRef> for IntermediateType {
    fn from(kind: TypeRef) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for IntermediateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// What an external code emitter needs to know about a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    /// Dialect declaring the variant.
    pub dialect: &'static str,
    /// SQL name of the variant.
    pub sql_type: &'static str,
    /// Wire storage class.
    pub affinity: Option<Affinity>,
    /// Host representation.
    pub native: Option<NativeType>,
    /// Whether the value may be `NULL`.
    pub nullable: bool,
    /// Declared column name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
