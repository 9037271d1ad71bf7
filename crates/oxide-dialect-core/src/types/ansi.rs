//! Baseline type variants shared by every dialect.

use super::dialect_type::{Affinity, DialectType, NativeType, TypeRef};

/// The dialect name reported by baseline variants.
pub const ANSI: &str = "ansi";

/// Platform-independent primitives every resolver chain bottoms out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiType {
    /// An unbound parameter whose type could not be inferred.
    Argument,
    /// The type of the `NULL` literal.
    Null,
    /// 64-bit integer.
    Integer,
    /// 64-bit float.
    Real,
    /// Text.
    Text,
    /// Bytes.
    Blob,
    /// Truth value stored as 0/1.
    Boolean,
}

impl AnsiType {
    /// Returns a static reference usable as an `IntermediateType` kind.
    #[must_use]
    pub fn type_ref(self) -> TypeRef {
        match self {
            Self::Argument => &Self::Argument,
            Self::Null => &Self::Null,
            Self::Integer => &Self::Integer,
            Self::Real => &Self::Real,
            Self::Text => &Self::Text,
            Self::Blob => &Self::Blob,
            Self::Boolean => &Self::Boolean,
        }
    }

    /// Maps an affinity to its baseline variant.
    #[must_use]
    pub const fn for_affinity(affinity: Affinity) -> Self {
        match affinity {
            Affinity::Integer => Self::Integer,
            Affinity::Real => Self::Real,
            Affinity::Text => Self::Text,
            Affinity::Blob => Self::Blob,
        }
    }
}

impl DialectType for AnsiType {
    fn name(&self) -> &'static str {
        match self {
            Self::Argument => "ARGUMENT",
            Self::Null => "NULL",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
        }
    }

    fn dialect(&self) -> &'static str {
        ANSI
    }

    fn affinity(&self) -> Option<Affinity> {
        match self {
            Self::Argument | Self::Null => None,
            Self::Integer | Self::Boolean => Some(Affinity::Integer),
            Self::Real => Some(Affinity::Real),
            Self::Text => Some(Affinity::Text),
            Self::Blob => Some(Affinity::Blob),
        }
    }

    fn native(&self) -> Option<NativeType> {
        match self {
            Self::Argument | Self::Null => None,
            Self::Integer => Some(NativeType::I64),
            Self::Real => Some(NativeType::F64),
            Self::Text => Some(NativeType::String),
            Self::Blob => Some(NativeType::Bytes),
            Self::Boolean => Some(NativeType::Bool),
        }
    }
}

/// The default preference order used when unifying candidate types.
pub const PREFERENCE_ORDER: &[TypeRef] = &[
    &AnsiType::Integer,
    &AnsiType::Real,
    &AnsiType::Text,
    &AnsiType::Blob,
];

/// The preference order for arithmetic results.
pub const NUMERIC_ORDER: &[TypeRef] = &[&AnsiType::Integer, &AnsiType::Real];
