//! The `DialectType` contract shared by every dialect's type variants.

use core::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;

use super::codec;

/// The storage class a value travels as between the engine and the database.
///
/// Every bind and read goes through exactly one of these four primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Affinity {
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Real,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
}

impl Affinity {
    /// Returns the affinity name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }
}

/// The host-side representation a type decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeType {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// Exact decimal kept as its canonical text.
    Decimal,
    /// `String`
    String,
    /// `Vec<u8>`
    Bytes,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time without zone.
    Timestamp,
}

impl NativeType {
    /// Returns how general this representation is among those sharing its
    /// wire affinity. A higher value can hold every value of a lower one.
    #[must_use]
    pub const fn generality(&self) -> u8 {
        match self {
            Self::Bool => 0,
            Self::I8 | Self::F32 | Self::Bytes | Self::Date | Self::Time | Self::Decimal => 1,
            Self::I16 | Self::F64 | Self::Timestamp => 2,
            Self::I32 | Self::String => 3,
            Self::I64 => 4,
        }
    }

    /// Returns the lowercase name used in type descriptors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value as the database driver sends or receives it.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// Integer storage.
    Integer(i64),
    /// Floating-point storage.
    Real(f64),
    /// Text storage.
    Text(String),
    /// Blob storage.
    Blob(Vec<u8>),
}

impl WireValue {
    /// Returns the storage class of the value.
    #[must_use]
    pub const fn affinity(&self) -> Affinity {
        match self {
            Self::Integer(_) => Affinity::Integer,
            Self::Real(_) => Affinity::Real,
            Self::Text(_) => Affinity::Text,
            Self::Blob(_) => Affinity::Blob,
        }
    }
}

/// A value in its host-side representation.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// Decimal text such as `-12.50`.
    Decimal(String),
    /// `String`
    String(String),
    /// `Vec<u8>`
    Bytes(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
}

impl NativeValue {
    /// Returns the representation this value is in.
    #[must_use]
    pub const fn native_type(&self) -> NativeType {
        match self {
            Self::Bool(_) => NativeType::Bool,
            Self::I8(_) => NativeType::I8,
            Self::I16(_) => NativeType::I16,
            Self::I32(_) => NativeType::I32,
            Self::I64(_) => NativeType::I64,
            Self::F32(_) => NativeType::F32,
            Self::F64(_) => NativeType::F64,
            Self::Decimal(_) => NativeType::Decimal,
            Self::String(_) => NativeType::String,
            Self::Bytes(_) => NativeType::Bytes,
            Self::Date(_) => NativeType::Date,
            Self::Time(_) => NativeType::Time,
            Self::Timestamp(_) => NativeType::Timestamp,
        }
    }
}

/// Failure to convert between wire and native values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The wire value has a storage class the type does not read.
    #[error("{type_name} cannot decode a {found} wire value")]
    WireMismatch {
        /// The dialect type doing the conversion.
        type_name: &'static str,
        /// The storage class that was supplied.
        found: &'static str,
    },
    /// The native value is not in the type's representation.
    #[error("{type_name} cannot encode a {found} value")]
    NativeMismatch {
        /// The dialect type doing the conversion.
        type_name: &'static str,
        /// The representation that was supplied.
        found: NativeType,
    },
    /// The value does not fit the type's representation.
    #[error("{value} is out of range for {type_name}")]
    OutOfRange {
        /// The dialect type doing the conversion.
        type_name: &'static str,
        /// The offending value.
        value: String,
    },
    /// Text that should hold a decimal or temporal value does not parse.
    #[error("malformed {type_name} value {value:?}")]
    Malformed {
        /// The dialect type doing the conversion.
        type_name: &'static str,
        /// The offending text.
        value: String,
    },
}

/// The driver call used to bind an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BindOp {
    /// The bind primitive.
    pub primitive: Affinity,
    /// The 1-based argument index.
    pub index: usize,
}

impl BindOp {
    /// Returns the driver method name (`bind_integer`, `bind_text`, ...).
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self.primitive {
            Affinity::Integer => "bind_integer",
            Affinity::Real => "bind_real",
            Affinity::Text => "bind_text",
            Affinity::Blob => "bind_blob",
        }
    }
}

/// The driver call used to read a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadOp {
    /// The read primitive.
    pub primitive: Affinity,
    /// The 0-based column index.
    pub index: usize,
}

impl ReadOp {
    /// Returns the driver method name (`get_integer`, `get_text`, ...).
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self.primitive {
            Affinity::Integer => "get_integer",
            Affinity::Real => "get_real",
            Affinity::Text => "get_text",
            Affinity::Blob => "get_blob",
        }
    }
}

/// One variant of a dialect's closed set of column types.
///
/// A variant fixes its wire affinity and native representation; decoding,
/// encoding, binding and reading all follow from those two facts. Narrow
/// variants (a one-byte integer, a boolean stored as 0/1) share the integer
/// bind/read primitive but decode into their own representation.
///
/// `ARGUMENT` and `NULL` placeholders have no affinity. Asking them to bind,
/// read, decode or encode is a bug in the calling dialect and panics.
pub trait DialectType: fmt::Debug + Send + Sync {
    /// The SQL name of the variant (`TINYINT`, `BOOLEAN`, ...).
    fn name(&self) -> &'static str;

    /// The dialect that declares the variant.
    fn dialect(&self) -> &'static str;

    /// The wire storage class, or `None` for placeholders.
    fn affinity(&self) -> Option<Affinity>;

    /// The host representation, or `None` for placeholders.
    fn native(&self) -> Option<NativeType>;

    /// Converts a wire value into the native representation.
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if the wire value is outside the variant's domain.
    fn decode(&self, wire: &WireValue) -> Result<NativeValue, CodecError> {
        codec::decode(self.name(), self.codec_native(), wire)
    }

    /// Converts a native value into its wire representation.
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` if the value is not in the variant's representation.
    fn encode(&self, value: &NativeValue) -> Result<WireValue, CodecError> {
        codec::encode(self.name(), self.codec_native(), value)
    }

    /// Describes the driver call binding this type at `index`.
    fn bind(&self, index: usize) -> BindOp {
        BindOp {
            primitive: self.wire_affinity(),
            index,
        }
    }

    /// Describes the driver call reading this type from column `index`.
    fn read(&self, index: usize) -> ReadOp {
        ReadOp {
            primitive: self.wire_affinity(),
            index,
        }
    }

    /// The affinity of a variant that must have one.
    ///
    /// # Panics
    ///
    /// Panics for placeholder variants.
    fn wire_affinity(&self) -> Affinity {
        self.affinity().unwrap_or_else(|| {
            panic!(
                "{} type {} has no wire mapping",
                self.dialect(),
                self.name()
            )
        })
    }

    /// The native representation of a variant that must have one.
    ///
    /// # Panics
    ///
    /// Panics for placeholder variants.
    fn codec_native(&self) -> NativeType {
        self.native().unwrap_or_else(|| {
            panic!(
                "{} type {} has no native representation",
                self.dialect(),
                self.name()
            )
        })
    }
}

impl PartialEq for dyn DialectType {
    fn eq(&self, other: &Self) -> bool {
        self.dialect() == other.dialect() && self.name() == other.name()
    }
}

impl Eq for dyn DialectType {}

/// A reference to a statically known dialect type variant.
pub type TypeRef = &'static dyn DialectType;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generality_within_affinity() {
        assert!(NativeType::I64.generality() > NativeType::I32.generality());
        assert!(NativeType::I32.generality() > NativeType::I8.generality());
        assert!(NativeType::I8.generality() > NativeType::Bool.generality());
        assert!(NativeType::F64.generality() > NativeType::F32.generality());
        assert!(NativeType::String.generality() > NativeType::Timestamp.generality());
    }

    #[test]
    fn test_bind_and_read_method_names() {
        let bind = BindOp {
            primitive: Affinity::Text,
            index: 2,
        };
        assert_eq!(bind.method(), "bind_text");
        let read = ReadOp {
            primitive: Affinity::Integer,
            index: 0,
        };
        assert_eq!(read.method(), "get_integer");
    }

    #[test]
    fn test_codec_error_messages() {
        let err = CodecError::OutOfRange {
            type_name: "TINYINT",
            value: String::from("300"),
        };
        assert_eq!(err.to_string(), "300 is out of range for TINYINT");
    }
}
