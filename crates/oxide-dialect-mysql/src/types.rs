//! MySQL column types.

use oxide_dialect_core::ast::TypeName;
use oxide_dialect_core::types::{Affinity, DialectType, NativeType, wire_affinity};

/// The dialect name reported by MySQL variants.
pub const MYSQL: &str = "mysql";

/// The closed set of MySQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MySqlType {
    /// `TINYINT`, one byte.
    TinyInt,
    /// `TINYINT(1)`, `BOOL`, `BOOLEAN`, `BIT`: 0/1 in an integer column.
    Boolean,
    /// `SMALLINT`, two bytes.
    SmallInt,
    /// `MEDIUMINT`, three bytes, read as four.
    MediumInt,
    /// `INT`, `INTEGER`.
    Int,
    /// `BIGINT`.
    BigInt,
    /// `FLOAT`, single precision.
    Float,
    /// `DOUBLE`, `REAL`, `DOUBLE PRECISION`.
    Double,
    /// `DECIMAL`, `NUMERIC`: exact, kept as text.
    Decimal,
    /// `CHAR`.
    Char,
    /// `VARCHAR`.
    VarChar,
    /// `TEXT` and its sized variants, `ENUM`, `SET`.
    Text,
    /// `BINARY`, `VARBINARY`.
    Binary,
    /// `BLOB` and its sized variants.
    Blob,
    /// `DATE`.
    Date,
    /// `TIME`.
    Time,
    /// `DATETIME`.
    DateTime,
    /// `TIMESTAMP`.
    Timestamp,
    /// `YEAR`.
    Year,
    /// `JSON`.
    Json,
}

impl MySqlType {
    /// Every variant.
    pub const ALL: [Self; 20] = [
        Self::TinyInt,
        Self::Boolean,
        Self::SmallInt,
        Self::MediumInt,
        Self::Int,
        Self::BigInt,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Char,
        Self::VarChar,
        Self::Text,
        Self::Binary,
        Self::Blob,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::Timestamp,
        Self::Year,
        Self::Json,
    ];

    /// Returns a static reference usable as an `IntermediateType` kind.
    #[must_use]
    pub fn type_ref(self) -> &'static dyn DialectType {
        match self {
            Self::TinyInt => &Self::TinyInt,
            Self::Boolean => &Self::Boolean,
            Self::SmallInt => &Self::SmallInt,
            Self::MediumInt => &Self::MediumInt,
            Self::Int => &Self::Int,
            Self::BigInt => &Self::BigInt,
            Self::Float => &Self::Float,
            Self::Double => &Self::Double,
            Self::Decimal => &Self::Decimal,
            Self::Char => &Self::Char,
            Self::VarChar => &Self::VarChar,
            Self::Text => &Self::Text,
            Self::Binary => &Self::Binary,
            Self::Blob => &Self::Blob,
            Self::Date => &Self::Date,
            Self::Time => &Self::Time,
            Self::DateTime => &Self::DateTime,
            Self::Timestamp => &Self::Timestamp,
            Self::Year => &Self::Year,
            Self::Json => &Self::Json,
        }
    }

    /// Maps a declared column type to its variant.
    ///
    /// `SIGNED` and `ZEROFILL` do not change the representation. `UNSIGNED`
    /// moves the narrow integers one width up so every unsigned value fits.
    #[must_use]
    pub fn from_type_name(type_name: &TypeName) -> Option<Self> {
        let mut unsigned = false;
        let words: Vec<&str> = type_name
            .name
            .split(' ')
            .filter(|word| match *word {
                "UNSIGNED" => {
                    unsigned = true;
                    false
                }
                "SIGNED" | "ZEROFILL" => false,
                _ => true,
            })
            .collect();

        let ty = match words.join(" ").as_str() {
            "TINYINT" if type_name.size() == Some(1) => Self::Boolean,
            "TINYINT" => Self::TinyInt,
            "BOOL" | "BOOLEAN" | "BIT" => Self::Boolean,
            "SMALLINT" => Self::SmallInt,
            "MEDIUMINT" => Self::MediumInt,
            "INT" | "INTEGER" => Self::Int,
            // CAST(x AS SIGNED), CAST(x AS UNSIGNED)
            "BIGINT" | "" => Self::BigInt,
            "FLOAT" => Self::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "REAL" => Self::Double,
            "DECIMAL" | "DEC" | "NUMERIC" | "FIXED" => Self::Decimal,
            "CHAR" | "CHARACTER" => Self::Char,
            "VARCHAR" | "CHARACTER VARYING" => Self::VarChar,
            "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => Self::Text,
            "BINARY" | "VARBINARY" => Self::Binary,
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => Self::Blob,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" => Self::DateTime,
            "TIMESTAMP" => Self::Timestamp,
            "YEAR" => Self::Year,
            "JSON" => Self::Json,
            _ => return None,
        };
        Some(if unsigned { ty.widened() } else { ty })
    }

    const fn widened(self) -> Self {
        match self {
            Self::TinyInt => Self::SmallInt,
            Self::SmallInt | Self::MediumInt => Self::Int,
            Self::Int => Self::BigInt,
            other => other,
        }
    }
}

impl DialectType for MySqlType {
    fn name(&self) -> &'static str {
        match self {
            Self::TinyInt => "TINYINT",
            Self::Boolean => "BOOLEAN",
            Self::SmallInt => "SMALLINT",
            Self::MediumInt => "MEDIUMINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::VarChar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Binary => "BINARY",
            Self::Blob => "BLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Year => "YEAR",
            Self::Json => "JSON",
        }
    }

    fn dialect(&self) -> &'static str {
        MYSQL
    }

    fn affinity(&self) -> Option<Affinity> {
        self.native().map(wire_affinity)
    }

    fn native(&self) -> Option<NativeType> {
        Some(match self {
            Self::TinyInt => NativeType::I8,
            Self::Boolean => NativeType::Bool,
            Self::SmallInt | Self::Year => NativeType::I16,
            Self::MediumInt | Self::Int => NativeType::I32,
            Self::BigInt => NativeType::I64,
            Self::Float => NativeType::F32,
            Self::Double => NativeType::F64,
            Self::Decimal => NativeType::Decimal,
            Self::Char | Self::VarChar | Self::Text | Self::Json => NativeType::String,
            Self::Binary | Self::Blob => NativeType::Bytes,
            Self::Date => NativeType::Date,
            Self::Time => NativeType::Time,
            Self::DateTime | Self::Timestamp => NativeType::Timestamp,
        })
    }
}
