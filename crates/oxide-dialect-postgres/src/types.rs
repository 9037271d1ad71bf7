//! PostgreSQL column types.

use chrono::{DateTime, NaiveDateTime};
use oxide_dialect_core::ast::TypeName;
use oxide_dialect_core::types::{
    Affinity, CodecError, DialectType, NativeType, NativeValue, WireValue, decode_native,
    encode_native, wire_affinity,
};

/// The dialect name reported by PostgreSQL variants.
pub const POSTGRES: &str = "postgres";

const TIMESTAMPTZ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";

/// The closed set of PostgreSQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostgresType {
    /// `SMALLINT`, `INT2`, `SMALLSERIAL`.
    SmallInt,
    /// `INTEGER`, `INT`, `INT4`, `SERIAL`.
    Integer,
    /// `BIGINT`, `INT8`, `BIGSERIAL`.
    BigInt,
    /// `REAL`, `FLOAT4`.
    Real,
    /// `DOUBLE PRECISION`, `FLOAT8`, `FLOAT`.
    DoublePrecision,
    /// `NUMERIC`, `DECIMAL`.
    Numeric,
    /// `BOOLEAN`, `BOOL`.
    Boolean,
    /// `TEXT`.
    Text,
    /// `VARCHAR`, `CHARACTER VARYING`.
    VarChar,
    /// `CHAR`, `CHARACTER`, `BPCHAR`.
    Char,
    /// `BYTEA`.
    Bytea,
    /// `DATE`.
    Date,
    /// `TIME`, `TIME WITHOUT TIME ZONE`.
    Time,
    /// `TIMESTAMP`, `TIMESTAMP WITHOUT TIME ZONE`.
    Timestamp,
    /// `TIMESTAMPTZ`, `TIMESTAMP WITH TIME ZONE`. Decodes into UTC.
    TimestampTz,
    /// `UUID`.
    Uuid,
    /// `JSON`.
    Json,
    /// `JSONB`.
    Jsonb,
}

impl PostgresType {
    /// Every variant.
    pub const ALL: [Self; 18] = [
        Self::SmallInt,
        Self::Integer,
        Self::BigInt,
        Self::Real,
        Self::DoublePrecision,
        Self::Numeric,
        Self::Boolean,
        Self::Text,
        Self::VarChar,
        Self::Char,
        Self::Bytea,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::TimestampTz,
        Self::Uuid,
        Self::Json,
        Self::Jsonb,
    ];

    /// Returns a static reference usable as an `IntermediateType` kind.
    #[must_use]
    pub fn type_ref(self) -> &'static dyn DialectType {
        match self {
            Self::SmallInt => &Self::SmallInt,
            Self::Integer => &Self::Integer,
            Self::BigInt => &Self::BigInt,
            Self::Real => &Self::Real,
            Self::DoublePrecision => &Self::DoublePrecision,
            Self::Numeric => &Self::Numeric,
            Self::Boolean => &Self::Boolean,
            Self::Text => &Self::Text,
            Self::VarChar => &Self::VarChar,
            Self::Char => &Self::Char,
            Self::Bytea => &Self::Bytea,
            Self::Date => &Self::Date,
            Self::Time => &Self::Time,
            Self::Timestamp => &Self::Timestamp,
            Self::TimestampTz => &Self::TimestampTz,
            Self::Uuid => &Self::Uuid,
            Self::Json => &Self::Json,
            Self::Jsonb => &Self::Jsonb,
        }
    }

    /// Maps a declared column type, including its aliases, to its variant.
    #[must_use]
    pub fn from_type_name(type_name: &TypeName) -> Option<Self> {
        Some(match type_name.name.as_str() {
            "SMALLINT" | "INT2" | "SMALLSERIAL" | "SERIAL2" => Self::SmallInt,
            "INTEGER" | "INT" | "INT4" | "SERIAL" | "SERIAL4" => Self::Integer,
            "BIGINT" | "INT8" | "BIGSERIAL" | "SERIAL8" => Self::BigInt,
            "REAL" | "FLOAT4" => Self::Real,
            "DOUBLE PRECISION" | "FLOAT8" => Self::DoublePrecision,
            // FLOAT(p) with p <= 24 is single precision
            "FLOAT" => match type_name.size() {
                Some(precision) if precision <= 24 => Self::Real,
                _ => Self::DoublePrecision,
            },
            "NUMERIC" | "DECIMAL" => Self::Numeric,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "TEXT" => Self::Text,
            "VARCHAR" | "CHARACTER VARYING" => Self::VarChar,
            "CHAR" | "CHARACTER" | "BPCHAR" => Self::Char,
            "BYTEA" => Self::Bytea,
            "DATE" => Self::Date,
            "TIME" | "TIME WITHOUT TIME ZONE" => Self::Time,
            "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => Self::Timestamp,
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => Self::TimestampTz,
            "UUID" => Self::Uuid,
            "JSON" => Self::Json,
            "JSONB" => Self::Jsonb,
            _ => return None,
        })
    }

    /// Whether the variant holds a JSON document.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::Jsonb)
    }
}

impl DialectType for PostgresType {
    fn name(&self) -> &'static str {
        match self {
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::DoublePrecision => "DOUBLE PRECISION",
            Self::Numeric => "NUMERIC",
            Self::Boolean => "BOOLEAN",
            Self::Text => "TEXT",
            Self::VarChar => "VARCHAR",
            Self::Char => "CHAR",
            Self::Bytea => "BYTEA",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::TimestampTz => "TIMESTAMPTZ",
            Self::Uuid => "UUID",
            Self::Json => "JSON",
            Self::Jsonb => "JSONB",
        }
    }

    fn dialect(&self) -> &'static str {
        POSTGRES
    }

    fn affinity(&self) -> Option<Affinity> {
        self.native().map(wire_affinity)
    }

    fn native(&self) -> Option<NativeType> {
        Some(match self {
            Self::SmallInt => NativeType::I16,
            Self::Integer => NativeType::I32,
            Self::BigInt => NativeType::I64,
            Self::Real => NativeType::F32,
            Self::DoublePrecision => NativeType::F64,
            Self::Numeric => NativeType::Decimal,
            Self::Boolean => NativeType::Bool,
            Self::Text | Self::VarChar | Self::Char | Self::Uuid | Self::Json | Self::Jsonb => {
                NativeType::String
            }
            Self::Bytea => NativeType::Bytes,
            Self::Date => NativeType::Date,
            Self::Time => NativeType::Time,
            Self::Timestamp | Self::TimestampTz => NativeType::Timestamp,
        })
    }

    fn decode(&self, wire: &WireValue) -> Result<NativeValue, CodecError> {
        match (self, wire) {
            (Self::TimestampTz, WireValue::Text(text)) => {
                DateTime::parse_from_str(text, TIMESTAMPTZ_FORMAT)
                    .or_else(|_| DateTime::parse_from_rfc3339(text))
                    .map(|ts| NativeValue::Timestamp(ts.naive_utc()))
                    .map_err(|_| CodecError::Malformed {
                        type_name: self.name(),
                        value: text.clone(),
                    })
            }
            _ => decode_native(self.name(), self.codec_native(), wire),
        }
    }

    fn encode(&self, value: &NativeValue) -> Result<WireValue, CodecError> {
        match (self, value) {
            (Self::TimestampTz, NativeValue::Timestamp(ts)) => Ok(WireValue::Text(utc_text(ts))),
            _ => encode_native(self.name(), self.codec_native(), value),
        }
    }
}

fn utc_text(ts: &NaiveDateTime) -> String {
    format!("{}+00", ts.format("%Y-%m-%d %H:%M:%S%.f"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn parse(name: &str) -> Option<PostgresType> {
        PostgresType::from_type_name(&TypeName::new(name))
    }

    #[test]
    fn test_aliases() {
        assert_eq!(parse("int2"), Some(PostgresType::SmallInt));
        assert_eq!(parse("serial"), Some(PostgresType::Integer));
        assert_eq!(parse("bigserial"), Some(PostgresType::BigInt));
        assert_eq!(parse("double precision"), Some(PostgresType::DoublePrecision));
        assert_eq!(parse("float"), Some(PostgresType::DoublePrecision));
        assert_eq!(
            PostgresType::from_type_name(&TypeName::new("float").with_arg("10")),
            Some(PostgresType::Real)
        );
        assert_eq!(parse("character varying"), Some(PostgresType::VarChar));
        assert_eq!(parse("timestamp with time zone"), Some(PostgresType::TimestampTz));
        assert_eq!(parse("jsonb"), Some(PostgresType::Jsonb));
        assert_eq!(parse("TINYINT"), None);
        assert_eq!(parse("BLOB"), None);
    }

    #[test]
    fn test_wire_mapping() {
        assert_eq!(PostgresType::SmallInt.bind(1).method(), "bind_integer");
        assert_eq!(PostgresType::Boolean.read(0).method(), "get_integer");
        assert_eq!(PostgresType::Numeric.bind(1).method(), "bind_text");
        assert_eq!(PostgresType::Bytea.read(3).method(), "get_blob");
        assert_eq!(PostgresType::Uuid.native(), Some(NativeType::String));
    }

    #[test]
    fn test_smallint_range() {
        let ty = PostgresType::SmallInt;
        assert_eq!(ty.decode(&WireValue::Integer(-32768)), Ok(NativeValue::I16(-32768)));
        assert!(matches!(
            ty.decode(&WireValue::Integer(40000)),
            Err(CodecError::OutOfRange { type_name: "SMALLINT", .. })
        ));
    }

    #[test]
    fn test_timestamptz_decodes_into_utc() {
        let ty = PostgresType::TimestampTz;
        let value = ty
            .decode(&WireValue::Text("2024-03-01 12:00:00+02".into()))
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap();
        assert_eq!(value, NativeValue::Timestamp(expected));
        assert_eq!(
            ty.encode(&value),
            Ok(WireValue::Text("2024-03-01 10:00:00+00".into()))
        );
        assert!(matches!(
            ty.decode(&WireValue::Text("yesterday".into())),
            Err(CodecError::Malformed { .. })
        ));
    }

    fn sample_wire(ty: PostgresType) -> WireValue {
        match ty.codec_native() {
            NativeType::Bool => WireValue::Integer(0),
            NativeType::I16 => WireValue::Integer(-32768),
            NativeType::I32 => WireValue::Integer(2_000_000),
            NativeType::I64 => WireValue::Integer(i64::MIN),
            NativeType::F32 => WireValue::Real(-0.75),
            NativeType::F64 => WireValue::Real(1e-300),
            NativeType::Decimal => WireValue::Text("12345678901234567890.01".into()),
            NativeType::String => WireValue::Text("{\"k\": [1, 2]}".into()),
            NativeType::Bytes => WireValue::Blob(vec![0xde, 0xad, 0xbe, 0xef]),
            NativeType::Date => WireValue::Text("1999-12-31".into()),
            NativeType::Time => WireValue::Text("23:59:59".into()),
            NativeType::Timestamp if ty == PostgresType::TimestampTz => {
                WireValue::Text("2024-03-01 10:00:00.500+00".into())
            }
            NativeType::Timestamp => WireValue::Text("2024-03-01 10:00:00.500".into()),
            other => panic!("{} has no sample for {other:?}", ty.name()),
        }
    }

    #[test]
    fn test_every_variant_round_trips() {
        for ty in PostgresType::ALL {
            let wire = sample_wire(ty);
            let value = ty
                .decode(&wire)
                .unwrap_or_else(|e| panic!("{}: {e}", ty.name()));
            assert_eq!(value.native_type(), ty.codec_native(), "{}", ty.name());
            assert_eq!(ty.encode(&value), Ok(wire), "{}", ty.name());
            assert_eq!(ty.encode(&value).and_then(|w| ty.decode(&w)), Ok(value), "{}", ty.name());
        }
    }

    #[test]
    fn test_plain_timestamp_keeps_default_codec() {
        let wire = WireValue::Text("2024-03-01 12:00:00".into());
        let value = PostgresType::Timestamp.decode(&wire).unwrap();
        assert_eq!(PostgresType::Timestamp.encode(&value), Ok(wire));
        assert!(matches!(
            PostgresType::Text.decode(&WireValue::Integer(1)),
            Err(CodecError::WireMismatch { .. })
        ));
    }
}
