//! Wire <-> native conversion shared by every dialect type.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use super::dialect_type::{Affinity, CodecError, NativeType, NativeValue, WireValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").unwrap_or_else(|e| panic!("decimal pattern: {e}"))
});

/// Returns the storage class a native representation travels as.
#[must_use]
pub const fn wire_affinity(native: NativeType) -> Affinity {
    match native {
        NativeType::Bool | NativeType::I8 | NativeType::I16 | NativeType::I32 | NativeType::I64 => {
            Affinity::Integer
        }
        NativeType::F32 | NativeType::F64 => Affinity::Real,
        NativeType::Bytes => Affinity::Blob,
        NativeType::Decimal
        | NativeType::String
        | NativeType::Date
        | NativeType::Time
        | NativeType::Timestamp => Affinity::Text,
    }
}

fn out_of_range(type_name: &'static str, value: impl ToString) -> CodecError {
    CodecError::OutOfRange {
        type_name,
        value: value.to_string(),
    }
}

fn malformed(type_name: &'static str, value: &str) -> CodecError {
    CodecError::Malformed {
        type_name,
        value: value.to_string(),
    }
}

/// Converts a wire value into `native`, the representation of the variant
/// named `type_name`.
///
/// Dialect types overriding [`DialectType::decode`](super::DialectType::decode)
/// fall back to this for the cases they do not special-case.
///
/// # Errors
///
/// Returns a `CodecError` if the wire value is outside the representation.
pub fn decode(
    type_name: &'static str,
    native: NativeType,
    wire: &WireValue,
) -> Result<NativeValue, CodecError> {
    let mismatch = || CodecError::WireMismatch {
        type_name,
        found: wire.affinity().as_str(),
    };
    match (native, wire) {
        (NativeType::Bool, WireValue::Integer(v)) => Ok(NativeValue::Bool(*v == 1)),
        (NativeType::I8, WireValue::Integer(v)) => i8::try_from(*v)
            .map(NativeValue::I8)
            .map_err(|_| out_of_range(type_name, v)),
        (NativeType::I16, WireValue::Integer(v)) => i16::try_from(*v)
            .map(NativeValue::I16)
            .map_err(|_| out_of_range(type_name, v)),
        (NativeType::I32, WireValue::Integer(v)) => i32::try_from(*v)
            .map(NativeValue::I32)
            .map_err(|_| out_of_range(type_name, v)),
        (NativeType::I64, WireValue::Integer(v)) => Ok(NativeValue::I64(*v)),
        (NativeType::F32, WireValue::Real(v)) => {
            if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                return Err(out_of_range(type_name, v));
            }
            #[allow(clippy::cast_possible_truncation)]
            Ok(NativeValue::F32(*v as f32))
        }
        (NativeType::F64, WireValue::Real(v)) => Ok(NativeValue::F64(*v)),
        (NativeType::Decimal, WireValue::Text(s)) => {
            if DECIMAL.is_match(s) {
                Ok(NativeValue::Decimal(s.clone()))
            } else {
                Err(malformed(type_name, s))
            }
        }
        (NativeType::String, WireValue::Text(s)) => Ok(NativeValue::String(s.clone())),
        (NativeType::Bytes, WireValue::Blob(b)) => Ok(NativeValue::Bytes(b.clone())),
        (NativeType::Date, WireValue::Text(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(NativeValue::Date)
            .map_err(|_| malformed(type_name, s)),
        (NativeType::Time, WireValue::Text(s)) => NaiveTime::parse_from_str(s, TIME_FORMAT)
            .map(NativeValue::Time)
            .map_err(|_| malformed(type_name, s)),
        (NativeType::Timestamp, WireValue::Text(s)) => {
            NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(s, ISO_TIMESTAMP_FORMAT))
                .map(NativeValue::Timestamp)
                .map_err(|_| malformed(type_name, s))
        }
        _ => Err(mismatch()),
    }
}

/// Converts a native value of representation `native` into its wire value.
///
/// # Errors
///
/// Returns a `CodecError` if the value is in another representation.
pub fn encode(
    type_name: &'static str,
    native: NativeType,
    value: &NativeValue,
) -> Result<WireValue, CodecError> {
    if value.native_type() != native {
        return Err(CodecError::NativeMismatch {
            type_name,
            found: value.native_type(),
        });
    }
    Ok(match value {
        NativeValue::Bool(b) => WireValue::Integer(i64::from(*b)),
        NativeValue::I8(v) => WireValue::Integer(i64::from(*v)),
        NativeValue::I16(v) => WireValue::Integer(i64::from(*v)),
        NativeValue::I32(v) => WireValue::Integer(i64::from(*v)),
        NativeValue::I64(v) => WireValue::Integer(*v),
        NativeValue::F32(v) => WireValue::Real(f64::from(*v)),
        NativeValue::F64(v) => WireValue::Real(*v),
        NativeValue::Decimal(s) | NativeValue::String(s) => WireValue::Text(s.clone()),
        NativeValue::Bytes(b) => WireValue::Blob(b.clone()),
        NativeValue::Date(d) => WireValue::Text(d.format(DATE_FORMAT).to_string()),
        NativeValue::Time(t) => WireValue::Text(t.format(TIME_FORMAT).to_string()),
        NativeValue::Timestamp(ts) => WireValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_decodes_one_as_true() {
        assert_eq!(
            decode("BOOLEAN", NativeType::Bool, &WireValue::Integer(1)),
            Ok(NativeValue::Bool(true))
        );
        assert_eq!(
            decode("BOOLEAN", NativeType::Bool, &WireValue::Integer(7)),
            Ok(NativeValue::Bool(false))
        );
        assert_eq!(
            encode("BOOLEAN", NativeType::Bool, &NativeValue::Bool(true)),
            Ok(WireValue::Integer(1))
        );
    }

    #[test]
    fn test_narrow_integer_out_of_range() {
        assert_eq!(
            decode("TINYINT", NativeType::I8, &WireValue::Integer(-128)),
            Ok(NativeValue::I8(-128))
        );
        assert!(matches!(
            decode("TINYINT", NativeType::I8, &WireValue::Integer(300)),
            Err(CodecError::OutOfRange { .. })
        ));
        assert!(matches!(
            decode("INT", NativeType::I32, &WireValue::Integer(i64::MAX)),
            Err(CodecError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_wire_mismatch() {
        let err = decode("TEXT", NativeType::String, &WireValue::Integer(1)).unwrap_err();
        assert_eq!(err.to_string(), "TEXT cannot decode a INTEGER wire value");
    }

    #[test]
    fn test_native_mismatch() {
        assert!(matches!(
            encode("INTEGER", NativeType::I64, &NativeValue::String("x".into())),
            Err(CodecError::NativeMismatch {
                found: NativeType::String,
                ..
            })
        ));
    }

    #[test]
    fn test_decimal_validation() {
        assert!(decode("DECIMAL", NativeType::Decimal, &WireValue::Text("-12.50".into())).is_ok());
        assert!(decode("DECIMAL", NativeType::Decimal, &WireValue::Text(".5".into())).is_ok());
        assert!(matches!(
            decode("DECIMAL", NativeType::Decimal, &WireValue::Text("12a".into())),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_temporal_round_trip() {
        for (native, text) in [
            (NativeType::Date, "2024-02-29"),
            (NativeType::Time, "13:45:10"),
            (NativeType::Timestamp, "2024-02-29 13:45:10.250"),
        ] {
            let wire = WireValue::Text(text.to_string());
            let value = decode("T", native, &wire).unwrap();
            assert_eq!(encode("T", native, &value).unwrap(), wire);
        }
    }

    #[test]
    fn test_iso_timestamp_accepted() {
        let value = decode(
            "TIMESTAMP",
            NativeType::Timestamp,
            &WireValue::Text("2024-01-02T03:04:05".into()),
        )
        .unwrap();
        assert_eq!(
            encode("TIMESTAMP", NativeType::Timestamp, &value).unwrap(),
            WireValue::Text("2024-01-02 03:04:05".into())
        );
    }

    #[test]
    fn test_float_narrowing() {
        assert_eq!(
            decode("FLOAT", NativeType::F32, &WireValue::Real(1.5)),
            Ok(NativeValue::F32(1.5))
        );
        assert!(matches!(
            decode("FLOAT", NativeType::F32, &WireValue::Real(1e300)),
            Err(CodecError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_wire_affinity_of_natives() {
        assert_eq!(wire_affinity(NativeType::Bool), Affinity::Integer);
        assert_eq!(wire_affinity(NativeType::Timestamp), Affinity::Text);
        assert_eq!(wire_affinity(NativeType::Bytes), Affinity::Blob);
    }
}
