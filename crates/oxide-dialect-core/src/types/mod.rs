//! Dialect type variants, resolved types and type unification.

mod ansi;
mod codec;
mod dialect_type;
mod encapsulate;
mod intermediate;

pub use ansi::{ANSI, AnsiType, NUMERIC_ORDER, PREFERENCE_ORDER};
pub use codec::{decode as decode_native, encode as encode_native, wire_affinity};
pub use dialect_type::{
    Affinity, BindOp, CodecError, DialectType, NativeType, NativeValue, ReadOp, TypeRef, WireValue,
};
pub use encapsulate::{encapsulate, encapsulate_coalesced};
pub use intermediate::{IntermediateType, TypeDescriptor};
