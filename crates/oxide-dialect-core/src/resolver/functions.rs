//! Built-in function return types.

use crate::ast::FunctionCall;
use crate::types::{
    AnsiType, IntermediateType, NUMERIC_ORDER, PREFERENCE_ORDER, TypeRef, encapsulate,
    encapsulate_coalesced,
};

use super::ResolveContext;

/// Resolves every argument of `call` through the head of the chain.
#[must_use]
pub fn argument_types(call: &FunctionCall, cx: &ResolveContext<'_>) -> Vec<IntermediateType> {
    call.args.iter().map(|arg| cx.type_of(arg)).collect()
}

/// A baseline result type, nullable when any argument is.
#[must_use]
pub fn returns(kind: AnsiType, args: &[IntermediateType]) -> IntermediateType {
    returns_kind(kind.type_ref(), args)
}

/// A dialect result type, nullable when any argument is.
#[must_use]
pub fn returns_kind(kind: TypeRef, args: &[IntermediateType]) -> IntermediateType {
    IntermediateType::new(kind).with_nullable(args.iter().any(IntermediateType::is_nullable))
}

/// Unifies the arguments with the default preference order.
#[must_use]
pub fn unify_arguments(args: &[IntermediateType], force_nullable: bool) -> IntermediateType {
    encapsulate(args, PREFERENCE_ORDER, force_nullable)
}

/// The functions every dialect shares.
pub(crate) fn ansi_function_type(
    call: &FunctionCall,
    cx: &ResolveContext<'_>,
) -> Option<IntermediateType> {
    let name = call.lookup_name();
    let ty = match name.as_str() {
        "count" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Integer)
        }
        "sum" => encapsulate(&argument_types(call, cx), NUMERIC_ORDER, true),
        "avg" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Real).as_nullable()
        }
        "min" | "max" if call.args.len() == 1 => argument_types(call, cx)
            .swap_remove(0)
            .without_name()
            .as_nullable(),
        "coalesce" => encapsulate_coalesced(&argument_types(call, cx), PREFERENCE_ORDER),
        "nullif" => {
            let args = argument_types(call, cx);
            args.into_iter()
                .next()
                .map_or_else(IntermediateType::null, |first| first.without_name().as_nullable())
        }
        "abs" => encapsulate(&argument_types(call, cx), NUMERIC_ORDER, false),
        "round" => returns(AnsiType::Real, &argument_types(call, cx)),
        "length" => returns(AnsiType::Integer, &argument_types(call, cx)),
        "lower" | "upper" | "trim" | "ltrim" | "rtrim" | "replace" | "substr" | "substring" => {
            returns(AnsiType::Text, &argument_types(call, cx))
        }
        _ => return None,
    };
    Some(ty)
}
