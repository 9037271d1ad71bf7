//! Window function return types, shared by dialects that support `OVER`.

use crate::ast::FunctionCall;
use crate::types::{AnsiType, IntermediateType};

use super::ResolveContext;
use super::functions::{argument_types, unify_arguments};

/// Resolves a call carrying an `OVER` clause.
///
/// Ranking functions never return NULL; value functions may, since the
/// frame can be empty. Returns `None` for aggregates used as window
/// functions, which resolve like their plain form.
#[must_use]
pub fn window_function_type(call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
    let window = call.over.as_ref()?;
    for expr in window
        .partition_by
        .iter()
        .chain(window.order_by.iter().map(|o| &o.expr))
    {
        let _ = cx.type_of(expr);
    }

    let ty = match call.lookup_name().as_str() {
        "row_number" | "rank" | "dense_rank" | "ntile" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Integer)
        }
        "percent_rank" | "cume_dist" => IntermediateType::ansi(AnsiType::Real),
        "first_value" | "last_value" | "nth_value" => {
            let args = argument_types(call, cx);
            unify_arguments(args.get(..1).unwrap_or_default(), true)
        }
        "lag" | "lead" => {
            let args = argument_types(call, cx);
            // lag(value, offset, default): the offset is not a value argument
            let values: Vec<IntermediateType> = args
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != 1)
                .map(|(_, ty)| ty)
                .collect();
            unify_arguments(&values, true)
        }
        _ => return None,
    };
    Some(ty)
}
