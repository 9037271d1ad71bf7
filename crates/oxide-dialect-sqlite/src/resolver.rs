//! SQLite resolver layers.
//!
//! Only the releases that change typing get a layer. 3.24, 3.30 and 3.33
//! add syntax alone and reuse the layer below them.

use oxide_dialect_core::ast::{Expr, FunctionCall, Statement, TypeName};
use oxide_dialect_core::resolver::{
    QueryWithResults, ResolveContext, TypeResolver, argument_types, returns, unify_arguments,
    window_function_type,
};
use oxide_dialect_core::types::{
    AnsiType, IntermediateType, NUMERIC_ORDER, PREFERENCE_ORDER, encapsulate,
    encapsulate_coalesced,
};

// ================================================================
// 3.18
// ================================================================

/// The oldest supported release: `NUMERIC` columns and the core function
/// set on top of the ANSI root.
pub struct Sqlite318TypeResolver {
    parent: Box<dyn TypeResolver>,
}

impl Sqlite318TypeResolver {
    /// Wraps `parent`, normally the ANSI root.
    #[must_use]
    pub fn new(parent: Box<dyn TypeResolver>) -> Self {
        Self { parent }
    }
}

fn core_function_type(call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
    let ty = match call.lookup_name().as_str() {
        "ifnull" => encapsulate_coalesced(&argument_types(call, cx), PREFERENCE_ORDER),
        "instr" | "unicode" => returns(AnsiType::Integer, &argument_types(call, cx)),
        "hex" | "quote" | "char" | "typeof" | "sqlite_version" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Text)
        }
        "random" | "changes" | "last_insert_rowid" | "total_changes" => {
            IntermediateType::ansi(AnsiType::Integer)
        }
        "randomblob" | "zeroblob" => returns(AnsiType::Blob, &argument_types(call, cx)),
        // total() of no rows is 0.0, never NULL
        "total" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Real)
        }
        "group_concat" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Text).as_nullable()
        }
        "printf" | "format" => {
            let args = argument_types(call, cx);
            returns(AnsiType::Text, args.get(..1).unwrap_or_default())
        }
        "current_date" | "current_time" | "current_timestamp" => IntermediateType::ansi(AnsiType::Text),
        "date" | "time" | "datetime" | "strftime" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Text).as_nullable()
        }
        "julianday" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Real).as_nullable()
        }
        "likelihood" | "likely" | "unlikely" => argument_types(call, cx)
            .into_iter()
            .next()
            .map_or_else(IntermediateType::null, IntermediateType::without_name),
        "max" | "min" if call.args.len() > 1 => {
            unify_arguments(&argument_types(call, cx), false)
        }
        _ => return None,
    };
    Some(ty)
}

impl TypeResolver for Sqlite318TypeResolver {
    fn name(&self) -> &'static str {
        "sqlite-3.18"
    }

    fn parent(&self) -> Option<&dyn TypeResolver> {
        Some(self.parent.as_ref())
    }

    fn declares_type(&self, type_name: &TypeName) -> bool {
        type_name.is("NUMERIC") || self.parent.declares_type(type_name)
    }

    fn definition_type(&self, type_name: &TypeName) -> IntermediateType {
        if type_name.is("NUMERIC") {
            IntermediateType::ansi(AnsiType::Real)
        } else {
            self.parent.definition_type(type_name)
        }
    }

    fn function_type(&self, call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
        core_function_type(call, cx).or_else(|| self.parent.function_type(call, cx))
    }
}

// ================================================================
// 3.25
// ================================================================

/// Window functions.
pub struct Sqlite325TypeResolver {
    parent: Box<dyn TypeResolver>,
}

impl Sqlite325TypeResolver {
    /// Wraps the 3.18 layer.
    #[must_use]
    pub fn new(parent: Box<dyn TypeResolver>) -> Self {
        Self { parent }
    }
}

impl TypeResolver for Sqlite325TypeResolver {
    fn name(&self) -> &'static str {
        "sqlite-3.25"
    }

    fn parent(&self) -> Option<&dyn TypeResolver> {
        Some(self.parent.as_ref())
    }

    fn resolved_type(&self, expr: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        if let Expr::Function(call) = expr
            && let Some(ty) = window_function_type(call, cx)
        {
            return ty;
        }
        self.parent.resolved_type(expr, cx)
    }
}

// ================================================================
// 3.35
// ================================================================

/// `RETURNING` and the math functions.
pub struct Sqlite335TypeResolver {
    parent: Box<dyn TypeResolver>,
}

impl Sqlite335TypeResolver {
    /// Wraps the 3.25 layer.
    #[must_use]
    pub fn new(parent: Box<dyn TypeResolver>) -> Self {
        Self { parent }
    }
}

fn math_function_type(call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
    let ty = match call.lookup_name().as_str() {
        "ceil" | "ceiling" | "floor" | "trunc" => {
            encapsulate(&argument_types(call, cx), NUMERIC_ORDER, false)
        }
        "sin" | "cos" | "tan" | "sinh" | "cosh" | "tanh" | "asinh" | "atan" | "atan2" | "exp"
        | "radians" | "degrees" => returns(AnsiType::Real, &argument_types(call, cx)),
        // NULL outside the function's domain
        "ln" | "log" | "log2" | "log10" | "sqrt" | "pow" | "power" | "mod" | "acos" | "asin"
        | "acosh" | "atanh" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Real).as_nullable()
        }
        "pi" => IntermediateType::ansi(AnsiType::Real),
        _ => return None,
    };
    Some(ty)
}

impl TypeResolver for Sqlite335TypeResolver {
    fn name(&self) -> &'static str {
        "sqlite-3.35"
    }

    fn parent(&self) -> Option<&dyn TypeResolver> {
        Some(self.parent.as_ref())
    }

    fn function_type(&self, call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
        math_function_type(call, cx).or_else(|| self.parent.function_type(call, cx))
    }

    fn query_with_results<'s>(&self, statement: &'s Statement) -> Option<QueryWithResults<'s>> {
        QueryWithResults::from_returning(statement)
    }
}

// ================================================================
// 3.38
// ================================================================

/// The `->`/`->>` operators and the `json_*` functions.
pub struct Sqlite338TypeResolver {
    parent: Box<dyn TypeResolver>,
}

impl Sqlite338TypeResolver {
    /// Wraps the 3.35 layer.
    #[must_use]
    pub fn new(parent: Box<dyn TypeResolver>) -> Self {
        Self { parent }
    }
}

fn json_function_type(call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
    let ty = match call.lookup_name().as_str() {
        "json_array" | "json_object" | "json_quote" | "json_group_array" | "json_group_object" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Text)
        }
        "json" | "json_insert" | "json_replace" | "json_set" | "json_remove" | "json_patch" => {
            let args = argument_types(call, cx);
            returns(AnsiType::Text, args.get(..1).unwrap_or_default())
        }
        // the path may not exist
        "json_extract" | "json_type" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Text).as_nullable()
        }
        "json_array_length" => {
            let _ = argument_types(call, cx);
            IntermediateType::ansi(AnsiType::Integer).as_nullable()
        }
        "json_valid" => returns(AnsiType::Integer, &argument_types(call, cx)),
        _ => return None,
    };
    Some(ty)
}

impl TypeResolver for Sqlite338TypeResolver {
    fn name(&self) -> &'static str {
        "sqlite-3.38"
    }

    fn parent(&self) -> Option<&dyn TypeResolver> {
        Some(self.parent.as_ref())
    }

    fn resolved_type(&self, expr: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        match expr {
            Expr::Json { left, right, .. } => {
                let _ = cx.type_of(left);
                let _ = cx.type_of(right);
                IntermediateType::ansi(AnsiType::Text).as_nullable()
            }
            _ => self.parent.resolved_type(expr, cx),
        }
    }

    fn function_type(&self, call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
        json_function_type(call, cx).or_else(|| self.parent.function_type(call, cx))
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::resolver::AnsiTypeResolver;

    use super::*;

    fn chain() -> Sqlite318TypeResolver {
        Sqlite318TypeResolver::new(Box::new(AnsiTypeResolver::new()))
    }

    #[test]
    fn test_numeric_has_real_affinity() {
        let resolver = chain();
        let numeric = TypeName::new("numeric").with_arg("10").with_arg("2");
        assert!(resolver.declares_type(&numeric));
        assert!(resolver.definition_type(&numeric).is(AnsiType::Real));
    }

    #[test]
    fn test_baseline_types_reach_the_root() {
        let resolver = chain();
        assert!(resolver.definition_type(&TypeName::new("INT")).is(AnsiType::Integer));
        assert!(resolver.definition_type(&TypeName::new("blob")).is(AnsiType::Blob));
        assert!(!resolver.declares_type(&TypeName::new("VARCHAR")));
        assert!(!resolver.declares_type(&TypeName::new("BOOLEAN")));
    }

    #[test]
    fn test_layers_without_returning_expose_none() {
        let statement = oxide_dialect_core::Parser::new("DELETE FROM t RETURNING id")
            .parse_statement()
            .unwrap();
        assert!(chain().query_with_results(&statement).is_none());
        let layered = Sqlite335TypeResolver::new(Box::new(Sqlite325TypeResolver::new(Box::new(
            chain(),
        ))));
        let results = layered.query_with_results(&statement).unwrap();
        assert_eq!(results.source_table, "t");
        assert_eq!(results.result_columns.len(), 1);
    }
}
