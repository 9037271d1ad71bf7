//! The PostgreSQL resolver layer.

use oxide_dialect_core::ast::{Expr, FunctionCall, JsonOperator, Statement, TypeName};
use oxide_dialect_core::resolver::{
    QueryWithResults, ResolveContext, TypeResolver, argument_types, returns_kind,
    window_function_type,
};
use oxide_dialect_core::types::{
    AnsiType, IntermediateType, NUMERIC_ORDER, NativeType, PREFERENCE_ORDER, encapsulate,
    encapsulate_coalesced,
};

use crate::types::{POSTGRES, PostgresType};

/// PostgreSQL column types, functions, window calls, JSON operators and
/// `RETURNING` over the ANSI root.
pub struct PostgresTypeResolver {
    parent: Box<dyn TypeResolver>,
}

impl PostgresTypeResolver {
    /// Wraps `parent`, normally the ANSI root.
    #[must_use]
    pub fn new(parent: Box<dyn TypeResolver>) -> Self {
        Self { parent }
    }
}

fn postgres(ty: PostgresType) -> IntermediateType {
    IntermediateType::new(ty.type_ref())
}

fn is_postgres(ty: &IntermediateType, variant: PostgresType) -> bool {
    let kind = ty.kind();
    kind.dialect() == POSTGRES && kind.name() == variant.type_ref().name()
}

/// `sum` widens integers one step and keeps floating point input.
fn sum_type(args: &[IntermediateType]) -> Option<IntermediateType> {
    let widest = args.iter().filter_map(|arg| arg.kind().native()).max_by_key(|n| n.generality())?;
    let ty = match widest {
        NativeType::I8 | NativeType::I16 | NativeType::I32 => PostgresType::BigInt,
        NativeType::I64 | NativeType::Decimal => PostgresType::Numeric,
        NativeType::F32 => PostgresType::Real,
        NativeType::F64 => PostgresType::DoublePrecision,
        _ => return None,
    };
    Some(postgres(ty).as_nullable())
}

/// `avg` of exact input is `NUMERIC`; of floating point `DOUBLE PRECISION`.
fn avg_type(args: &[IntermediateType]) -> Option<IntermediateType> {
    let widest = args.iter().filter_map(|arg| arg.kind().native()).max_by_key(|n| n.generality())?;
    let ty = match widest {
        NativeType::I8 | NativeType::I16 | NativeType::I32 | NativeType::I64 | NativeType::Decimal => {
            PostgresType::Numeric
        }
        NativeType::F32 | NativeType::F64 => PostgresType::DoublePrecision,
        _ => return None,
    };
    Some(postgres(ty).as_nullable())
}

fn postgres_function_type(
    call: &FunctionCall,
    cx: &ResolveContext<'_>,
) -> Option<IntermediateType> {
    let text = PostgresType::Text.type_ref();
    let integer = PostgresType::Integer.type_ref();
    let ty = match call.lookup_name().as_str() {
        "count" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::BigInt)
        }
        "sum" => {
            let args = argument_types(call, cx);
            sum_type(&args).unwrap_or_else(|| encapsulate(&args, NUMERIC_ORDER, true))
        }
        "avg" => {
            let args = argument_types(call, cx);
            avg_type(&args).unwrap_or_else(|| IntermediateType::ansi(AnsiType::Real).as_nullable())
        }
        "now" | "current_timestamp" | "transaction_timestamp" | "statement_timestamp"
        | "clock_timestamp" => postgres(PostgresType::TimestampTz),
        "localtimestamp" => postgres(PostgresType::Timestamp),
        "current_date" => postgres(PostgresType::Date),
        "current_time" | "localtime" => postgres(PostgresType::Time),
        "gen_random_uuid" => postgres(PostgresType::Uuid),
        "date_trunc" => {
            let args = argument_types(call, cx);
            let nullable = args.iter().any(IntermediateType::is_nullable);
            args.into_iter()
                .nth(1)
                .map_or_else(|| postgres(PostgresType::Timestamp), IntermediateType::without_name)
                .with_nullable(nullable)
        }
        "string_agg" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::Text).as_nullable()
        }
        // NULL arguments are ignored; the result is NULL only when all are
        "greatest" | "least" => encapsulate_coalesced(&argument_types(call, cx), PREFERENCE_ORDER),
        "to_char" | "concat_ws" | "initcap" | "md5" => returns_kind(text, &argument_types(call, cx)),
        "concat" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::Text)
        }
        "char_length" | "character_length" | "length" | "position" | "strpos" => {
            returns_kind(integer, &argument_types(call, cx))
        }
        "jsonb_build_object" | "jsonb_build_array" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::Jsonb)
        }
        "to_jsonb" | "jsonb_set" | "jsonb_strip_nulls" => {
            returns_kind(PostgresType::Jsonb.type_ref(), &argument_types(call, cx))
        }
        "jsonb_agg" | "jsonb_object_agg" | "jsonb_extract_path" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::Jsonb).as_nullable()
        }
        "jsonb_extract_path_text" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::Text).as_nullable()
        }
        "jsonb_typeof" => returns_kind(text, &argument_types(call, cx)),
        "jsonb_array_length" => returns_kind(integer, &argument_types(call, cx)),
        "bool_and" | "bool_or" | "every" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::Boolean).as_nullable()
        }
        "array_length" | "cardinality" => {
            let _ = argument_types(call, cx);
            postgres(PostgresType::Integer).as_nullable()
        }
        _ => return None,
    };
    Some(ty)
}

impl TypeResolver for PostgresTypeResolver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn parent(&self) -> Option<&dyn TypeResolver> {
        Some(self.parent.as_ref())
    }

    fn declares_type(&self, type_name: &TypeName) -> bool {
        PostgresType::from_type_name(type_name).is_some() || self.parent.declares_type(type_name)
    }

    fn definition_type(&self, type_name: &TypeName) -> IntermediateType {
        PostgresType::from_type_name(type_name)
            .map_or_else(|| self.parent.definition_type(type_name), postgres)
    }

    fn resolved_type(&self, expr: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        match expr {
            Expr::Function(call) if call.over.is_some() => {
                window_function_type(call, cx).unwrap_or_else(|| self.parent.resolved_type(expr, cx))
            }
            // a missing key yields NULL
            Expr::Json { left, op, right } => {
                let document = cx.type_of(left);
                let _ = cx.type_of(right);
                match op {
                    JsonOperator::Extract if is_postgres(&document, PostgresType::Json) => {
                        postgres(PostgresType::Json).as_nullable()
                    }
                    JsonOperator::Extract => postgres(PostgresType::Jsonb).as_nullable(),
                    JsonOperator::ExtractText => postgres(PostgresType::Text).as_nullable(),
                }
            }
            _ => self.parent.resolved_type(expr, cx),
        }
    }

    fn function_type(&self, call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
        postgres_function_type(call, cx).or_else(|| self.parent.function_type(call, cx))
    }

    fn query_with_results<'s>(&self, statement: &'s Statement) -> Option<QueryWithResults<'s>> {
        QueryWithResults::from_returning(statement)
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::resolver::{AnsiTypeResolver, chain_names};

    use super::*;

    fn resolver() -> PostgresTypeResolver {
        PostgresTypeResolver::new(Box::new(AnsiTypeResolver::new()))
    }

    #[test]
    fn test_declares_postgres_types_before_the_root() {
        let resolver = resolver();
        let int = resolver.definition_type(&TypeName::new("int4"));
        assert_eq!(int.kind().dialect(), "postgres");
        assert_eq!(int.kind().name(), "INTEGER");
        assert!(resolver.declares_type(&TypeName::new("timestamptz")));
        assert!(!resolver.declares_type(&TypeName::new("TINYINT")));
        // BLOB is only known to the root
        let blob = resolver.definition_type(&TypeName::new("BLOB"));
        assert!(blob.is(AnsiType::Blob));
    }

    #[test]
    fn test_chain() {
        assert_eq!(chain_names(&resolver()), ["postgres", "ansi"]);
    }

    #[test]
    fn test_sum_widens_integers() {
        let small = [postgres(PostgresType::SmallInt)];
        assert_eq!(sum_type(&small).map(|t| t.kind().name()), Some("BIGINT"));
        let big = [postgres(PostgresType::BigInt)];
        assert_eq!(sum_type(&big).map(|t| t.kind().name()), Some("NUMERIC"));
        let real = [postgres(PostgresType::Real)];
        assert_eq!(sum_type(&real).map(|t| t.kind().name()), Some("REAL"));
        assert!(sum_type(&[postgres(PostgresType::Text)]).is_none());
        assert!(sum_type(&small).is_some_and(|t| t.is_nullable()));
    }

    #[test]
    fn test_avg_is_numeric_for_exact_input() {
        let ints = [postgres(PostgresType::Integer)];
        assert_eq!(avg_type(&ints).map(|t| t.kind().name()), Some("NUMERIC"));
        let floats = [postgres(PostgresType::DoublePrecision)];
        assert_eq!(
            avg_type(&floats).map(|t| t.kind().name()),
            Some("DOUBLE PRECISION")
        );
    }

    #[test]
    fn test_json_kind_detection() {
        assert!(is_postgres(&postgres(PostgresType::Json), PostgresType::Json));
        assert!(!is_postgres(&postgres(PostgresType::Jsonb), PostgresType::Json));
        assert!(!is_postgres(&IntermediateType::ansi(AnsiType::Text), PostgresType::Text));
    }
}
