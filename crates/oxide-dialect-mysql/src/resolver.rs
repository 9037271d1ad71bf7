//! The MySQL resolver layer.

use oxide_dialect_core::ast::{Expr, FunctionCall, JsonOperator, TypeName};
use oxide_dialect_core::resolver::{
    ResolveContext, TypeResolver, argument_types, returns_kind, window_function_type,
};
use oxide_dialect_core::types::{
    Affinity, IntermediateType, NUMERIC_ORDER, NativeType, PREFERENCE_ORDER, encapsulate,
    encapsulate_coalesced,
};

use crate::types::MySqlType;

/// MySQL column types, functions, window calls and JSON operators over the
/// ANSI root.
pub struct MySqlTypeResolver {
    parent: Box<dyn TypeResolver>,
}

impl MySqlTypeResolver {
    /// Wraps `parent`, normally the ANSI root.
    #[must_use]
    pub fn new(parent: Box<dyn TypeResolver>) -> Self {
        Self { parent }
    }
}

fn mysql(ty: MySqlType) -> IntermediateType {
    IntermediateType::new(ty.type_ref())
}

/// `SUM` and `AVG` of exact values are `DECIMAL`; of approximate ones `DOUBLE`.
fn exact_or_double(args: &[IntermediateType]) -> IntermediateType {
    let exact = args.iter().all(|arg| {
        arg.affinity() == Some(Affinity::Integer) || arg.kind().native() == Some(NativeType::Decimal)
    });
    if exact {
        mysql(MySqlType::Decimal).as_nullable()
    } else {
        mysql(MySqlType::Double).as_nullable()
    }
}

fn mysql_function_type(call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
    let text = MySqlType::Text.type_ref();
    let ty = match call.lookup_name().as_str() {
        "if" => {
            let args = argument_types(call, cx);
            encapsulate(args.get(1..).unwrap_or_default(), PREFERENCE_ORDER, false)
        }
        "ifnull" => encapsulate_coalesced(&argument_types(call, cx), PREFERENCE_ORDER),
        "sum" | "avg" => exact_or_double(&argument_types(call, cx)),
        "greatest" | "least" => encapsulate(&argument_types(call, cx), PREFERENCE_ORDER, false),
        "floor" | "ceil" | "ceiling" => encapsulate(&argument_types(call, cx), NUMERIC_ORDER, false),
        "rand" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Double)
        }
        "concat" | "left" | "right" | "lpad" | "rpad" | "repeat" | "reverse" => {
            returns_kind(text, &argument_types(call, cx))
        }
        // NULL arguments after the separator are skipped
        "concat_ws" => {
            let args = argument_types(call, cx);
            returns_kind(text, args.get(..1).unwrap_or_default())
        }
        "group_concat" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Text).as_nullable()
        }
        "char_length" | "character_length" | "locate" | "unix_timestamp" => {
            returns_kind(MySqlType::BigInt.type_ref(), &argument_types(call, cx))
        }
        "last_insert_id" | "found_rows" | "row_count" | "connection_id" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::BigInt)
        }
        "now" | "current_timestamp" | "sysdate" | "utc_timestamp" | "localtime"
        | "localtimestamp" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::DateTime)
        }
        "curdate" | "current_date" | "utc_date" => mysql(MySqlType::Date),
        "curtime" | "current_time" | "utc_time" => mysql(MySqlType::Time),
        // invalid dates yield NULL
        "date" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Date).as_nullable()
        }
        "year" | "month" | "day" | "dayofmonth" | "hour" | "minute" | "second" | "datediff" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Int).as_nullable()
        }
        "date_format" | "from_unixtime" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::VarChar).as_nullable()
        }
        "uuid" => mysql(MySqlType::Char),
        "md5" | "sha1" | "sha2" => returns_kind(MySqlType::Char.type_ref(), &argument_types(call, cx)),
        "json_object" | "json_array" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Json)
        }
        "json_extract" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Json).as_nullable()
        }
        "json_unquote" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Text).as_nullable()
        }
        "json_length" | "json_contains" => {
            let _ = argument_types(call, cx);
            mysql(MySqlType::Int).as_nullable()
        }
        "json_valid" => returns_kind(MySqlType::Boolean.type_ref(), &argument_types(call, cx)),
        _ => return None,
    };
    Some(ty)
}

impl TypeResolver for MySqlTypeResolver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn parent(&self) -> Option<&dyn TypeResolver> {
        Some(self.parent.as_ref())
    }

    fn declares_type(&self, type_name: &TypeName) -> bool {
        MySqlType::from_type_name(type_name).is_some() || self.parent.declares_type(type_name)
    }

    fn definition_type(&self, type_name: &TypeName) -> IntermediateType {
        MySqlType::from_type_name(type_name)
            .map_or_else(|| self.parent.definition_type(type_name), mysql)
    }

    fn resolved_type(&self, expr: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        match expr {
            Expr::Function(call) if call.over.is_some() => {
                window_function_type(call, cx).unwrap_or_else(|| self.parent.resolved_type(expr, cx))
            }
            // a missing path yields NULL
            Expr::Json { left, op, right } => {
                let _ = cx.type_of(left);
                let _ = cx.type_of(right);
                match op {
                    JsonOperator::Extract => mysql(MySqlType::Json).as_nullable(),
                    JsonOperator::ExtractText => mysql(MySqlType::Text).as_nullable(),
                }
            }
            _ => self.parent.resolved_type(expr, cx),
        }
    }

    fn function_type(&self, call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
        mysql_function_type(call, cx).or_else(|| self.parent.function_type(call, cx))
    }
}
