use std::collections::HashMap;

use super::value::Value;
use super::OutputSink;

/// Runtime descriptor for a built-in function. An arity of -1 marks a
/// variadic builtin.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: i32,
}

pub fn builtin_table() -> HashMap<&'static str, Builtin> {
    let mut table = HashMap::new();
    for builtin in [
        Builtin { name: "print", arity: -1 },
        Builtin { name: "println", arity: -1 },
        Builtin { name: "string", arity: 1 },
    ] {
        table.insert(builtin.name, builtin);
    }
    table
}

pub fn call_builtin(name: &str, args: &[Value], sink: &mut dyn OutputSink) -> Value {
    match name {
        "print" => {
            sink.write(&concat(args));
            Value::Null
        }
        "println" => {
            sink.write_line(&concat(args));
            Value::Null
        }
        "string" => args
            .first()
            .map(|value| Value::string(value.to_string()))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn concat(args: &[Value]) -> String {
    args.iter().map(Value::to_string).collect()
}
