use std::collections::HashMap;

use crate::types::ty::Type;

/// Type signature for a built-in function. An arity of -1 marks a
/// variadic builtin whose parameters all accept `Any`.
#[derive(Debug, Clone)]
pub struct BuiltinSignature {
    pub name: &'static str,
    pub arity: i32,
    pub params: Vec<Type>,
    pub ret: Type,
}

impl BuiltinSignature {
    fn new(name: &'static str, arity: i32, params: Vec<Type>, ret: Type) -> Self {
        Self {
            name,
            arity,
            params,
            ret,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.arity < 0
    }
}

/// Built-in signature database.
pub fn builtin_signatures() -> HashMap<&'static str, BuiltinSignature> {
    let mut sigs = HashMap::new();

    macro_rules! sig {
        ($name:expr, $arity:expr, $params:expr, $ret:expr) => {
            sigs.insert($name, BuiltinSignature::new($name, $arity, $params, $ret));
        };
    }

    sig!("print", -1, vec![], Type::Void);
    sig!("println", -1, vec![], Type::Void);
    sig!("string", 1, vec![Type::Any], Type::String);

    sigs
}
