//! jq filters over API responses, backed by `jaq`.
//!
//! Filters run against a response after `--items-only` has been applied. A filter may
//! produce any number of outputs; each one is printed on its own.

use crate::error::{Result, ShoplineError};
use jaq_core::load::{Arena, File, Loader};
use jaq_core::{compile, load, Ctx, RcIter};
use jaq_json::Val;
use serde_json::{Map, Number, Value};
use std::path::PathBuf;
use std::rc::Rc;

/// Compiles `filter` and runs it on `input`, collecting every output.
pub fn run(filter: &str, input: &Value) -> Result<Vec<Value>> {
    let arena = Arena::default();
    let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let file = File {
        path: PathBuf::from("<query>"),
        code: filter,
    };
    let modules = loader
        .load(&arena, file)
        .map_err(|errs| ShoplineError::InvalidQuery(load_errors(&errs)))?;
    let compiled = compile::Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| ShoplineError::InvalidQuery(compile_errors(&errs)))?;

    let inputs = RcIter::new(core::iter::empty());
    let ctx = Ctx::new(Vec::<Val>::new(), &inputs);
    compiled
        .run((ctx, to_jaq(input)))
        .map(|out| {
            out.map(|val| from_jaq(&val))
                .map_err(|e| ShoplineError::QueryFailed(e.to_string()))
        })
        .collect()
}

fn load_errors(errs: &load::Errors<&str, PathBuf>) -> String {
    errs.iter()
        .map(|(_, error)| format!("{:?}", error))
        .collect::<Vec<_>>()
        .join("; ")
}

fn compile_errors(errs: &compile::Errors<&str, PathBuf>) -> String {
    errs.iter()
        .flat_map(|(_, errors)| errors.iter().map(|e| e.0.to_string()))
        .collect::<Vec<_>>()
        .join("; ")
}

fn to_jaq(value: &Value) -> Val {
    match value {
        Value::Null => Val::Null,
        Value::Bool(b) => Val::Bool(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => isize::try_from(i)
                .map(Val::Int)
                .unwrap_or_else(|_| Val::Num(Rc::new(i.to_string()))),
            (None, Some(f)) if n.is_f64() => Val::Float(f),
            _ => Val::Num(Rc::new(n.to_string())),
        },
        Value::String(s) => Val::Str(Rc::new(s.clone())),
        Value::Array(items) => Val::Arr(Rc::new(items.iter().map(to_jaq).collect())),
        Value::Object(map) => Val::Obj(Rc::new(
            map.iter()
                .map(|(k, v)| (Rc::new(k.clone()), to_jaq(v)))
                .collect(),
        )),
    }
}

fn from_jaq(val: &Val) -> Value {
    match val {
        Val::Null => Value::Null,
        Val::Bool(b) => Value::Bool(*b),
        Val::Int(i) => Value::Number((*i as i64).into()),
        Val::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Val::Num(s) => serde_json::from_str::<Number>(s)
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(s.to_string())),
        Val::Str(s) => Value::String(s.to_string()),
        Val::Arr(items) => Value::Array(items.iter().map(from_jaq).collect()),
        Val::Obj(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), from_jaq(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders() -> Value {
        json!({
            "items": [
                {"id": "ord_1", "status": "open", "total_price": 12.5},
                {"id": "ord_2", "status": "closed", "total_price": 3}
            ],
            "total_count": 2
        })
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            run(".items[].id", &orders()).unwrap(),
            vec![json!("ord_1"), json!("ord_2")]
        );
        assert_eq!(run(".total_count", &orders()).unwrap(), vec![json!(2)]);
        assert_eq!(run(".missing.deeper", &orders()).unwrap(), vec![Value::Null]);
        assert_eq!(run(".", &orders()).unwrap(), vec![orders()]);
    }

    #[test]
    fn test_pipes_and_builtins() {
        assert_eq!(
            run(".items[] | .id", &orders()).unwrap(),
            vec![json!("ord_1"), json!("ord_2")]
        );
        assert_eq!(
            run(r#".items[] | select(.status == "open") | .id"#, &orders()).unwrap(),
            vec![json!("ord_1")]
        );
        assert_eq!(run(".items | length", &orders()).unwrap(), vec![json!(2)]);
        assert_eq!(run(".items[-1].id", &orders()).unwrap(), vec![json!("ord_2")]);
        assert_eq!(
            run("[.items[].total_price] | add", &orders()).unwrap(),
            vec![json!(15.5)]
        );
        assert_eq!(
            run(".items | map({id, status})", &orders()).unwrap(),
            vec![json!([
                {"id": "ord_1", "status": "open"},
                {"id": "ord_2", "status": "closed"}
            ])]
        );
    }

    #[test]
    fn test_syntax_error_is_invalid_query() {
        assert!(matches!(
            run(".items[", &orders()),
            Err(ShoplineError::InvalidQuery(_))
        ));
        assert!(matches!(
            run("nosuchfn(1)", &orders()),
            Err(ShoplineError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_runtime_error_is_query_failed() {
        assert!(matches!(
            run(".total_count[]", &orders()),
            Err(ShoplineError::QueryFailed(_))
        ));
    }
}
