//! Starlark request scripts.

use ::starlark::environment::{GlobalsBuilder, LibraryExtension, Module};
use ::starlark::eval::Evaluator;
use ::starlark::syntax::{AstModule, Dialect};
use ::starlark::values::dict::{AllocDict, DictRef};
use ::starlark::values::list::{AllocList, ListRef};
use ::starlark::values::tuple::TupleRef;
use ::starlark::values::{Heap, Value as StarValue};
use serde_json::{Map, Value};

use super::{
    ScriptContext, ScriptError, ScriptErrorKind, ScriptEvaluator, ScriptOutput, MAX_VALUE_DEPTH,
    OUTPUT_FIELDS, PREVIOUS_RESPONSE_GLOBAL,
};
use crate::model::ScriptDialect;

const DIALECT: ScriptDialect = ScriptDialect::Starlark;

/// Evaluates Starlark modules.
///
/// A trailing expression must evaluate to a dict, which becomes the
/// record. Without one, the module's top-level `url`, `method`, `headers`,
/// `body`, `auth`, `options` and `output` bindings form the record.
pub struct StarlarkEvaluator;

impl ScriptEvaluator for StarlarkEvaluator {
    fn dialect(&self) -> ScriptDialect {
        DIALECT
    }

    fn evaluate(&self, script: &str, context: &ScriptContext) -> Result<ScriptOutput, ScriptError> {
        let ast = AstModule::parse("request.star", script.to_owned(), &Dialect::Extended)
            .map_err(|e| ScriptError::new(DIALECT, ScriptErrorKind::Syntax, e.to_string()))?;

        let globals = GlobalsBuilder::extended_by(&[
            LibraryExtension::Json,
            LibraryExtension::StructType,
            LibraryExtension::Map,
            LibraryExtension::Filter,
        ])
        .build();

        let module = Module::new();
        let heap = module.heap();
        module.set(
            PREVIOUS_RESPONSE_GLOBAL,
            json_to_value(heap, &context.previous_response),
        );
        module.set(
            &context.profile_namespace,
            heap.alloc(AllocDict(
                context
                    .profile
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )),
        );

        let record = {
            let mut eval = Evaluator::new(&module);
            let produced = eval
                .eval_module(ast, &globals)
                .map_err(|e| ScriptError::runtime(DIALECT, e.to_string()))?;

            if produced.is_none() {
                record_from_bindings(&module)
            } else if DictRef::from_value(produced).is_some() {
                match value_to_json(produced, 0) {
                    Ok(Value::Object(map)) => Ok(map),
                    Ok(_) => Ok(Map::new()),
                    Err(e) => Err(e),
                }
            } else {
                return Err(ScriptError::unexpected_type(
                    DIALECT,
                    "dict",
                    produced.get_type(),
                ));
            }
        }
        .map_err(|message| ScriptError::new(DIALECT, ScriptErrorKind::InvalidOutput, message))?;

        ScriptOutput::from_record(DIALECT, record)
    }
}

fn record_from_bindings(module: &Module) -> Result<Map<String, Value>, String> {
    let mut record = Map::new();
    for field in OUTPUT_FIELDS {
        if let Some(value) = module.get(field) {
            record.insert(field.to_string(), value_to_json(value, 0)?);
        }
    }
    Ok(record)
}

fn json_to_value<'v>(heap: &'v Heap, value: &Value) -> StarValue<'v> {
    match value {
        Value::Null => StarValue::new_none(),
        Value::Bool(b) => StarValue::new_bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => heap.alloc(i),
            None => heap.alloc(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => heap.alloc(s.as_str()),
        Value::Array(items) => heap.alloc(AllocList(
            items.iter().map(|item| json_to_value(heap, item)),
        )),
        Value::Object(map) => heap.alloc(AllocDict(
            map.iter().map(|(k, v)| (k.as_str(), json_to_value(heap, v))),
        )),
    }
}

fn value_to_json(value: StarValue<'_>, depth: usize) -> Result<Value, String> {
    if depth > MAX_VALUE_DEPTH {
        return Err("value nested too deeply".to_string());
    }
    if value.is_none() {
        return Ok(Value::Null);
    }
    if let Some(b) = value.unpack_bool() {
        return Ok(Value::Bool(b));
    }
    if let Some(s) = value.unpack_str() {
        return Ok(Value::String(s.to_owned()));
    }
    if let Some(dict) = DictRef::from_value(value) {
        let mut map = Map::new();
        for (k, v) in dict.iter() {
            let key = match k.unpack_str() {
                Some(s) => s.to_owned(),
                None => k.to_str(),
            };
            map.insert(key, value_to_json(v, depth + 1)?);
        }
        return Ok(Value::Object(map));
    }
    if let Some(list) = ListRef::from_value(value) {
        return list
            .iter()
            .map(|v| value_to_json(v, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }
    if let Some(tuple) = TupleRef::from_value(value) {
        return tuple
            .iter()
            .map(|v| value_to_json(v, depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }
    value.to_json_value().map_err(|e| e.to_string())
}
