//! Lua request scripts (Lua 5.4 via mlua).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use mlua::{HookTriggers, Lua, LuaOptions, LuaSerdeExt, StdLib, Table, Value as LuaValue, VmState};
use serde_json::{Map, Number, Value};

use super::{
    ScriptContext, ScriptError, ScriptErrorKind, ScriptEvaluator, ScriptOutput, MAX_VALUE_DEPTH,
    PREVIOUS_RESPONSE_GLOBAL,
};
use crate::model::ScriptDialect;

/// Instructions between deadline checks.
const HOOK_INSTRUCTIONS: u32 = 10_000;

const DIALECT: ScriptDialect = ScriptDialect::Lua;

/// Base-library functions that reach the filesystem or compile new chunks.
const REMOVED_BASE_GLOBALS: [&str; 3] = ["dofile", "loadfile", "load"];

/// Evaluates Lua chunks; the chunk must `return` a table.
///
/// The base library plus `table`, `string`, `math` and `utf8` are loaded;
/// the base chunk loaders (`dofile`, `loadfile`, `load`) are removed.
pub struct LuaEvaluator;

impl ScriptEvaluator for LuaEvaluator {
    fn dialect(&self) -> ScriptDialect {
        DIALECT
    }

    fn evaluate(&self, script: &str, context: &ScriptContext) -> Result<ScriptOutput, ScriptError> {
        let lua = Lua::new_with(
            StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8,
            LuaOptions::default(),
        )
        .map_err(|e| ScriptError::runtime(DIALECT, e.to_string()))?;

        let timed_out = Arc::new(AtomicBool::new(false));
        if let Some(limit) = context.timeout {
            let deadline = Instant::now() + limit;
            let flag = Arc::clone(&timed_out);
            lua.set_hook(
                HookTriggers::new().every_nth_instruction(HOOK_INSTRUCTIONS),
                move |_lua, _debug| {
                    if Instant::now() >= deadline {
                        flag.store(true, Ordering::Relaxed);
                        Err(mlua::Error::runtime("script exceeded its time budget"))
                    } else {
                        Ok(VmState::Continue)
                    }
                },
            );
        }

        inject_globals(&lua, context).map_err(|e| ScriptError::runtime(DIALECT, e.to_string()))?;

        let produced: LuaValue = lua
            .load(script)
            .set_name("request")
            .eval()
            .map_err(|e| classify(e, timed_out.load(Ordering::Relaxed), context))?;

        let table = match produced {
            LuaValue::Table(table) => table,
            other => return Err(ScriptError::unexpected_type(DIALECT, "table", other.type_name())),
        };

        let record = match table_to_json(&table, 0) {
            Ok(Value::Object(map)) => map,
            // A sequence-shaped table is still a table, just one with no named fields.
            Ok(_) => Map::new(),
            Err(message) => {
                return Err(ScriptError::new(DIALECT, ScriptErrorKind::InvalidOutput, message))
            }
        };
        ScriptOutput::from_record(DIALECT, record)
    }
}

fn inject_globals(lua: &Lua, context: &ScriptContext) -> mlua::Result<()> {
    let globals = lua.globals();
    for name in REMOVED_BASE_GLOBALS {
        globals.set(name, LuaValue::Nil)?;
    }
    globals.set(
        PREVIOUS_RESPONSE_GLOBAL,
        lua.to_value(&context.previous_response)?,
    )?;
    globals.set(
        context.profile_namespace.as_str(),
        lua.to_value(&context.profile)?,
    )?;
    Ok(())
}

fn classify(error: mlua::Error, timed_out: bool, context: &ScriptContext) -> ScriptError {
    if timed_out {
        if let Some(limit) = context.timeout {
            return ScriptError::timeout(DIALECT, limit);
        }
    }
    let kind = match error {
        mlua::Error::SyntaxError { .. } => ScriptErrorKind::Syntax,
        _ => ScriptErrorKind::Runtime,
    };
    ScriptError::new(DIALECT, kind, error.to_string())
}

fn lua_to_json(value: LuaValue, depth: usize) -> Result<Value, String> {
    match value {
        LuaValue::Nil => Ok(Value::Null),
        LuaValue::Boolean(b) => Ok(Value::Bool(b)),
        LuaValue::Integer(i) => Ok(Value::from(i)),
        LuaValue::Number(n) => Ok(Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)),
        LuaValue::String(s) => Ok(Value::String(s.to_string_lossy().to_string())),
        LuaValue::Table(t) => table_to_json(&t, depth + 1),
        LuaValue::LightUserData(ud) if ud.0.is_null() => Ok(Value::Null),
        other => Err(format!("unsupported value of type {}", other.type_name())),
    }
}

/// Tables with keys exactly `1..=n` become arrays; any other table becomes
/// an object whose keys are stringified.
fn table_to_json(table: &Table, depth: usize) -> Result<Value, String> {
    if depth > MAX_VALUE_DEPTH {
        return Err("table nested too deeply".to_string());
    }

    let mut pairs = Vec::new();
    for pair in table.clone().pairs::<LuaValue, LuaValue>() {
        pairs.push(pair.map_err(|e| e.to_string())?);
    }

    let len = table.raw_len();
    if len > 0 && pairs.len() == len {
        if let Some(items) = as_sequence(&pairs, len) {
            let mut array = vec![Value::Null; len];
            for (idx, value) in items {
                array[idx] = lua_to_json(value, depth)?;
            }
            return Ok(Value::Array(array));
        }
    }

    let mut map = Map::with_capacity(pairs.len());
    for (key, value) in pairs {
        map.insert(key_to_string(&key)?, lua_to_json(value, depth)?);
    }
    Ok(Value::Object(map))
}

fn as_sequence(pairs: &[(LuaValue, LuaValue)], len: usize) -> Option<Vec<(usize, LuaValue)>> {
    pairs
        .iter()
        .map(|(key, value)| match key {
            LuaValue::Integer(i) if *i >= 1 && (*i as usize) <= len => {
                Some((*i as usize - 1, value.clone()))
            }
            _ => None,
        })
        .collect()
}

fn key_to_string(key: &LuaValue) -> Result<String, String> {
    match key {
        LuaValue::String(s) => Ok(s.to_string_lossy().to_string()),
        LuaValue::Integer(i) => Ok(i.to_string()),
        LuaValue::Number(n) => Ok(n.to_string()),
        LuaValue::Boolean(b) => Ok(b.to_string()),
        other => Err(format!("unsupported table key of type {}", other.type_name())),
    }
}
