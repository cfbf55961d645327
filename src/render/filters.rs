//! Built-in Tera filters: case conversion and number formatting.

use std::collections::HashMap;

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use tera::{Result, Tera, Value};

use crate::utils::format;

/// Register every built-in filter on `tera`.
pub(crate) fn register_builtin(tera: &mut Tera) {
    tera.register_filter("snake_case", snake_case);
    tera.register_filter("pascal_case", pascal_case);
    tera.register_filter("camel_case", camel_case);
    tera.register_filter("kebab_case", kebab_case);
    tera.register_filter("fmt", fmt);
    tera.register_filter("sig", sig);
    tera.register_filter("fixed", fixed);
    tera.register_filter("repr", repr);
}

fn expect_str<'a>(value: &'a Value, filter: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| tera::Error::msg(format!("{} filter expects a string", filter)))
}

fn expect_f64(value: &Value, filter: &str) -> Result<f64> {
    value.as_f64().ok_or_else(|| tera::Error::msg(format!("{} filter expects a number", filter)))
}

fn usize_arg(args: &HashMap<String, Value>, name: &str, default: usize) -> Result<usize> {
    match args.get(name) {
        None => Ok(default),
        Some(v) => v.as_u64().map(|n| n as usize).ok_or_else(|| {
            tera::Error::msg(format!("argument '{}' must be a non-negative integer", name))
        }),
    }
}

pub(crate) fn snake_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "snake_case")?.to_snake_case()))
}

pub(crate) fn pascal_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "pascal_case")?.to_pascal_case()))
}

pub(crate) fn camel_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "camel_case")?.to_lower_camel_case()))
}

pub(crate) fn kebab_case(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(expect_str(value, "kebab_case")?.to_kebab_case()))
}

/// `{{ x | fmt(spec=".3f") }}`: format spec.
pub(crate) fn fmt(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let spec = match args.get("spec") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(tera::Error::msg("fmt filter: 'spec' must be a string")),
        None => "",
    };
    format::format_value(value, spec)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("fmt filter: {}", e)))
}

/// `{{ x | sig(n=3) }}`: significant figures.
pub(crate) fn sig(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let n = usize_arg(args, "n", 3)?;
    Ok(Value::String(format::significant(expect_f64(value, "sig")?, n)))
}

/// `{{ x | fixed(n=2) }}`: decimal places.
pub(crate) fn fixed(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let n = usize_arg(args, "n", 2)?;
    Ok(Value::String(format!("{:.*}", n, expect_f64(value, "fixed")?)))
}

/// `{{ x | repr }}`: shortest round-trip float text with a two-digit exponent.
pub(crate) fn repr(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    match value {
        Value::Number(n) if n.is_f64() => {
            Ok(Value::String(format::repr(n.as_f64().unwrap_or(f64::NAN))))
        }
        Value::Number(n) => Ok(Value::String(n.to_string())),
        _ => Err(tera::Error::msg("repr filter expects a number")),
    }
}
