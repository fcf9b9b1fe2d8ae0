//! Function library for rule expressions
//!
//! Functions are referenced as `prefix:name(args)` (or `name(args)` without a
//! prefix). A reference is checked against the registry when an expression is
//! compiled, so a rule naming an unknown function never reaches evaluation.

use crate::error::{Result, RuntimeError};
use ruleguard_core::Value;
use std::collections::HashMap;
use std::fmt;

/// Native implementation of a rule function
pub type NativeFunction = fn(&[Value]) -> Result<Value>;

/// A registered function
#[derive(Clone)]
pub struct FunctionDef {
    pub name: String,
    /// Exact argument count, `None` for variadic functions
    pub arity: Option<usize>,
    pub func: NativeFunction,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl FunctionDef {
    /// Check arity and invoke
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        if let Some(expected) = self.arity {
            if args.len() != expected {
                return Err(RuntimeError::Arity {
                    name: self.name.clone(),
                    expected,
                    actual: args.len(),
                });
            }
        }
        (self.func)(args)
    }
}

/// Registry of functions available to rules
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Registry with no functions
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `fn:` string and collection library
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("fn:contains", Some(2), fn_contains);
        registry.register("fn:containsIgnoreCase", Some(2), fn_contains_ignore_case);
        registry.register("fn:startsWith", Some(2), fn_starts_with);
        registry.register("fn:endsWith", Some(2), fn_ends_with);
        registry.register("fn:indexOf", Some(2), fn_index_of);
        registry.register("fn:length", Some(1), fn_length);
        registry.register("fn:toLowerCase", Some(1), fn_to_lower_case);
        registry.register("fn:toUpperCase", Some(1), fn_to_upper_case);
        registry.register("fn:trim", Some(1), fn_trim);
        registry.register("fn:substring", Some(3), fn_substring);
        registry.register("fn:join", Some(2), fn_join);
        registry
    }

    /// Register a function under its qualified name, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, arity: Option<usize>, func: NativeFunction) {
        let name = name.into();
        self.functions.insert(
            name.clone(),
            FunctionDef { name, arity, func },
        );
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        arity: Option<usize>,
        func: NativeFunction,
    ) -> Self {
        self.register(name, arity, func);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Invoke a function by name
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.get(name)
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))?
            .call(args)
    }
}

// =============================================================================
// Standard library
// =============================================================================

// Null reads as the empty string, like the rest of string coercion
fn text(value: &Value) -> String {
    value.to_string()
}

fn fn_contains(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Array(items) => Ok(Value::Bool(items.contains(&args[1]))),
        haystack => Ok(Value::Bool(text(haystack).contains(&text(&args[1])))),
    }
}

fn fn_contains_ignore_case(args: &[Value]) -> Result<Value> {
    let haystack = text(&args[0]).to_lowercase();
    let needle = text(&args[1]).to_lowercase();
    Ok(Value::Bool(haystack.contains(&needle)))
}

fn fn_starts_with(args: &[Value]) -> Result<Value> {
    Ok(Value::Bool(text(&args[0]).starts_with(&text(&args[1]))))
}

fn fn_ends_with(args: &[Value]) -> Result<Value> {
    Ok(Value::Bool(text(&args[0]).ends_with(&text(&args[1]))))
}

fn fn_index_of(args: &[Value]) -> Result<Value> {
    let haystack = text(&args[0]);
    let index = haystack
        .find(&text(&args[1]))
        .map(|byte| haystack[..byte].chars().count() as f64)
        .unwrap_or(-1.0);
    Ok(Value::Number(index))
}

fn fn_length(args: &[Value]) -> Result<Value> {
    let len = match &args[0] {
        Value::Null => 0,
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => text(other).chars().count(),
    };
    Ok(Value::Number(len as f64))
}

fn fn_to_lower_case(args: &[Value]) -> Result<Value> {
    Ok(Value::String(text(&args[0]).to_lowercase()))
}

fn fn_to_upper_case(args: &[Value]) -> Result<Value> {
    Ok(Value::String(text(&args[0]).to_uppercase()))
}

fn fn_trim(args: &[Value]) -> Result<Value> {
    Ok(Value::String(text(&args[0]).trim().to_string()))
}

fn fn_substring(args: &[Value]) -> Result<Value> {
    let chars: Vec<char> = text(&args[0]).chars().collect();
    let bound = |value: &Value, default: usize| -> Result<usize> {
        match value {
            Value::Null => Ok(default),
            other => {
                let n = crate::operators::to_number(other)?;
                Ok(if n < 0.0 { default } else { (n as usize).min(chars.len()) })
            }
        }
    };
    let begin = bound(&args[1], 0)?;
    let end = bound(&args[2], chars.len())?;
    if begin >= end {
        return Ok(Value::String(String::new()));
    }
    Ok(Value::String(chars[begin..end].iter().collect()))
}

fn fn_join(args: &[Value]) -> Result<Value> {
    match &args[0] {
        Value::Array(items) => {
            let separator = text(&args[1]);
            let parts: Vec<String> = items.iter().map(text).collect();
            Ok(Value::String(parts.join(&separator)))
        }
        Value::Null => Ok(Value::String(String::new())),
        other => Err(RuntimeError::TypeError(format!(
            "fn:join expects an array, got {}",
            other.type_name()
        ))),
    }
}
