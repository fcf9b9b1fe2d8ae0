//! Tree-walking evaluator

use crate::error::{Result, RuntimeError};
use crate::functions::FunctionRegistry;
use crate::operators::{
    execute_arithmetic, execute_compare, execute_concatenation, execute_empty, execute_negate,
    execute_not, to_bool, to_number,
};
use crate::resolver::VariableResolver;
use ruleguard_core::{LiteralKind, Node, NodeId, NodeKind, SyntaxTree, Value};
use ruleguard_parser::lexer::unquote;

/// Evaluates one syntax tree against a resolver
pub struct Evaluator<'a> {
    tree: &'a SyntaxTree,
    functions: &'a FunctionRegistry,
    resolver: &'a dyn VariableResolver,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        functions: &'a FunctionRegistry,
        resolver: &'a dyn VariableResolver,
    ) -> Self {
        Self {
            tree,
            functions,
            resolver,
        }
    }

    /// Evaluate the whole tree
    pub fn evaluate(&self) -> Result<Value> {
        self.eval(self.tree.root_id())
    }

    fn child(&self, node: &Node, index: usize) -> Result<&'a Node> {
        let id = node.children.get(index).copied().ok_or_else(|| {
            RuntimeError::TypeError(format!("{:?} node is missing operand {}", node.kind, index))
        })?;
        Ok(self.tree.node(id)?)
    }

    fn eval_child(&self, node: &Node, index: usize) -> Result<Value> {
        let id = node.children.get(index).copied().ok_or_else(|| {
            RuntimeError::TypeError(format!("{:?} node is missing operand {}", node.kind, index))
        })?;
        self.eval(id)
    }

    fn eval(&self, id: NodeId) -> Result<Value> {
        let node = self.tree.node(id)?;
        match node.kind {
            NodeKind::Literal(kind) => literal(node, kind),
            NodeKind::Identifier => {
                let name = image(node)?;
                self.resolver
                    .resolve(name)
                    .ok_or_else(|| RuntimeError::UnknownIdentifier(name.to_string()))
            }
            NodeKind::Compare(op) => {
                let left = self.eval_child(node, 0)?;
                let right = self.eval_child(node, 1)?;
                execute_compare(&left, op, &right).map(Value::Bool)
            }
            NodeKind::And => {
                for child in &node.children {
                    if !to_bool(&self.eval(*child)?)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            NodeKind::Or => {
                for child in &node.children {
                    if to_bool(&self.eval(*child)?)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            NodeKind::Not => execute_not(&self.eval_child(node, 0)?),
            NodeKind::Negate => execute_negate(&self.eval_child(node, 0)?),
            NodeKind::Empty => Ok(execute_empty(&self.eval_child(node, 0)?)),
            NodeKind::Arithmetic(op) => {
                let left = self.eval_child(node, 0)?;
                let right = self.eval_child(node, 1)?;
                execute_arithmetic(&left, op, &right)
            }
            NodeKind::Concatenation => {
                let left = self.eval_child(node, 0)?;
                let right = self.eval_child(node, 1)?;
                Ok(execute_concatenation(&left, &right))
            }
            NodeKind::Ternary => {
                if to_bool(&self.eval_child(node, 0)?)? {
                    self.eval_child(node, 1)
                } else {
                    self.eval_child(node, 2)
                }
            }
            NodeKind::Property => {
                let target = self.eval_child(node, 0)?;
                let name = image(self.child(node, 1)?)?;
                property(&target, name)
            }
            NodeKind::Index => {
                let target = self.eval_child(node, 0)?;
                let index = self.eval_child(node, 1)?;
                index_into(&target, &index)
            }
            NodeKind::MethodCall => {
                let target = self.eval_child(node, 0)?;
                let name = image(self.child(node, 1)?)?;
                let args = self.eval_all(self.child(node, 2)?)?;
                call_method(&target, name, &args)
            }
            NodeKind::Function => {
                let name = image(node)?;
                let args = self.eval_all(node)?;
                tracing::trace!("Calling {} with {} argument(s)", name, args.len());
                self.functions.call(name, &args)
            }
            NodeKind::List => Ok(Value::Array(self.eval_all(node)?)),
            NodeKind::Assign => Err(RuntimeError::Unsupported(
                "assignment to a read-only context".to_string(),
            )),
            NodeKind::Arrow | NodeKind::LambdaParameters => {
                Err(RuntimeError::Unsupported("lambda expression".to_string()))
            }
            NodeKind::Member | NodeKind::Arguments => Err(RuntimeError::TypeError(format!(
                "{:?} node cannot be evaluated on its own",
                node.kind
            ))),
        }
    }

    fn eval_all(&self, node: &Node) -> Result<Vec<Value>> {
        node.children.iter().map(|id| self.eval(*id)).collect()
    }
}

fn image(node: &Node) -> Result<&str> {
    node.image()
        .ok_or_else(|| RuntimeError::TypeError(format!("{:?} node has no source text", node.kind)))
}

fn literal(node: &Node, kind: LiteralKind) -> Result<Value> {
    let text = image(node)?;
    match kind {
        LiteralKind::Null => Ok(Value::Null),
        LiteralKind::Boolean => Ok(Value::Bool(text == "true")),
        LiteralKind::Number => text
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| RuntimeError::TypeError(format!("Invalid number literal '{}'", text))),
        LiteralKind::String => unquote(text)
            .map(Value::String)
            .ok_or_else(|| RuntimeError::TypeError(format!("Invalid string literal {}", text))),
    }
}

fn property(target: &Value, name: &str) -> Result<Value> {
    match target {
        Value::Null => Ok(Value::Null),
        Value::Object(_) => Ok(target.get(name).cloned().unwrap_or(Value::Null)),
        other => Err(RuntimeError::PropertyNotFound {
            property: name.to_string(),
            type_name: other.type_name(),
        }),
    }
}

fn index_into(target: &Value, index: &Value) -> Result<Value> {
    match (target, index) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Array(items), index) => {
            let i = to_number(index)?;
            if i < 0.0 || i.fract() != 0.0 {
                return Ok(Value::Null);
            }
            Ok(items.get(i as usize).cloned().unwrap_or(Value::Null))
        }
        (Value::Object(map), key) => Ok(map.get(&key.to_string()).cloned().unwrap_or(Value::Null)),
        (other, _) => Err(RuntimeError::TypeError(format!(
            "Cannot index into {}",
            other.type_name()
        ))),
    }
}

fn expect_args(method: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(RuntimeError::Arity {
            name: method.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn call_method(target: &Value, method: &str, args: &[Value]) -> Result<Value> {
    match (target, method) {
        (Value::String(s), "contains") => {
            expect_args(method, args, 1)?;
            Ok(Value::Bool(s.contains(&args[0].to_string())))
        }
        (Value::String(s), "startsWith") => {
            expect_args(method, args, 1)?;
            Ok(Value::Bool(s.starts_with(&args[0].to_string())))
        }
        (Value::String(s), "endsWith") => {
            expect_args(method, args, 1)?;
            Ok(Value::Bool(s.ends_with(&args[0].to_string())))
        }
        (Value::String(s), "equals") => {
            expect_args(method, args, 1)?;
            Ok(Value::Bool(args[0].as_str() == Some(s.as_str())))
        }
        (Value::String(s), "equalsIgnoreCase") => {
            expect_args(method, args, 1)?;
            Ok(Value::Bool(s.eq_ignore_ascii_case(&args[0].to_string())))
        }
        (Value::String(s), "toLowerCase") => {
            expect_args(method, args, 0)?;
            Ok(Value::String(s.to_lowercase()))
        }
        (Value::String(s), "toUpperCase") => {
            expect_args(method, args, 0)?;
            Ok(Value::String(s.to_uppercase()))
        }
        (Value::String(s), "trim") => {
            expect_args(method, args, 0)?;
            Ok(Value::String(s.trim().to_string()))
        }
        (Value::String(s), "length") => {
            expect_args(method, args, 0)?;
            Ok(Value::Number(s.chars().count() as f64))
        }
        (Value::String(s), "isEmpty") => {
            expect_args(method, args, 0)?;
            Ok(Value::Bool(s.is_empty()))
        }
        (Value::Array(items), "contains") => {
            expect_args(method, args, 1)?;
            Ok(Value::Bool(items.contains(&args[0])))
        }
        (Value::Array(items), "size") => {
            expect_args(method, args, 0)?;
            Ok(Value::Number(items.len() as f64))
        }
        (Value::Array(items), "isEmpty") => {
            expect_args(method, args, 0)?;
            Ok(Value::Bool(items.is_empty()))
        }
        (Value::Object(map), "containsKey") => {
            expect_args(method, args, 1)?;
            Ok(Value::Bool(map.contains_key(&args[0].to_string())))
        }
        (Value::Object(map), "size") => {
            expect_args(method, args, 0)?;
            Ok(Value::Number(map.len() as f64))
        }
        (Value::Object(map), "isEmpty") => {
            expect_args(method, args, 0)?;
            Ok(Value::Bool(map.is_empty()))
        }
        (Value::Null, _) => Err(RuntimeError::NullOperand {
            op: format!(".{}()", method),
        }),
        (other, _) => Err(RuntimeError::MethodNotFound {
            method: method.to_string(),
            type_name: other.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MapResolver;
    use ruleguard_parser::ExpressionParser;

    fn eval_with(text: &str, resolver: &MapResolver) -> Result<Value> {
        let tree = ExpressionParser::parse(text)?;
        let functions = FunctionRegistry::standard();
        Evaluator::new(&tree, &functions, resolver).evaluate()
    }

    fn eval(text: &str) -> Result<Value> {
        eval_with(text, &MapResolver::new())
    }

    #[test]
    fn test_literals_and_arithmetic() {
        assert_eq!(eval("${1 + 2 * 3}").unwrap(), Value::Number(7.0));
        assert_eq!(eval("${10 div 4}").unwrap(), Value::Number(2.5));
        assert_eq!(eval("${-3 + 1}").unwrap(), Value::Number(-2.0));
        assert_eq!(eval("${'it\\'s'}").unwrap(), Value::from("it's"));
        assert_eq!(eval("${null}").unwrap(), Value::Null);
    }

    #[test]
    fn test_identifiers() {
        let resolver = MapResolver::new().with("country", "US");
        assert_eq!(
            eval_with("${country == 'US'}", &resolver).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval_with("${lang == 'en'}", &resolver),
            Err(RuntimeError::UnknownIdentifier("lang".to_string()))
        );
    }

    #[test]
    fn test_short_circuit() {
        // right side would fail if evaluated
        assert_eq!(eval("${false && missing > 1}").unwrap(), Value::Bool(false));
        assert_eq!(eval("${true || missing > 1}").unwrap(), Value::Bool(true));
        assert_eq!(
            eval("${true && 1 < 2 && false && missing > 1}").unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            eval("${false || 1 > 2 || true || missing > 1}").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(eval("${false || 1 > 2 || false}").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_long_or_chain() {
        let resolver = MapResolver::new().with("country", "US");
        let mut terms = vec!["country == 'x'"; 10_000];
        let rule = format!("${{{}}}", terms.join(" || "));
        assert_eq!(eval_with(&rule, &resolver).unwrap(), Value::Bool(false));

        terms.push("country == 'US'");
        let rule = format!("${{{}}}", terms.join(" || "));
        assert_eq!(eval_with(&rule, &resolver).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_ternary_and_empty() {
        let resolver = MapResolver::new().with("tags", Value::Array(vec![]));
        assert_eq!(
            eval_with("${empty tags ? 'none' : 'some'}", &resolver).unwrap(),
            Value::from("none")
        );
    }

    #[test]
    fn test_property_and_index() {
        let user: Value = serde_json::from_str(r#"{"address": {"country": "FR"}, "tags": ["a", "b"]}"#).unwrap();
        let resolver = MapResolver::new().with("user", user);

        assert_eq!(
            eval_with("${user.address.country}", &resolver).unwrap(),
            Value::from("FR")
        );
        assert_eq!(eval_with("${user.missing}", &resolver).unwrap(), Value::Null);
        assert_eq!(eval_with("${user.tags[1]}", &resolver).unwrap(), Value::from("b"));
        assert_eq!(eval_with("${user.tags[9]}", &resolver).unwrap(), Value::Null);
        assert_eq!(
            eval_with("${user['address']['country']}", &resolver).unwrap(),
            Value::from("FR")
        );
    }

    #[test]
    fn test_property_on_scalar_fails() {
        let resolver = MapResolver::new().with("age", 3);
        assert!(matches!(
            eval_with("${age.years}", &resolver),
            Err(RuntimeError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn test_methods() {
        let resolver = MapResolver::new()
            .with("ua", "Mozilla/5.0 (iPhone)")
            .with("langs", Value::Array(vec!["en".into(), "fr".into()]));

        assert_eq!(
            eval_with("${ua.contains('iPhone')}", &resolver).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval_with("${langs.contains('fr') && langs.size() == 2}", &resolver).unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            eval_with("${ua.explode()}", &resolver),
            Err(RuntimeError::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_functions() {
        let resolver = MapResolver::new().with("lang", "EN");
        assert_eq!(
            eval_with("${fn:toLowerCase(lang) == 'en'}", &resolver).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_null_operands() {
        let resolver = MapResolver::new().with("age", Value::Null);
        assert!(matches!(
            eval_with("${age > 18}", &resolver),
            Err(RuntimeError::NullOperand { .. })
        ));
        assert_eq!(
            eval_with("${age == null}", &resolver).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_unsupported_constructs() {
        assert!(matches!(eval("${x = 1}"), Err(RuntimeError::Unsupported(_))));
        assert!(matches!(eval("${x -> x}"), Err(RuntimeError::Unsupported(_))));
        assert_eq!(eval("${'a' += 1}").unwrap(), Value::from("a1"));
    }
}
