//! Expression evaluation (spec §4.4): the registry of named expression
//! handlers plus the comparison/coercion rules for binary and logical
//! expressions.
//!
//! The concrete AST shape below a condition slot is a choice internal to
//! this crate (the parser is an external collaborator per spec §1):
//! `UNARY_EXPRESSION` carries the handler name as its lexeme with zero or
//! more `OPERAND` children; `BINARY_EXPRESSION` has exactly three
//! children — lhs, an operator marker node, rhs; `LOGICAL_EXPRESSION`'s
//! children alternate sub-expression / `AND`-or-`OR` marker, evaluated
//! left-associatively; `NOT` has a single child, the expression it negates.

use std::collections::HashMap;

use crate::argument::{Argument, ArgumentList};
use crate::ast::{Ast, NodeId, NodeKind};
use crate::error::{ScriptError, ScriptResult};
use crate::host::Host;
use crate::runtime::{resolve_ctx, Runtime};
use crate::value::{ScriptType, Serial, Value};

/// A registered expression handler: given the expression's name, its
/// argument list and the enclosing statement's `quiet` flag, produces a
/// value to compare.
pub type ExpressionHandler<H> = fn(&mut Runtime<H>, &mut H, &mut ArgumentList, bool) -> ScriptResult<Value>;

#[derive(Clone)]
pub struct ExpressionRegistry<H> {
    handlers: HashMap<String, ExpressionHandler<H>>,
}

impl<H> Default for ExpressionRegistry<H> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<H> ExpressionRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, handler: ExpressionHandler<H>) {
        self.handlers.insert(name.to_lowercase(), handler);
    }

    pub fn get(&self, name: &str) -> Option<ExpressionHandler<H>> {
        self.handlers.get(&name.to_lowercase()).copied()
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Serial(s) => Some(s.0 as f64),
        Value::Uint(v) => Some(*v as f64),
        Value::Ushort(v) => Some(*v as f64),
        Value::Int(v) => Some(*v as f64),
        Value::Double(v) => Some(*v),
        Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
        Value::String(_) => None,
    }
}

/// Coerces `(lhs, rhs)` toward a common representation per spec §4.4:
/// "mismatched operand types auto-coerce toward the lhs type except that
/// doubles promote the lhs and booleans demote the lhs."
fn coerce_pair(lhs: Value, rhs: Value) -> (Value, Value) {
    if std::mem::discriminant(&lhs) == std::mem::discriminant(&rhs) {
        return (lhs, rhs);
    }
    if matches!(lhs, Value::Double(_)) || matches!(rhs, Value::Double(_)) {
        let l = numeric(&lhs).unwrap_or(0.0);
        let r = numeric(&rhs).unwrap_or(0.0);
        return (Value::Double(l), Value::Double(r));
    }
    if matches!(lhs, Value::Bool(_)) || matches!(rhs, Value::Bool(_)) {
        let l = numeric(&lhs).map(|n| n != 0.0).unwrap_or(false);
        let r = numeric(&rhs).map(|n| n != 0.0).unwrap_or(false);
        return (Value::Bool(l), Value::Bool(r));
    }
    // Otherwise coerce rhs toward lhs's type.
    let coerced_rhs = match &lhs {
        Value::Serial(_) => numeric(&rhs).map(|n| Value::Serial(Serial(n as u32))),
        Value::Uint(_) => numeric(&rhs).map(|n| Value::Uint(n as u32)),
        Value::Ushort(_) => numeric(&rhs).map(|n| Value::Ushort(n as u16)),
        Value::Int(_) => numeric(&rhs).map(|n| Value::Int(n as i32)),
        Value::String(_) => Some(Value::String(rhs.to_display_string())),
        _ => None,
    }
    .unwrap_or(rhs);
    (lhs, coerced_rhs)
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    if std::mem::discriminant(lhs) == std::mem::discriminant(rhs) {
        lhs == rhs
    } else {
        lhs.to_display_string() == rhs.to_display_string()
    }
}

/// Evaluates a comparison operator over a coerced `(lhs, rhs)` pair.
pub fn compare(op: NodeKind, lhs: Value, rhs: Value) -> ScriptResult<bool> {
    let (lhs, rhs) = coerce_pair(lhs, rhs);
    match op {
        NodeKind::Equal => Ok(values_equal(&lhs, &rhs)),
        NodeKind::NotEqual => Ok(!values_equal(&lhs, &rhs)),
        NodeKind::LessThan
        | NodeKind::LessThanOrEqual
        | NodeKind::GreaterThan
        | NodeKind::GreaterThanOrEqual => {
            let ordering = match (numeric(&lhs), numeric(&rhs)) {
                (Some(l), Some(r)) => l.partial_cmp(&r),
                _ => lhs.to_display_string().partial_cmp(&rhs.to_display_string()),
            }
            .ok_or_else(|| ScriptError::runtime("incomparable operands"))?;
            Ok(match op {
                NodeKind::LessThan => ordering.is_lt(),
                NodeKind::LessThanOrEqual => ordering.is_le(),
                NodeKind::GreaterThan => ordering.is_gt(),
                NodeKind::GreaterThanOrEqual => ordering.is_ge(),
                _ => unreachable!(),
            })
        }
        other => Err(ScriptError::runtime(format!(
            "{other:?} is not a comparison operator"
        ))),
    }
}

/// Evaluates any expression-shaped node (unary/binary/logical/operand/not)
/// down to a tagged [`Value`], per spec §4.4.
pub fn eval_value<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    ast: &Ast,
    node: NodeId,
    quiet: bool,
) -> ScriptResult<Value> {
    match ast.kind(node) {
        NodeKind::Not => {
            let inner = ast
                .first_child(node)
                .ok_or_else(|| ScriptError::runtime("NOT with no operand"))?;
            let value = eval_value(rt, host, ast, inner, quiet)?;
            let as_bool = numeric(&value).map(|n| n != 0.0).unwrap_or(false);
            Ok(Value::Bool(!as_bool))
        }
        NodeKind::UnaryExpression => {
            let name = ast.lexeme(node).unwrap_or_default().to_string();
            let handler = rt
                .expressions
                .get(&name)
                .ok_or_else(|| ScriptError::runtime(format!("Expression is not defined: {name}")))?;
            let args: Vec<Argument> = ast
                .children(node)
                .filter(|c| ast.kind(*c) == NodeKind::Operand)
                .map(|c| Argument::from_node(ast, c))
                .collect();
            let mut arglist = ArgumentList::new(&args, 0, &[]);
            handler(rt, host, &mut arglist, quiet)
        }
        NodeKind::BinaryExpression => {
            let mut children = ast.children(node);
            let lhs_node = children
                .next()
                .ok_or_else(|| ScriptError::runtime("binary expression missing lhs"))?;
            let op_node = children
                .next()
                .ok_or_else(|| ScriptError::runtime("binary expression missing operator"))?;
            let rhs_node = children
                .next()
                .ok_or_else(|| ScriptError::runtime("binary expression missing rhs"))?;
            let lhs = eval_value(rt, host, ast, lhs_node, quiet)?;
            let rhs = eval_value(rt, host, ast, rhs_node, quiet)?;
            let result = compare(ast.kind(op_node), lhs, rhs)?;
            Ok(Value::Bool(result))
        }
        NodeKind::LogicalExpression => Ok(Value::Bool(eval_logical(rt, host, ast, node, quiet)?)),
        NodeKind::Integer => {
            let lexeme = ast.lexeme(node).unwrap_or_default();
            i32::from_literal(lexeme).map(Value::Int)
        }
        NodeKind::Serial => {
            let lexeme = ast.lexeme(node).unwrap_or_default();
            Serial::from_literal(lexeme).map(Value::Serial)
        }
        NodeKind::Double => {
            let lexeme = ast.lexeme(node).unwrap_or_default();
            f64::from_literal(lexeme).map(Value::Double)
        }
        NodeKind::String => Ok(Value::String(ast.lexeme(node).unwrap_or_default().to_lowercase())),
        _ => {
            // A bare operand used directly as a condition/operand: resolve
            // it through the full argument pipeline as a string, per §4.2.
            let lexeme = ast.lexeme(node).unwrap_or_default().to_string();
            let ctx = resolve_ctx(rt, host);
            use crate::argument::Resolver;
            let resolved: String = ctx.resolve("", &lexeme)?;
            Ok(Value::String(resolved))
        }
    }
}

fn eval_logical<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    ast: &Ast,
    node: NodeId,
    quiet: bool,
) -> ScriptResult<bool> {
    let mut children = ast.children(node);
    let first = children
        .next()
        .ok_or_else(|| ScriptError::runtime("logical expression with no operands"))?;
    let mut acc = as_bool(eval_value(rt, host, ast, first, quiet)?);
    loop {
        let Some(op_node) = children.next() else { break };
        let Some(rhs_node) = children.next() else {
            return Err(ScriptError::runtime("logical expression missing operand"));
        };
        let rhs = as_bool(eval_value(rt, host, ast, rhs_node, quiet)?);
        acc = match ast.kind(op_node) {
            NodeKind::And => acc && rhs,
            NodeKind::Or => acc || rhs,
            other => return Err(ScriptError::runtime(format!("{other:?} is not AND/OR"))),
        };
    }
    Ok(acc)
}

fn as_bool(value: Value) -> bool {
    numeric(&value).map(|n| n != 0.0).unwrap_or(false)
}

/// Evaluates the condition expression under an `IF`/`WHILE` node's first
/// child and reduces it to a boolean, per §4.4's "evaluate the condition
/// expression."
pub fn eval_condition<H: Host>(
    rt: &mut Runtime<H>,
    host: &mut H,
    ast: &Ast,
    condition_node: NodeId,
    quiet: bool,
) -> ScriptResult<bool> {
    let value = eval_value(rt, host, ast, condition_node, quiet)?;
    Ok(as_bool(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_comparison_coerces_rhs_toward_lhs() {
        let result = compare(NodeKind::LessThan, Value::Int(20), Value::String("30".into())).unwrap();
        assert!(result);
    }

    #[test]
    fn double_rhs_promotes_lhs() {
        let result = compare(NodeKind::GreaterThan, Value::Int(3), Value::Double(2.5)).unwrap();
        assert!(result);
    }

    #[test]
    fn bool_rhs_demotes_lhs() {
        let result = compare(NodeKind::Equal, Value::Int(1), Value::Bool(true)).unwrap();
        assert!(result);
    }

    #[test]
    fn equality_is_symmetric_after_coercion() {
        assert!(compare(NodeKind::Equal, Value::Uint(5), Value::Int(5)).unwrap());
    }
}
