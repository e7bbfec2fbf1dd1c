use std::fmt;

use evalexpr::{Context, EvalexprResult, Node};

use super::ValueError;
use crate::registry::TypeInfo;
use crate::value::Value;

/// An expression compiled when the configuration is loaded, so syntax
/// errors surface at start-up instead of on first use.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    node: Node,
}

impl Expression {
    pub fn compile(source: &str) -> Result<Self, ValueError> {
        let node = evalexpr::build_operator_tree(source).map_err(|e| ValueError::Expression {
            raw: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            node,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn eval_boolean_with_context<C: Context>(&self, context: &C) -> EvalexprResult<bool> {
        self.node.eval_boolean_with_context(context)
    }

    pub fn eval_boolean(&self) -> EvalexprResult<bool> {
        self.node.eval_boolean()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

pub fn parse_expression(raw: &str) -> Result<Expression, ValueError> {
    Expression::compile(raw)
}

impl Value for Expression {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Expression>("Expression")
    }

    fn is_zero(&self) -> bool {
        self.source.is_empty()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.source.clone())
    }
}
