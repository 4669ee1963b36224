//! Abstract Syntax Tree definitions for Stencil templates
//!
//! Trees are produced by an external parser and handed over either in code
//! or as JSON. Every node is tagged by its `type` field, so a parser in any
//! language can emit the same shape:
//!
//! ```json
//! { "type": "Identifier", "value": "name" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A template AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// Root of a template: a sequence of statements
    Program { body: Vec<Node> },
    /// `{% set assignee = value %}`
    Set {
        assignee: Box<Node>,
        value: Box<Node>,
    },
    /// `{% if test %}body{% else %}alternate{% endif %}`
    If {
        test: Box<Node>,
        body: Vec<Node>,
        #[serde(default)]
        alternate: Vec<Node>,
    },
    /// `{% for loopvar in iterable %}body{% endfor %}`
    For {
        loopvar: Box<Node>,
        iterable: Box<Node>,
        body: Vec<Node>,
    },
    NumericLiteral { value: Numeral },
    StringLiteral { value: String },
    BooleanLiteral { value: bool },
    Identifier { value: String },
    CallExpression { callee: Box<Node>, args: Vec<Node> },
    /// `object.property` or `object[property]` when `computed`
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        #[serde(default)]
        computed: bool,
    },
    UnaryExpression {
        operator: UnaryOp,
        argument: Box<Node>,
    },
    BinaryExpression {
        operator: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Any node tag this evaluator does not know about
    #[serde(other)]
    Unknown,
}

/// Payload of a numeric literal.
///
/// Parsers may hand over either an already-parsed number or the literal's
/// source text; the evaluator coerces both to `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeral {
    Number(f64),
    Text(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
}

impl BinaryOp {
    /// The operator token as it appears in template source
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "-")]
    Neg,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "-",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    /// Load a tree from its JSON form
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Serialize the tree back to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The `type` tag of this node
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Program { .. } => "Program",
            Node::Set { .. } => "Set",
            Node::If { .. } => "If",
            Node::For { .. } => "For",
            Node::NumericLiteral { .. } => "NumericLiteral",
            Node::StringLiteral { .. } => "StringLiteral",
            Node::BooleanLiteral { .. } => "BooleanLiteral",
            Node::Identifier { .. } => "Identifier",
            Node::CallExpression { .. } => "CallExpression",
            Node::MemberExpression { .. } => "MemberExpression",
            Node::UnaryExpression { .. } => "UnaryExpression",
            Node::BinaryExpression { .. } => "BinaryExpression",
            Node::Unknown => "Unknown",
        }
    }

    /// Direct children, in evaluation order
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Program { body } => body.iter().collect(),
            Node::Set { assignee, value } => vec![assignee.as_ref(), value.as_ref()],
            Node::If {
                test,
                body,
                alternate,
            } => std::iter::once(test.as_ref())
                .chain(body.iter())
                .chain(alternate.iter())
                .collect(),
            Node::For {
                loopvar,
                iterable,
                body,
            } => [loopvar.as_ref(), iterable.as_ref()]
                .into_iter()
                .chain(body.iter())
                .collect(),
            Node::CallExpression { callee, args } => {
                args.iter().chain(std::iter::once(callee.as_ref())).collect()
            }
            Node::MemberExpression {
                object, property, ..
            } => vec![property.as_ref(), object.as_ref()],
            Node::UnaryExpression { argument, .. } => vec![argument.as_ref()],
            Node::BinaryExpression { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::NumericLiteral { .. }
            | Node::StringLiteral { .. }
            | Node::BooleanLiteral { .. }
            | Node::Identifier { .. }
            | Node::Unknown => Vec::new(),
        }
    }

    /// Count nodes in this tree by `type` tag
    pub fn census(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            *counts.entry(node.kind_name()).or_insert(0) += 1;
            pending.extend(node.children());
        }
        counts
    }

    /// Depth of the deepest path from this node to a leaf
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    // Builders, mostly for embedding and tests

    pub fn program(body: Vec<Node>) -> Self {
        Node::Program { body }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Node::Identifier { value: name.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::StringLiteral {
            value: value.into(),
        }
    }

    pub fn number(value: f64) -> Self {
        Node::NumericLiteral {
            value: Numeral::Number(value),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Node::BooleanLiteral { value }
    }

    pub fn set(assignee: Node, value: Node) -> Self {
        Node::Set {
            assignee: Box::new(assignee),
            value: Box::new(value),
        }
    }

    pub fn if_else(test: Node, body: Vec<Node>, alternate: Vec<Node>) -> Self {
        Node::If {
            test: Box::new(test),
            body,
            alternate,
        }
    }

    pub fn for_loop(loopvar: Node, iterable: Node, body: Vec<Node>) -> Self {
        Node::For {
            loopvar: Box::new(loopvar),
            iterable: Box::new(iterable),
            body,
        }
    }

    pub fn call(callee: Node, args: Vec<Node>) -> Self {
        Node::CallExpression {
            callee: Box::new(callee),
            args,
        }
    }

    /// `object.name`
    pub fn member(object: Node, name: impl Into<String>) -> Self {
        Node::MemberExpression {
            object: Box::new(object),
            property: Box::new(Node::ident(name)),
            computed: false,
        }
    }

    /// `object[property]`
    pub fn index(object: Node, property: Node) -> Self {
        Node::MemberExpression {
            object: Box::new(object),
            property: Box::new(property),
            computed: true,
        }
    }

    pub fn unary(operator: UnaryOp, argument: Node) -> Self {
        Node::UnaryExpression {
            operator,
            argument: Box::new(argument),
        }
    }

    pub fn binary(operator: BinaryOp, left: Node, right: Node) -> Self {
        Node::BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
