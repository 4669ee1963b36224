//! Error code definitions and documentation

/// Evaluation errors (E5xxx)
pub mod runtime {
    pub const DUPLICATE_DECLARATION: &str = "E5001";
    pub const INVALID_ASSIGNMENT_TARGET: &str = "E5002";
    pub const TYPE_ERROR: &str = "E5003";
    pub const NULL_OPERATION: &str = "E5004";
    pub const UNKNOWN_OPERATOR: &str = "E5005";
    pub const NOT_CALLABLE: &str = "E5006";
    pub const NO_SUCH_PROPERTY: &str = "E5007";
    pub const UNKNOWN_NODE: &str = "E5008";
    pub const CONVERSION_ERROR: &str = "E5009";
    pub const INVALID_LITERAL: &str = "E5010";
    pub const ARITY_MISMATCH: &str = "E5011";
    pub const HOST_CALL_FAILED: &str = "E5012";
}

/// Input loading errors (E6xxx)
pub mod load {
    pub const IO: &str = "E6001";
    pub const INVALID_AST: &str = "E6002";
    pub const INVALID_DATA: &str = "E6003";
    pub const INVALID_CONFIG: &str = "E6004";
}

/// Detailed explanation for an error code
pub fn explain(code: &str) -> Option<&'static str> {
    let text = match code {
        "E5001" => {
            r#"E5001: Duplicate declaration

A name was declared twice in the same scope. Top-level bindings (template
data and helper functions) are declared once each; injecting the same name
twice is almost always a mistake in the embedding code.

Fix: Rename one of the bindings, or merge the data before rendering.
"#
        }
        "E5002" => {
            r#"E5002: Invalid assignment target

`set` and `for` can only bind plain variable names.

Example:
  {% set user.name = "x" %}

Fix: Assign to a variable instead of a member path.
"#
        }
        "E5003" => {
            r#"E5003: Type error

A value had the wrong type for where it was used:
  - an `if` condition that is not a Boolean (no truthiness coercion)
  - a `for` loop over something other than an Array
  - a member access whose key is not a String

Fix: Compare explicitly (`{% if items.length > 0 %}`) or pass the right data.
"#
        }
        "E5004" => {
            r#"E5004: Operation on null

One operand of a binary operator was null, usually an undefined variable.

Fix: Check the variable name, or provide the value in the template data.
"#
        }
        "E5005" => {
            r#"E5005: Unknown operator

The operator is not defined for these operand types. Numbers support
arithmetic and comparison, booleans support `and`, `or` and `!=`, and any
other pair supports only `+` (concatenation), `==` and `!=`.
"#
        }
        "E5006" => {
            r#"E5006: Not callable

A call expression's callee is not a function.

Example:
  {{ name() }}   # name is a String
"#
        }
        "E5007" => {
            r#"E5007: No such property

The member is neither a key of the object nor a built-in of the value's type.
Strings provide `upper`, `lower`, `strip`, `title` and `length`; arrays
provide `length`.
"#
        }
        "E5008" => {
            r#"E5008: Unknown node

The AST contains a node type this evaluator does not implement. The tree was
probably produced by a newer parser.
"#
        }
        "E5009" => {
            r#"E5009: Conversion error

A host value could not be converted to or from a template value, e.g. a map
with non-string keys, or a function passed as an argument to a host helper.
"#
        }
        "E5010" => {
            r#"E5010: Invalid numeric literal

A numeric literal's source text does not parse as a number.
"#
        }
        "E5011" => {
            r#"E5011: Arity mismatch

A built-in was called with the wrong number of arguments.

Example:
  {{ name.upper(1) }}   # upper takes no arguments
"#
        }
        "E5012" => {
            r#"E5012: Host function failed

A helper function supplied by the embedding application reported an error.
"#
        }
        "E6001" => "E6001: An input file could not be read or written.\n",
        "E6002" => "E6002: The AST file is not a valid template tree.\n",
        "E6003" => "E6003: The data file is not valid JSON or TOML.\n",
        "E6004" => "E6004: The configuration file is not valid.\n",
        _ => return None,
    };
    Some(text)
}
