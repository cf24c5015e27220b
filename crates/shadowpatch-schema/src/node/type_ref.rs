use crate::types::Primitive;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

/// Builtin ordered list container, one type argument.
pub const LIST_PATH: &str = "List";

/// Builtin keyed map container, type arguments `(key, value)`.
pub const MAP_PATH: &str = "Map";

/// Builtin explicit-nullable wrapper, one type argument.
pub const NULLABLE_PATH: &str = "Nullable";

///
/// TypeRef
///
/// Identity for a type: a qualified path plus type arguments for
/// parameterized types. Two refs are equal iff path and arguments match.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct TypeRef {
    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    #[must_use]
    pub fn named(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn generic(path: impl Into<String>, args: Vec<Self>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }

    #[must_use]
    pub fn primitive(prim: Primitive) -> Self {
        Self::named(prim.to_string())
    }

    #[must_use]
    pub fn list(elem: Self) -> Self {
        Self::generic(LIST_PATH, vec![elem])
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::generic(MAP_PATH, vec![key, value])
    }

    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::generic(NULLABLE_PATH, vec![inner])
    }

    /// Structural view over builtin containers and primitives.
    ///
    /// Builtin container paths with the wrong number of arguments come back
    /// as `Malformed`; the classifier reports those as invariant errors.
    #[must_use]
    pub fn shape(&self) -> TypeShape<'_> {
        match (self.path.as_str(), self.args.as_slice()) {
            (LIST_PATH, [elem]) => TypeShape::List(elem),
            (MAP_PATH, [key, value]) => TypeShape::Map(key, value),
            (NULLABLE_PATH, [inner]) => TypeShape::Nullable(inner),
            (LIST_PATH | MAP_PATH | NULLABLE_PATH, _) => TypeShape::Malformed,
            (path, []) => Primitive::from_path(path)
                .map_or(TypeShape::Named(self), TypeShape::Primitive),
            (_, _) => TypeShape::Named(self),
        }
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.shape() {
            TypeShape::Primitive(prim) => Some(prim),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self.shape(), TypeShape::Nullable(_))
    }

    /// Replace generic parameter names with concrete arguments.
    #[must_use]
    pub fn substitute(&self, params: &[String], args: &[Self]) -> Self {
        if self.args.is_empty()
            && let Some(pos) = params.iter().position(|p| *p == self.path)
            && let Some(arg) = args.get(pos)
        {
            return arg.clone();
        }

        Self {
            path: self.path.clone(),
            args: self
                .args
                .iter()
                .map(|arg| arg.substitute(params, args))
                .collect(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }

        Ok(())
    }
}

impl From<Primitive> for TypeRef {
    fn from(prim: Primitive) -> Self {
        Self::primitive(prim)
    }
}

///
/// TypeShape
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeShape<'a> {
    Primitive(Primitive),
    List(&'a TypeRef),
    Map(&'a TypeRef, &'a TypeRef),
    Nullable(&'a TypeRef),
    Named(&'a TypeRef),
    Malformed,
}

///
/// TypeRefParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("invalid type reference '{input}' at offset {offset}: {message}")]
pub struct TypeRefParseError {
    pub input: String,
    pub offset: usize,
    pub message: &'static str,
}

impl FromStr for TypeRef {
    type Err = TypeRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { input: s, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }

        Ok(ty)
    }
}

// Recursive-descent parser for `path<arg, arg>` syntax.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn parse_type(&mut self) -> Result<TypeRef, TypeRefParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == ':' || c == '.' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected type path"));
        }
        let path = self.input[start..self.pos].to_string();

        self.skip_ws();
        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>'")),
                }
            }
        }

        Ok(TypeRef { path, args })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: &'static str) -> TypeRefParseError {
        TypeRefParseError {
            input: self.input.to_string(),
            offset: self.pos,
            message,
        }
    }
}

///
/// TESTS
///
