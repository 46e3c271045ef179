use std::fmt;

use thiserror::Error;

/// A declared type with optional type parameters, e.g. `java.util.Map<String, LineItem>`
/// or `HasMany<line_item::LineItem>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeShape {
    pub path: String,
    pub args: Vec<TypeShape>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type shape `{input}` at offset {offset}: {reason}")]
pub struct ShapeParseError {
    pub input: String,
    pub offset: usize,
    pub reason: &'static str,
}

impl TypeShape {
    pub fn named(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(path: impl Into<String>, args: Vec<TypeShape>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }

    pub fn parse(input: &str) -> Result<Self, ShapeParseError> {
        let mut parser = ShapeParser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        };
        let shape = parser.shape()?;
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(shape)
    }

    /// Last segment of the path, split on `.` or `::`.
    pub fn simple_name(&self) -> &str {
        let path = self.path.trim();
        let after_colons = path.rsplit("::").next().unwrap_or(path);
        after_colons.rsplit('.').next().unwrap_or(after_colons)
    }

    pub fn is_parameterized(&self) -> bool {
        !self.args.is_empty()
    }

    pub fn last_argument(&self) -> Option<&TypeShape> {
        self.args.last()
    }

    /// The same shape with its type parameters erased.
    pub fn raw(&self) -> TypeShape {
        TypeShape::named(self.path.clone())
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if self.args.is_empty() {
            return Ok(());
        }
        write!(f, "<")?;
        for (idx, arg) in self.args.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ">")
    }
}

struct ShapeParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl ShapeParser<'_> {
    fn shape(&mut self) -> Result<TypeShape, ShapeParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(&byte) = self.bytes.get(self.pos) {
            if matches!(byte, b'<' | b'>' | b',') {
                break;
            }
            self.pos += 1;
        }
        let path = self.input[start..self.pos].trim();
        if path.is_empty() {
            return Err(self.error("expected a type name"));
        }

        let mut args = Vec::new();
        if self.peek() == Some(b'<') {
            self.pos += 1;
            loop {
                args.push(self.shape()?);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b'>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected `,` or `>`")),
                }
            }
        }

        Ok(TypeShape::generic(path, args))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: &'static str) -> ShapeParseError {
        ShapeParseError {
            input: self.input.to_string(),
            offset: self.pos,
            reason,
        }
    }
}
