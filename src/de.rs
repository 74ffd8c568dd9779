//! PIML deserialization.
//!
//! This module provides the [`Deserializer`] that reads PIML text into Rust
//! data structures.
//!
//! ## Overview
//!
//! The deserializer is a recursive descent over classified lines with a
//! single line of lookahead:
//!
//! - **No intermediate tree**: lines are classified lazily and fed straight
//!   into the destination's `Deserialize` impl
//! - **Relative indentation**: a value block is every following line indented
//!   deeper than the key line that opened it
//! - **Unknown keys**: skipped together with their nested block
//! - **Depth guard**: nesting beyond [`PimlOptions::max_depth`] is rejected
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_piml::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Site { name: String, tags: Vec<String> }
//!
//! let piml = "(name) Example\n(tags)\n  > web\n  > docs\n";
//! let site: Site = from_str(piml).unwrap();
//! assert_eq!(site.tags, vec!["web", "docs"]);
//! ```
//!
//! ## Nil and empty blocks
//!
//! ```rust
//! use serde_piml::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Post { title: Option<String>, tags: Vec<String> }
//!
//! let post: Post = from_str("(title) nil\n(tags) nil\n").unwrap();
//! assert_eq!(post, Post { title: None, tags: vec![] });
//! ```

use crate::line::{Line, LineKind, LineReader};
use crate::options::PimlOptions;
use crate::resolve::{resolve, Resolution};
use crate::scalar::{self, NIL};
use crate::{Error, Result};
use serde::de::value::{BorrowedStrDeserializer, CowStrDeserializer};
use serde::de::{self, Deserializer as _, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use std::borrow::Cow;

/// Newtype name [`PimlValue`](crate::PimlValue) deserializes through so that
/// set blocks can be told apart from lists.
pub(crate) const VALUE_TOKEN: &str = "$serde_piml::private::Value";

/// Map key that announces a set block to the value visitor.
pub(crate) const SET_KEY: &str = "$serde_piml::private::Set";

/// Lines that belong to the value currently being decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Scope {
    /// Indent of the key or item line that opened the block; `None` at the
    /// document root.
    parent: Option<usize>,
}

impl Scope {
    const ROOT: Scope = Scope { parent: None };

    fn under(indent: usize) -> Self {
        Scope {
            parent: Some(indent),
        }
    }

    fn contains(self, indent: usize) -> bool {
        self.parent.map_or(true, |parent| indent > parent)
    }
}

/// The PIML deserializer.
///
/// Holds the line cursor for one document. Created via
/// [`Deserializer::from_str`] or [`Deserializer::with_options`].
pub struct Deserializer<'de> {
    reader: LineReader<'de>,
    options: PimlOptions,
    depth: usize,
}

impl<'de> Deserializer<'de> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Self::with_options(input, PimlOptions::default())
    }

    pub fn with_options(input: &'de str, options: PimlOptions) -> Self {
        Deserializer {
            reader: LineReader::new(input),
            options,
            depth: 0,
        }
    }

    /// Fails if any significant line is left after the value was decoded.
    pub fn end(&mut self) -> Result<()> {
        match self.reader.peek()? {
            Some(line) => Err(Error::syntax(
                line.number,
                &format!("unexpected {} after the document", line.kind.describe()),
                line.raw,
            )),
            None => Ok(()),
        }
    }

    /// Kind and indent of the next line, if it belongs to `scope`.
    fn next_in(&mut self, scope: Scope) -> Result<Option<(LineKind, usize)>> {
        Ok(self
            .reader
            .peek()?
            .filter(|line| scope.contains(line.indent))
            .map(|line| (line.kind, line.indent)))
    }

    fn take(&mut self) -> Result<Line<'de>> {
        self.reader
            .consume()
            .ok_or_else(|| Error::custom("unexpected end of input"))
    }

    /// Builds a syntax error pointing at the buffered line.
    fn unexpected(&mut self, expected: &str) -> Error {
        match self.reader.peek() {
            Ok(Some(line)) => Error::syntax(
                line.number,
                &format!("expected {}, found {}", expected, line.kind.describe()),
                line.raw,
            ),
            Ok(None) => Error::syntax(
                self.reader.line_number(),
                &format!("expected {}, found end of input", expected),
                "",
            ),
            Err(e) => e,
        }
    }

    /// A block must hold one kind of child; anything left inside it is an error.
    fn finish(&mut self, scope: Scope) -> Result<()> {
        match self.reader.peek()? {
            Some(line) if scope.contains(line.indent) => Err(Error::syntax(
                line.number,
                &format!("unexpected {} in this block", line.kind.describe()),
                line.raw,
            )),
            _ => Ok(()),
        }
    }

    fn descend<T>(&mut self, scope: Scope, visit: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            let line = self.reader.line_number();
            tracing::warn!(line, limit = self.options.max_depth, "nesting depth limit reached");
            self.depth -= 1;
            return Err(Error::DepthLimitExceeded {
                line,
                limit: self.options.max_depth,
            });
        }
        let result = visit(self);
        self.depth -= 1;
        let value = result?;
        self.finish(scope)?;
        Ok(value)
    }

    fn skip_block(&mut self, scope: Scope) -> Result<()> {
        while self.next_in(scope)?.is_some() {
            self.reader.consume();
        }
        Ok(())
    }

    /// Reads a multi-line text block.
    ///
    /// The first line fixes the base indent. Later lines lose exactly that many
    /// spaces, or all leading whitespace when they are indented less. Blank
    /// physical lines between content lines come back as empty lines.
    fn read_block_text(&mut self, scope: Scope) -> Result<String> {
        let mut text = String::new();
        let mut base = None;
        while let Some((LineKind::MultiLineContent, _)) = self.next_in(scope)? {
            let blanks = self.reader.blank_run();
            let line = self.take()?;
            match base {
                None => {
                    base = Some(line.indent);
                    text.push_str(&line.value[line.indent..]);
                }
                Some(base) => {
                    for _ in 0..=blanks {
                        text.push('\n');
                    }
                    if line.indent >= base {
                        text.push_str(&line.value[base..]);
                    } else {
                        text.push_str(line.value.trim_start());
                    }
                }
            }
        }
        Ok(text)
    }

    fn root(&mut self) -> ValueDeserializer<'_, 'de> {
        ValueDeserializer {
            de: self,
            pending: Pending::Block(Scope::ROOT),
        }
    }
}

macro_rules! reject_root_scalar {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                Err(Error::invalid_target(concat!(
                    "a document cannot be decoded into a bare scalar (",
                    stringify!($method),
                    ")"
                )))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_any(visitor)
    }

    reject_root_scalar! {
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_u128 deserialize_f32 deserialize_f64 deserialize_char deserialize_str
        deserialize_string deserialize_bytes deserialize_byte_buf deserialize_unit
        deserialize_identifier
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_option(visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_newtype_struct(name, visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_seq(visitor)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_map(visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_struct(name, fields, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_enum(name, variants, visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.root().deserialize_ignored_any(visitor)
    }
}

/// What a slot is about to receive: the inline text of a `(key) value` or
/// `> value` line, or the block under a header line.
enum Pending<'de> {
    Scalar(Cow<'de, str>),
    Block(Scope),
}

impl<'de> Pending<'de> {
    fn scalar_text(&self) -> Option<Cow<'de, str>> {
        match self {
            Pending::Scalar(text) => Some(text.clone()),
            Pending::Block(_) => None,
        }
    }
}

/// Rejections raised by a field's own `Deserialize` impl while reading
/// inline text (chrono's parsers, for one) become type mismatches that
/// name the offending text.
fn scalar_mismatch(err: Error, text: Option<Cow<'_, str>>) -> Error {
    match (err, text) {
        (Error::Custom(msg), Some(text)) => {
            Error::type_mismatch(&format!("valid value ({})", msg), &format!("{:?}", text))
        }
        (err, _) => err,
    }
}

fn visit_text<'de, V>(text: Cow<'de, str>, visitor: V) -> Result<V::Value>
where
    V: Visitor<'de>,
{
    match text {
        Cow::Borrowed(s) => visitor.visit_borrowed_str(s),
        Cow::Owned(s) => visitor.visit_string(s),
    }
}

/// Deserializes one slot value.
struct ValueDeserializer<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    pending: Pending<'de>,
}

impl<'a, 'de> ValueDeserializer<'a, 'de> {
    /// Inline text for a scalar slot of the given kind.
    fn into_scalar(self, kind: &str) -> Result<Cow<'de, str>> {
        match self.pending {
            Pending::Scalar(text) => Ok(text),
            Pending::Block(scope) => Err(match self.de.next_in(scope)? {
                None => Error::type_mismatch(kind, "empty value"),
                Some(_) => Error::type_mismatch(kind, "nested block"),
            }),
        }
    }

    fn visit_any<V>(self, visitor: V, sets_as_values: bool) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let scope = match self.pending {
            Pending::Scalar(text) => {
                return if text == NIL {
                    visitor.visit_none()
                } else if text == "true" || text == "false" {
                    visitor.visit_bool(text == "true")
                } else if let Some(n) = scalar::canonical_i64(&text) {
                    visitor.visit_i64(n)
                } else if let Some(n) = scalar::canonical_u64(&text) {
                    visitor.visit_u64(n)
                } else if let Some(f) = scalar::canonical_f64(&text) {
                    visitor.visit_f64(f)
                } else {
                    visit_text(text, visitor)
                };
            }
            Pending::Block(scope) => scope,
        };

        match self.de.next_in(scope)?.map(|(kind, _)| kind) {
            None => visitor.visit_borrowed_str(""),
            Some(LineKind::KeyValue | LineKind::KeyOnly) => self
                .de
                .descend(scope, |de| visitor.visit_map(RecordAccess::new(de, scope, None))),
            Some(LineKind::ArrayItem | LineKind::ArrayObjectHeader) => self
                .de
                .descend(scope, |de| visitor.visit_seq(ListAccess::new(de, scope))),
            Some(LineKind::SetItem) if sets_as_values => visitor.visit_map(SetEnvelope {
                de: self.de,
                scope,
                announced: false,
            }),
            Some(LineKind::SetItem) => self
                .de
                .descend(scope, |de| visitor.visit_seq(SetAccess::new(de, scope))),
            Some(LineKind::MultiLineContent) => {
                let text = self.de.read_block_text(scope)?;
                self.de.finish(scope)?;
                visitor.visit_string(text)
            }
            Some(LineKind::Blank) => Err(self.de.unexpected("a value")),
        }
    }
}

macro_rules! deserialize_number {
    ($method:ident, $visit:ident, $ty:ty, $parse:ident, $kind:expr) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: Visitor<'de>,
        {
            let text = self.into_scalar($kind)?;
            visitor.$visit(scalar::$parse::<$ty>(&text)?)
        }
    };
}

impl<'a, 'de> de::Deserializer<'de> for ValueDeserializer<'a, 'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.visit_any(visitor, false)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.into_scalar("boolean")?;
        visitor.visit_bool(scalar::parse_bool(&text)?)
    }

    deserialize_number!(deserialize_i8, visit_i8, i8, parse_signed, "integer");
    deserialize_number!(deserialize_i16, visit_i16, i16, parse_signed, "integer");
    deserialize_number!(deserialize_i32, visit_i32, i32, parse_signed, "integer");
    deserialize_number!(deserialize_i64, visit_i64, i64, parse_signed, "integer");
    deserialize_number!(deserialize_i128, visit_i128, i128, parse_signed, "integer");
    deserialize_number!(deserialize_u8, visit_u8, u8, parse_unsigned, "unsigned integer");
    deserialize_number!(deserialize_u16, visit_u16, u16, parse_unsigned, "unsigned integer");
    deserialize_number!(deserialize_u32, visit_u32, u32, parse_unsigned, "unsigned integer");
    deserialize_number!(deserialize_u64, visit_u64, u64, parse_unsigned, "unsigned integer");
    deserialize_number!(deserialize_u128, visit_u128, u128, parse_unsigned, "unsigned integer");

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.into_scalar("float")?;
        visitor.visit_f32(scalar::parse_f32(&text)?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.into_scalar("float")?;
        visitor.visit_f64(scalar::parse_f64(&text)?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.into_scalar("character")?;
        visitor.visit_char(scalar::parse_char(&text)?)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.pending {
            Pending::Scalar(text) if text == NIL => {
                Err(Error::type_mismatch("string", "nil (slot is not nilable)"))
            }
            Pending::Scalar(text) => visit_text(text, visitor),
            Pending::Block(scope) => match self.de.next_in(scope)? {
                None => visitor.visit_borrowed_str(""),
                Some((LineKind::MultiLineContent, _)) => {
                    let text = self.de.read_block_text(scope)?;
                    self.de.finish(scope)?;
                    visitor.visit_string(text)
                }
                Some(_) => Err(Error::type_mismatch("string", "nested block")),
            },
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.pending {
            Pending::Scalar(ref text) if text != NIL => visitor.visit_bytes(text.as_bytes()),
            _ => self.deserialize_seq(visitor),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let absent = match &self.pending {
            Pending::Scalar(text) => text == NIL,
            Pending::Block(scope) => self.de.next_in(*scope)?.is_none(),
        };
        if absent {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.pending {
            Pending::Scalar(ref text) if text == NIL => visitor.visit_unit(),
            Pending::Scalar(text) => Err(Error::type_mismatch("nil", &format!("{:?}", text))),
            Pending::Block(scope) => match self.de.next_in(scope)? {
                None => visitor.visit_unit(),
                Some(_) => Err(Error::type_mismatch("nil", "nested block")),
            },
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if name == VALUE_TOKEN {
            self.visit_any(visitor, true)
        } else {
            visitor.visit_newtype_struct(self)
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let scope = match self.pending {
            Pending::Scalar(text) if text == NIL => return visitor.visit_seq(Empty),
            Pending::Scalar(text) => {
                return Err(Error::type_mismatch("list", &format!("{:?}", text)))
            }
            Pending::Block(scope) => scope,
        };
        match self.de.next_in(scope)?.map(|(kind, _)| kind) {
            None => visitor.visit_seq(Empty),
            Some(LineKind::ArrayItem | LineKind::ArrayObjectHeader) => self
                .de
                .descend(scope, |de| visitor.visit_seq(ListAccess::new(de, scope))),
            Some(LineKind::SetItem) => self
                .de
                .descend(scope, |de| visitor.visit_seq(SetAccess::new(de, scope))),
            Some(_) => Err(self.de.unexpected("list items")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let scope = match self.pending {
            Pending::Scalar(text) if text == NIL => return visitor.visit_map(Empty),
            Pending::Scalar(text) => {
                return Err(Error::type_mismatch("map", &format!("{:?}", text)))
            }
            Pending::Block(scope) => scope,
        };
        match self.de.next_in(scope)?.map(|(kind, _)| kind) {
            None => visitor.visit_map(Empty),
            Some(LineKind::KeyValue | LineKind::KeyOnly) => self
                .de
                .descend(scope, |de| visitor.visit_map(RecordAccess::new(de, scope, None))),
            Some(LineKind::SetItem) => self
                .de
                .descend(scope, |de| visitor.visit_map(SetAccess::new(de, scope))),
            Some(_) => Err(self.de.unexpected("keys")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let scope = match self.pending {
            Pending::Scalar(text) if text == NIL => {
                return Err(Error::type_mismatch("record", "nil (slot is not nilable)"))
            }
            Pending::Scalar(text) => {
                return Err(Error::type_mismatch("record", &format!("{:?}", text)))
            }
            Pending::Block(scope) => scope,
        };
        match self.de.next_in(scope)?.map(|(kind, _)| kind) {
            None | Some(LineKind::KeyValue | LineKind::KeyOnly) => self.de.descend(scope, |de| {
                visitor.visit_map(RecordAccess::new(de, scope, Some(fields)))
            }),
            Some(_) => Err(self.de.unexpected("keys")),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let text = self.into_scalar("enum variant")?;
        let access: CowStrDeserializer<'de, Error> = text.into_deserializer();
        visitor.visit_enum(access)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if let Pending::Block(scope) = self.pending {
            self.de.skip_block(scope)?;
        }
        visitor.visit_unit()
    }
}

/// Entries of a `(key)` block, for records and maps alike.
///
/// With `fields` set, keys are resolved against the record's field names and
/// unresolved keys are skipped here.
struct RecordAccess<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    scope: Scope,
    fields: Option<&'static [&'static str]>,
    current: Option<(String, Pending<'de>)>,
    seen: Vec<String>,
}

impl<'a, 'de> RecordAccess<'a, 'de> {
    fn new(
        de: &'a mut Deserializer<'de>,
        scope: Scope,
        fields: Option<&'static [&'static str]>,
    ) -> Self {
        RecordAccess {
            de,
            scope,
            fields,
            current: None,
            seen: Vec::new(),
        }
    }
}

impl<'a, 'de> de::MapAccess<'de> for RecordAccess<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        loop {
            match self.de.next_in(self.scope)? {
                None => return Ok(None),
                Some((LineKind::KeyValue | LineKind::KeyOnly, _)) => {}
                Some(_) => return Err(self.de.unexpected("a key")),
            }

            let line = self.de.take()?;
            let pending = match line.kind {
                LineKind::KeyOnly => Pending::Block(Scope::under(line.indent)),
                _ => Pending::Scalar(line.value),
            };
            let key = line.key.unwrap_or(Cow::Borrowed(""));

            let key = match self.fields.map(|fields| resolve(fields, &key)) {
                None | Some(Resolution::Exact) => key,
                Some(Resolution::Folded(field)) => Cow::Borrowed(field),
                Some(Resolution::NotFound) => {
                    tracing::debug!(key = %key, line = line.number, "skipping unknown key");
                    if let Pending::Block(scope) = pending {
                        self.de.skip_block(scope)?;
                    }
                    continue;
                }
            };

            if self.fields.is_some() {
                if self.seen.iter().any(|seen| seen.as_str() == &*key) {
                    return Err(Error::syntax(
                        line.number,
                        &format!("duplicate key `{}`", key),
                        line.raw,
                    ));
                }
                self.seen.push(key.to_string());
            }

            self.current = Some((key.to_string(), pending));
            let access: CowStrDeserializer<'de, Error> = key.into_deserializer();
            return seed.deserialize(access).map(Some);
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let (key, pending) = self
            .current
            .take()
            .ok_or_else(|| Error::custom("value requested before its key"))?;
        let text = pending.scalar_text();
        seed.deserialize(ValueDeserializer {
            de: &mut *self.de,
            pending,
        })
        .map_err(|e| scalar_mismatch(e, text).at(&key))
    }
}

/// Elements of a `>` / `> (Label)` block.
struct ListAccess<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    scope: Scope,
    index: usize,
}

impl<'a, 'de> ListAccess<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, scope: Scope) -> Self {
        ListAccess { de, scope, index: 0 }
    }
}

impl<'a, 'de> de::SeqAccess<'de> for ListAccess<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        let pending = match self.de.next_in(self.scope)? {
            Some((LineKind::ArrayItem, _)) => Pending::Scalar(self.de.take()?.value),
            Some((LineKind::ArrayObjectHeader, indent)) => {
                self.de.take()?;
                Pending::Block(Scope::under(indent))
            }
            _ => return Ok(None),
        };
        let index = self.index;
        self.index += 1;
        let text = pending.scalar_text();
        seed.deserialize(ValueDeserializer {
            de: &mut *self.de,
            pending,
        })
        .map(Some)
        .map_err(|e| scalar_mismatch(e, text).at(&format!("[{}]", index)))
    }
}

/// Members of a `>|` block, read either as a sequence of strings or as a
/// map from member to a presence marker.
struct SetAccess<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    scope: Scope,
}

impl<'a, 'de> SetAccess<'a, 'de> {
    fn new(de: &'a mut Deserializer<'de>, scope: Scope) -> Self {
        SetAccess { de, scope }
    }

    fn next_member(&mut self) -> Result<Option<Cow<'de, str>>> {
        match self.de.next_in(self.scope)? {
            Some((LineKind::SetItem, _)) => Ok(Some(self.de.take()?.value)),
            _ => Ok(None),
        }
    }
}

impl<'a, 'de> de::SeqAccess<'de> for SetAccess<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.next_member()? {
            Some(member) => seed
                .deserialize(ValueDeserializer {
                    de: &mut *self.de,
                    pending: Pending::Scalar(member),
                })
                .map(Some),
            None => Ok(None),
        }
    }
}

impl<'a, 'de> de::MapAccess<'de> for SetAccess<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.next_member()? {
            Some(member) => {
                let access: CowStrDeserializer<'de, Error> = member.into_deserializer();
                seed.deserialize(access).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(SetMarker)
    }
}

/// The value side of a set member: `true`, `()` or a unit struct.
struct SetMarker;

impl<'de> de::Deserializer<'de> for SetMarker {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_bool(true)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf newtype_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

/// Presents a set block to the dynamic value visitor as a one-entry map
/// keyed by [`SET_KEY`].
struct SetEnvelope<'a, 'de> {
    de: &'a mut Deserializer<'de>,
    scope: Scope,
    announced: bool,
}

impl<'a, 'de> de::MapAccess<'de> for SetEnvelope<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.announced {
            return Ok(None);
        }
        self.announced = true;
        seed.deserialize(BorrowedStrDeserializer::<Error>::new(SET_KEY))
            .map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer {
            de: &mut *self.de,
            pending: Pending::Block(self.scope),
        })
    }
}

/// An absent collection.
struct Empty;

impl<'de> de::SeqAccess<'de> for Empty {
    type Error = Error;

    fn next_element_seed<T>(&mut self, _seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        Ok(None)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(0)
    }
}

impl<'de> de::MapAccess<'de> for Empty {
    type Error = Error;

    fn next_key_seed<K>(&mut self, _seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, _seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        Err(Error::custom("value requested from an empty map"))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::{BTreeMap, BTreeSet};

    fn decode<'a, T: Deserialize<'a>>(input: &'a str) -> Result<T> {
        let mut de = Deserializer::from_str(input);
        let value = T::deserialize(&mut de)?;
        de.end()?;
        Ok(value)
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        server: Server,
    }

    #[test]
    fn test_scope_membership() {
        assert!(Scope::ROOT.contains(0));
        assert!(Scope::under(2).contains(4));
        assert!(!Scope::under(2).contains(2));
        assert!(!Scope::under(2).contains(0));
    }

    #[test]
    fn test_nested_record() {
        let config: Config =
            decode("(name) demo\n(server)\n  (host) localhost\n  (port) 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "localhost");
    }

    #[test]
    fn test_case_folded_keys() {
        let server: Server = decode("(HOST) example.org\n(Port) 443\n").unwrap();
        assert_eq!(server.host, "example.org");
        assert_eq!(server.port, 443);
    }

    #[test]
    fn test_unknown_key_block_is_skipped() {
        let input = "(extra)\n  (deep)\n    > 1\n    > 2\n(host) h\n(port) 1\n";
        let server: Server = decode(input).unwrap();
        assert_eq!(server, Server { host: "h".into(), port: 1 });
    }

    #[test]
    fn test_root_scalar_is_invalid_target() {
        assert!(matches!(decode::<i32>("42"), Err(Error::InvalidTarget(_))));
        assert!(matches!(decode::<String>("(a) b"), Err(Error::InvalidTarget(_))));
    }

    #[test]
    fn test_type_error_carries_key_path() {
        let err = decode::<Config>("(name) x\n(server)\n  (host) h\n  (port) big\n").unwrap_err();
        match err {
            Error::TypeMismatch { key, expected, .. } => {
                assert_eq!(key, "server.port");
                assert_eq!(expected, "unsigned integer");
            }
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_list_index_in_key_path() {
        #[derive(Deserialize, Debug)]
        struct Holder {
            #[allow(dead_code)]
            ids: Vec<u8>,
        }
        match decode::<Holder>("(ids)\n  > 1\n  > 300\n").unwrap_err() {
            Error::TypeMismatch { key, .. } => assert_eq!(key, "ids[1]"),
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_block_is_syntax_error() {
        #[derive(Deserialize, Debug)]
        struct Holder {
            #[allow(dead_code)]
            items: Vec<String>,
        }
        let err = decode::<Holder>("(items)\n  > a\n  (b) c\n").unwrap_err();
        assert!(err.is_syntax());

        let err = decode::<Server>("(host) h\n> stray\n").unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_block_text() {
        let mut de = Deserializer::from_str("(t)\n    first\n      second\n\n  third\n");
        de.reader.peek().unwrap();
        let header = de.take().unwrap();
        let text = de.read_block_text(Scope::under(header.indent)).unwrap();
        assert_eq!(text, "first\n  second\n\nthird");
    }

    #[test]
    fn test_sets() {
        #[derive(Deserialize, Debug)]
        struct Roles {
            names: BTreeSet<String>,
            flags: BTreeMap<String, bool>,
        }
        let roles: Roles =
            decode("(names)\n  >| admin\n  >| dev\n(flags)\n  >| beta\n").unwrap();
        assert!(roles.names.contains("admin"));
        assert_eq!(roles.flags.get("beta"), Some(&true));
    }

    #[test]
    fn test_depth_limit() {
        let options = PimlOptions::new().with_max_depth(2);
        let mut de = Deserializer::with_options("(a)\n  (b)\n    (c) 1\n", options);
        let err = BTreeMap::<String, BTreeMap<String, BTreeMap<String, u8>>>::deserialize(&mut de)
            .unwrap_err();
        assert!(matches!(err, Error::DepthLimitExceeded { limit: 2, .. }));
    }

    #[test]
    fn test_duplicate_record_key_is_a_syntax_error() {
        let err = decode::<Server>("(host) a\n(port) 1\n(PORT) 2\n").unwrap_err();
        match err {
            Error::Syntax { line, msg, .. } => {
                assert_eq!(line, 3);
                assert!(msg.contains("duplicate key `port`"));
            }
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_map_key_keeps_last_value() {
        let map: BTreeMap<String, u8> = decode("(a) 1\n(a) 2\n").unwrap();
        assert_eq!(map.get("a"), Some(&2));
    }

    #[test]
    fn test_custom_scalar_rejection_becomes_type_mismatch() {
        #[derive(Debug)]
        struct Even(#[allow(dead_code)] u32);

        impl<'de> Deserialize<'de> for Even {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                let n = u32::deserialize(deserializer)?;
                if n % 2 == 0 {
                    Ok(Even(n))
                } else {
                    Err(de::Error::custom("odd number"))
                }
            }
        }

        #[derive(Deserialize, Debug)]
        struct Holder {
            #[allow(dead_code)]
            counts: Vec<Even>,
        }

        let err = decode::<Holder>("(counts)\n  > 2\n  > 3\n").unwrap_err();
        match err {
            Error::TypeMismatch {
                key,
                expected,
                found,
            } => {
                assert_eq!(key, "counts[1]");
                assert!(expected.contains("odd number"));
                assert_eq!(found, "\"3\"");
            }
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }
}
