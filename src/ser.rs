//! PIML serialization.
//!
//! This module provides the [`Serializer`] that writes Rust data structures
//! as PIML text.
//!
//! ## Overview
//!
//! The serializer streams lines straight into its output buffer:
//!
//! - **Records** render as `(key)` lines in declaration order
//! - **Lists** render as `> value` lines, or `> (TypeName)` headers for
//!   records and maps
//! - **Multi-line strings** render as an indented text block under a
//!   key-only header
//! - **Nil and empty collections** both collapse to the `nil` literal
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_piml::to_string;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Site { name: String, tags: Vec<String> }
//!
//! let site = Site { name: "Example".into(), tags: vec!["web".into()] };
//! assert_eq!(to_string(&site).unwrap(), "(name) Example\n(tags)\n  > web\n");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde_piml::{PimlOptions, Serializer};
//! use serde::Serialize;
//!
//! let mut serializer = Serializer::new(PimlOptions::new());
//! vec![1, 2, 3].serialize(&mut serializer).unwrap();
//! assert_eq!(serializer.into_inner(), "> 1\n> 2\n> 3\n");
//! ```

use crate::scalar::{escape, NIL};
use crate::{Error, PimlOptions, Result};
use serde::ser::{self, Impossible, Serialize, Serializer as _};
use std::fmt::Display;

/// The PIML serializer.
///
/// Created via [`Serializer::new`]; one instance renders one document.
pub struct Serializer {
    output: String,
    options: PimlOptions,
}

impl Serializer {
    pub fn new(options: PimlOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn indent(&mut self, level: usize) {
        let pad = self.options.indent_str(level);
        self.output.push_str(&pad);
    }

    fn write_key(&mut self, level: usize, key: &str) -> Result<()> {
        if key.contains(')') || key.contains('\n') {
            return Err(Error::unsupported_type(&format!(
                "key {:?} cannot contain ')' or a line break",
                key
            )));
        }
        self.indent(level);
        self.output.push('(');
        self.output.push_str(&escape(key));
        self.output.push(')');
        Ok(())
    }

    fn at(&mut self, pos: Position) -> ValueSerializer<'_> {
        ValueSerializer { ser: self, pos }
    }
}

/// Where the next value lands.
#[derive(Clone, Copy, Debug)]
enum Position {
    /// The whole document.
    Root,
    /// Right after a `(key)` written at `level`.
    AfterKey { level: usize },
    /// A list element whose `>` marker sits at `level`.
    ListItem { level: usize },
}

impl Position {
    /// Level of lines nested under this position.
    fn child_level(self) -> usize {
        match self {
            Position::Root => 0,
            Position::AfterKey { level } | Position::ListItem { level } => level + 1,
        }
    }
}

/// Serializes one value at a given position.
pub struct ValueSerializer<'a> {
    ser: &'a mut Serializer,
    pos: Position,
}

impl<'a> ValueSerializer<'a> {
    fn write_scalar(self, text: &str) -> Result<()> {
        match self.pos {
            Position::Root => Err(Error::unsupported_type(
                "a document must be a record, map or list, not a bare scalar",
            )),
            Position::AfterKey { .. } => {
                if !text.is_empty() {
                    self.ser.output.push(' ');
                    self.ser.output.push_str(&escape(text));
                }
                self.ser.output.push('\n');
                Ok(())
            }
            Position::ListItem { level } => {
                self.ser.indent(level);
                self.ser.output.push('>');
                if !text.is_empty() {
                    self.ser.output.push(' ');
                    self.ser.output.push_str(&escape(text));
                }
                self.ser.output.push('\n');
                Ok(())
            }
        }
    }

    fn write_display<T: Display>(self, value: T) -> Result<()> {
        self.write_scalar(&value.to_string())
    }

    fn write_nil(self) -> Result<()> {
        match self.pos {
            Position::Root => {}
            Position::AfterKey { .. } => {
                self.ser.output.push(' ');
                self.ser.output.push_str(NIL);
                self.ser.output.push('\n');
            }
            Position::ListItem { level } => {
                self.ser.indent(level);
                self.ser.output.push_str("> ");
                self.ser.output.push_str(NIL);
                self.ser.output.push('\n');
            }
        }
        Ok(())
    }

    fn write_text_block(self, text: &str) -> Result<()> {
        let level = match self.pos {
            Position::AfterKey { level } => level + 1,
            _ => {
                return Err(Error::unsupported_type(
                    "multi-line strings are only supported as keyed values",
                ))
            }
        };
        self.ser.output.push('\n');
        for line in text.split('\n') {
            if !line.is_empty() {
                self.ser.indent(level);
                self.ser.output.push_str(&escape(line));
            }
            self.ser.output.push('\n');
        }
        Ok(())
    }
}

impl<'a> ser::Serializer for ValueSerializer<'a> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a>;
    type SerializeTuple = SeqSerializer<'a>;
    type SerializeTupleStruct = SeqSerializer<'a>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = MapSerializer<'a>;
    type SerializeStruct = StructSerializer<'a>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.write_scalar(if v { "true" } else { "false" })
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.write_display(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.write_scalar(v.encode_utf8(&mut [0; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        if v.contains('\n') {
            self.write_text_block(v)
        } else {
            self.write_scalar(v)
        }
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        use ser::SerializeSeq;
        let mut seq = self.serialize_seq(Some(v.len()))?;
        for byte in v {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }

    fn serialize_none(self) -> Result<()> {
        self.write_nil()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.write_nil()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.write_nil()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.write_scalar(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::unsupported_type(&format!(
            "enum variant {}::{} carries data; only unit variants are supported",
            name, variant
        )))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        if let Position::ListItem { .. } = self.pos {
            return Err(Error::unsupported_type("lists nested directly in lists"));
        }
        let level = self.pos.child_level();
        Ok(SeqSerializer {
            ser: self.ser,
            pos: self.pos,
            level,
            count: 0,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::unsupported_type(&format!(
            "enum variant {}::{} carries data; only unit variants are supported",
            name, variant
        )))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        let level = self.pos.child_level();
        let sorted = self.ser.options.sort_map_keys.then(Vec::new);
        Ok(MapSerializer {
            ser: self.ser,
            pos: self.pos,
            level,
            key: None,
            count: 0,
            sorted,
        })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        let level = self.pos.child_level();
        match self.pos {
            Position::Root => {}
            Position::AfterKey { .. } => self.ser.output.push('\n'),
            Position::ListItem { level } => {
                self.ser.indent(level);
                self.ser.output.push_str("> (");
                self.ser.output.push_str(&escape(name));
                self.ser.output.push_str(")\n");
            }
        }
        Ok(StructSerializer {
            ser: self.ser,
            level,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::unsupported_type(&format!(
            "enum variant {}::{} carries data; only unit variants are supported",
            name, variant
        )))
    }
}

macro_rules! forward_to_root {
    ($($method:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        $(
            fn $method(self, $($arg: $ty),*) -> Result<$ret> {
                self.at(Position::Root).$method($($arg),*)
            }
        )*
    };
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a>;
    type SerializeTuple = SeqSerializer<'a>;
    type SerializeTupleStruct = SeqSerializer<'a>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = MapSerializer<'a>;
    type SerializeStruct = StructSerializer<'a>;
    type SerializeStructVariant = Impossible<(), Error>;

    forward_to_root! {
        serialize_bool(v: bool) -> ();
        serialize_i8(v: i8) -> ();
        serialize_i16(v: i16) -> ();
        serialize_i32(v: i32) -> ();
        serialize_i64(v: i64) -> ();
        serialize_i128(v: i128) -> ();
        serialize_u8(v: u8) -> ();
        serialize_u16(v: u16) -> ();
        serialize_u32(v: u32) -> ();
        serialize_u64(v: u64) -> ();
        serialize_u128(v: u128) -> ();
        serialize_f32(v: f32) -> ();
        serialize_f64(v: f64) -> ();
        serialize_char(v: char) -> ();
        serialize_str(v: &str) -> ();
        serialize_bytes(v: &[u8]) -> ();
        serialize_none() -> ();
        serialize_unit() -> ();
        serialize_unit_struct(name: &'static str) -> ();
        serialize_unit_variant(name: &'static str, index: u32, variant: &'static str) -> ();
        serialize_seq(len: Option<usize>) -> SeqSerializer<'a>;
        serialize_tuple(len: usize) -> SeqSerializer<'a>;
        serialize_tuple_struct(name: &'static str, len: usize) -> SeqSerializer<'a>;
        serialize_tuple_variant(
            name: &'static str,
            index: u32,
            variant: &'static str,
            len: usize
        ) -> Impossible<(), Error>;
        serialize_map(len: Option<usize>) -> MapSerializer<'a>;
        serialize_struct(name: &'static str, len: usize) -> StructSerializer<'a>;
        serialize_struct_variant(
            name: &'static str,
            index: u32,
            variant: &'static str,
            len: usize
        ) -> Impossible<(), Error>;
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.at(Position::Root).serialize_some(value)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.at(Position::Root).serialize_newtype_struct(name, value)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.at(Position::Root)
            .serialize_newtype_variant(name, variant_index, variant, value)
    }
}

/// Writes list elements; also used for tuples.
pub struct SeqSerializer<'a> {
    ser: &'a mut Serializer,
    pos: Position,
    level: usize,
    count: usize,
}

impl<'a> SeqSerializer<'a> {
    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if self.count == 0 {
            if let Position::AfterKey { .. } = self.pos {
                self.ser.output.push('\n');
            }
        }
        let index = self.count;
        self.count += 1;
        value
            .serialize(self.ser.at(Position::ListItem { level: self.level }))
            .map_err(|e| e.at(&format!("[{}]", index)))
    }

    fn finish(self) -> Result<()> {
        if self.count == 0 {
            tracing::trace!(level = self.level, "empty list written as nil");
            return self.ser.at(self.pos).write_nil();
        }
        Ok(())
    }
}

impl<'a> ser::SerializeSeq for SeqSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTuple for SeqSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleStruct for SeqSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Writes map entries as `(key)` lines.
///
/// The opening line break (or `> (item)` header in a list) is written with
/// the first entry so that an empty map can still collapse to `nil`. With
/// sorted keys each entry is rendered aside and emitted at the end.
pub struct MapSerializer<'a> {
    ser: &'a mut Serializer,
    pos: Position,
    level: usize,
    key: Option<String>,
    count: usize,
    sorted: Option<Vec<(String, String)>>,
}

impl<'a> MapSerializer<'a> {
    fn open(&mut self) {
        match self.pos {
            Position::Root => {}
            Position::AfterKey { .. } => self.ser.output.push('\n'),
            Position::ListItem { level } => {
                self.ser.indent(level);
                self.ser.output.push_str("> (item)\n");
            }
        }
    }

    fn write_entry<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.write_key(self.level, key)?;
        value
            .serialize(self.ser.at(Position::AfterKey { level: self.level }))
            .map_err(|e| e.at(key))
    }
}

impl<'a> ser::SerializeMap for MapSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        if self.count == 0 {
            self.open();
        }
        self.count += 1;

        if self.sorted.is_none() {
            return self.write_entry(&key, value);
        }
        let saved = std::mem::take(&mut self.ser.output);
        let result = self.write_entry(&key, value);
        let rendered = std::mem::replace(&mut self.ser.output, saved);
        result?;
        if let Some(entries) = self.sorted.as_mut() {
            entries.push((key, rendered));
        }
        Ok(())
    }

    fn end(mut self) -> Result<()> {
        if self.count == 0 {
            tracing::trace!(level = self.level, "empty map written as nil");
            return self.ser.at(self.pos).write_nil();
        }
        if let Some(mut entries) = self.sorted.take() {
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, rendered) in entries {
                self.ser.output.push_str(&rendered);
            }
        }
        Ok(())
    }
}

/// Writes record fields as `(key)` lines in declaration order.
pub struct StructSerializer<'a> {
    ser: &'a mut Serializer,
    level: usize,
}

impl<'a> ser::SerializeStruct for StructSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.write_key(self.level, key)?;
        value
            .serialize(self.ser.at(Position::AfterKey { level: self.level }))
            .map_err(|e| e.at(key))
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

fn key_must_be_string() -> Error {
    Error::unsupported_type("map keys must be strings")
}

macro_rules! reject_key {
    ($($method:ident($($ty:ty),*);)*) => {
        $(
            fn $method(self, $(_: $ty),*) -> Result<String> {
                Err(key_must_be_string())
            }
        )*
    };
}

/// Extracts the text of a map key.
struct KeySerializer;

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    reject_key! {
        serialize_bool(bool);
        serialize_i8(i8);
        serialize_i16(i16);
        serialize_i32(i32);
        serialize_i64(i64);
        serialize_u8(u8);
        serialize_u16(u16);
        serialize_u32(u32);
        serialize_u64(u64);
        serialize_f32(f32);
        serialize_f64(f64);
        serialize_bytes(&[u8]);
        serialize_none();
        serialize_unit();
        serialize_unit_struct(&'static str);
    }

    fn serialize_some<T>(self, _value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_string())
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(key_must_be_string())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_string())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_string())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_string())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_string())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_string())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_string())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn render<T: Serialize>(value: &T) -> Result<String> {
        let mut ser = Serializer::new(PimlOptions::new());
        value.serialize(&mut ser)?;
        Ok(ser.into_inner())
    }

    #[derive(Serialize)]
    struct Member {
        id: u32,
        name: String,
    }

    #[derive(Serialize)]
    struct Team {
        name: String,
        lead: Option<Member>,
        members: Vec<Member>,
        labels: Vec<String>,
    }

    #[test]
    fn test_records_in_lists() {
        let team = Team {
            name: "core".into(),
            lead: None,
            members: vec![Member {
                id: 1,
                name: "Ann".into(),
            }],
            labels: vec![],
        };
        assert_eq!(
            render(&team).unwrap(),
            "(name) core\n(lead) nil\n(members)\n  > (Member)\n    (id) 1\n    (name) Ann\n(labels) nil\n"
        );
    }

    #[test]
    fn test_map_in_list_uses_item_label() {
        let mut entry = BTreeMap::new();
        entry.insert("k", "v");
        let mut root = BTreeMap::new();
        root.insert("rows", vec![entry]);
        assert_eq!(render(&root).unwrap(), "(rows)\n  > (item)\n    (k) v\n");
    }

    #[test]
    fn test_text_block() {
        let mut root = BTreeMap::new();
        root.insert("body", "# Title\n\nline two");
        assert_eq!(
            render(&root).unwrap(),
            "(body)\n  \\# Title\n\n  line two\n"
        );
    }

    #[test]
    fn test_escaped_scalars() {
        let mut root = BTreeMap::new();
        root.insert("color", "#fff");
        root.insert("empty", "");
        root.insert("paren", "(not a key)");
        assert_eq!(
            render(&root).unwrap(),
            "(color) \\#fff\n(empty)\n(paren) \\(not a key)\n"
        );
    }

    #[test]
    fn test_list_items_escape_markers() {
        let items = vec!["(x)", "", "> y"];
        let mut root = BTreeMap::new();
        root.insert("items", items);
        assert_eq!(
            render(&root).unwrap(),
            "(items)\n  > \\(x)\n  >\n  > \\> y\n"
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        assert!(matches!(render(&5), Err(Error::UnsupportedType(_))));
        assert!(matches!(
            render(&vec![vec![1]]),
            Err(Error::UnsupportedType(_))
        ));

        let mut bad = BTreeMap::new();
        bad.insert("a)b", 1);
        assert!(matches!(render(&bad), Err(Error::UnsupportedType(_))));

        let mut numeric = BTreeMap::new();
        numeric.insert(1, 1);
        assert!(matches!(render(&numeric), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_sorted_map_keys() {
        let mut headers = std::collections::HashMap::new();
        for key in ["zeta", "alpha", "mid"] {
            headers.insert(key.to_string(), 1);
        }
        let mut ser = Serializer::new(PimlOptions::new().with_sorted_map_keys(true));
        headers.serialize(&mut ser).unwrap();
        assert_eq!(ser.into_inner(), "(alpha) 1\n(mid) 1\n(zeta) 1\n");
    }

    #[test]
    fn test_custom_indent() {
        let mut inner = BTreeMap::new();
        inner.insert("b", 1);
        let mut root = BTreeMap::new();
        root.insert("a", inner);
        let mut ser = Serializer::new(PimlOptions::new().with_indent(4));
        root.serialize(&mut ser).unwrap();
        assert_eq!(ser.into_inner(), "(a)\n    (b) 1\n");
    }
}
