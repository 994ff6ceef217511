//! Depth-first walk over the serde data model.
//!
//! The walker flattens any `Serialize` value into rows:
//!
//! - a top-level sequence (or tuple) yields one row per element,
//! - any other top-level value yields exactly one row,
//! - struct fields and map entries append their name to the key-path,
//! - sequences nested inside a row append the element position,
//! - every scalar leaf becomes one cell in the column its key-path resolves to.
//!
//! Columns are resolved on the fly; the first completed row freezes the
//! schema, the header (if any) is emitted, and from then on each row is
//! handed to the sink as soon as it is complete.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{
    Serialize, Serializer,
    ser::{
        Impossible, SerializeMap, SerializeSeq, SerializeStruct, SerializeTuple,
        SerializeTupleStruct,
    },
};

use crate::{
    core::{
        column::{ColumnResolver, KeyPath},
        config::{EncoderConfig, HeaderStrategy},
        format::{ScalarFormatter, ScalarRef},
        row::RowAssembler,
        value::DATE_TOKEN,
    },
    error::{EncodeError, EncodeResult},
    sink::RowSink,
};

/// Encodes `value` into `sink` and returns the number of data rows written.
pub fn walk<T, S>(value: &T, config: &EncoderConfig, sink: &mut S) -> EncodeResult<usize>
where
    T: Serialize + ?Sized,
    S: RowSink,
{
    let mut state = EncodeState::new(config, sink);
    value.serialize(RootSerializer { state: &mut state })?;
    state.finish()
}

/// Per-call state shared by every level of the walk.
pub struct EncodeState<'a, S> {
    config: &'a EncoderConfig,
    formatter: ScalarFormatter<'a>,
    resolver: ColumnResolver,
    row: RowAssembler,
    key_path: KeyPath,
    sink: &'a mut S,
    header_written: bool,
    rows: usize,
}

impl<'a, S: RowSink> EncodeState<'a, S> {
    pub fn new(config: &'a EncoderConfig, sink: &'a mut S) -> Self {
        Self {
            config,
            formatter: ScalarFormatter::new(config),
            resolver: ColumnResolver::new(),
            row: RowAssembler::new(),
            key_path: KeyPath::new(),
            sink,
            header_written: false,
            rows: 0,
        }
    }

    fn leaf(&mut self, scalar: ScalarRef<'_>) -> EncodeResult<()> {
        let index = self.resolver.resolve(&self.key_path)?;
        let text = self.formatter.format(&scalar, &self.key_path)?;
        self.row.put(index, text, &self.key_path)
    }

    fn structural(&self, message: impl Into<String>) -> EncodeError {
        EncodeError::Structural {
            key_path: self.key_path.to_string(),
            message: message.into(),
        }
    }

    fn finish_row(&mut self) -> EncodeResult<()> {
        if !self.resolver.is_frozen() {
            if self.resolver.is_empty() {
                return Err(self.structural("first row has no leaf values"));
            }
            self.resolver.freeze();
            self.write_header()?;
        }

        let cells = self.row.finish(self.resolver.len());
        self.sink.write_row(&cells)?;
        self.rows += 1;
        Ok(())
    }

    fn write_header(&mut self) -> EncodeResult<()> {
        let names = match self.config.header() {
            HeaderStrategy::None => return Ok(()),
            HeaderStrategy::FirstLine => {
                if let Some(name) = self.resolver.duplicate_column_name() {
                    return Err(EncodeError::Structural {
                        key_path: name,
                        message: "header name is shared by two key-paths".to_string(),
                    });
                }
                self.resolver.column_names()
            }
            HeaderStrategy::Explicit(names) => {
                if self.resolver.is_frozen() && names.len() != self.resolver.len() {
                    return Err(EncodeError::SchemaMismatch {
                        key_path: KeyPath::new().to_string(),
                        message: format!(
                            "explicit header has {} name(s) but the first row has {} column(s)",
                            names.len(),
                            self.resolver.len()
                        ),
                    });
                }
                names.clone()
            }
        };

        debug!("Writing header row with {} column(s)", names.len());
        self.sink.write_header(&names)?;
        self.header_written = true;
        Ok(())
    }

    /// Completes the walk. An explicit header is still written when the
    /// value produced no rows at all.
    fn finish(mut self) -> EncodeResult<usize> {
        if self.rows == 0
            && !self.header_written
            && matches!(self.config.header(), HeaderStrategy::Explicit(_))
        {
            self.write_header()?;
        }
        self.sink.flush()?;
        Ok(self.rows)
    }

    fn with_field<T>(&mut self, name: impl Into<String>, value: &T) -> EncodeResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.key_path.push_field(name);
        let result = value.serialize(&mut *self);
        self.key_path.pop();
        result
    }

    fn with_index<T>(&mut self, index: usize, value: &T) -> EncodeResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.key_path.push_index(index);
        let result = value.serialize(&mut *self);
        self.key_path.pop();
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nesting {
    /// Top-level sequence: every element is a row.
    Rows,
    /// Sequence inside a row: elements get positional segments.
    Elements,
    /// Struct or map: entries get field segments.
    Fields,
}

/// Serializer state for a compound value being walked.
pub struct Compound<'r, 'a, S> {
    state: &'r mut EncodeState<'a, S>,
    nesting: Nesting,
    /// A top-level struct or map completes the only row when it ends.
    root: bool,
    next_index: usize,
    pending_key: Option<String>,
}

impl<'r, 'a, S: RowSink> Compound<'r, 'a, S> {
    fn new(state: &'r mut EncodeState<'a, S>, nesting: Nesting, root: bool) -> Self {
        Self {
            state,
            nesting,
            root,
            next_index: 0,
            pending_key: None,
        }
    }

    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> EncodeResult<()> {
        if self.nesting == Nesting::Rows {
            value.serialize(&mut *self.state)?;
            return self.state.finish_row();
        }
        let index = self.next_index;
        self.next_index += 1;
        self.state.with_index(index, value)
    }

    fn end_compound(self) -> EncodeResult<()> {
        if self.root && self.nesting != Nesting::Rows {
            self.state.finish_row()
        } else {
            Ok(())
        }
    }
}

impl<S: RowSink> SerializeSeq for Compound<'_, '_, S> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> EncodeResult<()> {
        self.element(value)
    }

    fn end(self) -> EncodeResult<()> {
        self.end_compound()
    }
}

impl<S: RowSink> SerializeTuple for Compound<'_, '_, S> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> EncodeResult<()> {
        self.element(value)
    }

    fn end(self) -> EncodeResult<()> {
        self.end_compound()
    }
}

impl<S: RowSink> SerializeTupleStruct for Compound<'_, '_, S> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> EncodeResult<()> {
        self.element(value)
    }

    fn end(self) -> EncodeResult<()> {
        self.end_compound()
    }
}

impl<S: RowSink> SerializeStruct for Compound<'_, '_, S> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> EncodeResult<()> {
        self.state.with_field(key, value)
    }

    fn end(self) -> EncodeResult<()> {
        self.end_compound()
    }
}

impl<S: RowSink> SerializeMap for Compound<'_, '_, S> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> EncodeResult<()> {
        let key = key.serialize(TextCapture {
            key_path: &self.state.key_path,
            what: "map key",
        })?;
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> EncodeResult<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| self.state.structural("map value without a key"))?;
        self.state.with_field(key, value)
    }

    fn end(self) -> EncodeResult<()> {
        self.end_compound()
    }
}

/// Walks a value nested inside a row.
impl<'r, 'a, S: RowSink> Serializer for &'r mut EncodeState<'a, S> {
    type Ok = ();
    type Error = EncodeError;
    type SerializeSeq = Compound<'r, 'a, S>;
    type SerializeTuple = Compound<'r, 'a, S>;
    type SerializeTupleStruct = Compound<'r, 'a, S>;
    type SerializeTupleVariant = Impossible<(), EncodeError>;
    type SerializeMap = Compound<'r, 'a, S>;
    type SerializeStruct = Compound<'r, 'a, S>;
    type SerializeStructVariant = Impossible<(), EncodeError>;

    fn serialize_bool(self, v: bool) -> EncodeResult<()> {
        self.leaf(ScalarRef::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> EncodeResult<()> {
        self.leaf(ScalarRef::Int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> EncodeResult<()> {
        self.leaf(ScalarRef::Int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> EncodeResult<()> {
        self.leaf(ScalarRef::Int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> EncodeResult<()> {
        self.leaf(ScalarRef::Int(v.into()))
    }

    fn serialize_i128(self, v: i128) -> EncodeResult<()> {
        self.leaf(ScalarRef::Int(v))
    }

    fn serialize_u8(self, v: u8) -> EncodeResult<()> {
        self.leaf(ScalarRef::UInt(v.into()))
    }

    fn serialize_u16(self, v: u16) -> EncodeResult<()> {
        self.leaf(ScalarRef::UInt(v.into()))
    }

    fn serialize_u32(self, v: u32) -> EncodeResult<()> {
        self.leaf(ScalarRef::UInt(v.into()))
    }

    fn serialize_u64(self, v: u64) -> EncodeResult<()> {
        self.leaf(ScalarRef::UInt(v.into()))
    }

    fn serialize_u128(self, v: u128) -> EncodeResult<()> {
        self.leaf(ScalarRef::UInt(v))
    }

    fn serialize_f32(self, v: f32) -> EncodeResult<()> {
        self.leaf(ScalarRef::F32(v))
    }

    fn serialize_f64(self, v: f64) -> EncodeResult<()> {
        self.leaf(ScalarRef::F64(v))
    }

    fn serialize_char(self, v: char) -> EncodeResult<()> {
        self.leaf(ScalarRef::Char(v))
    }

    fn serialize_str(self, v: &str) -> EncodeResult<()> {
        self.leaf(ScalarRef::Str(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> EncodeResult<()> {
        self.leaf(ScalarRef::Bytes(v))
    }

    fn serialize_none(self) -> EncodeResult<()> {
        self.leaf(ScalarRef::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> EncodeResult<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> EncodeResult<()> {
        self.leaf(ScalarRef::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> EncodeResult<()> {
        self.leaf(ScalarRef::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> EncodeResult<()> {
        self.leaf(ScalarRef::Str(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> EncodeResult<()> {
        if name != DATE_TOKEN {
            return value.serialize(self);
        }

        let date = value.serialize(DateCapture {
            key_path: &self.key_path,
        })?;
        self.leaf(ScalarRef::Date(&date))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> EncodeResult<()> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> EncodeResult<Self::SerializeSeq> {
        Ok(Compound::new(self, Nesting::Elements, false))
    }

    fn serialize_tuple(self, _len: usize) -> EncodeResult<Self::SerializeTuple> {
        Ok(Compound::new(self, Nesting::Elements, false))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleStruct> {
        Ok(Compound::new(self, Nesting::Elements, false))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleVariant> {
        Err(self.structural(format!("tuple variant {}::{} cannot be flattened", name, variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> EncodeResult<Self::SerializeMap> {
        Ok(Compound::new(self, Nesting::Fields, false))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStruct> {
        Ok(Compound::new(self, Nesting::Fields, false))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStructVariant> {
        Err(self.structural(format!("struct variant {}::{} cannot be flattened", name, variant)))
    }
}

/// Walks the top-level value, deciding where rows begin and end.
pub struct RootSerializer<'r, 'a, S> {
    state: &'r mut EncodeState<'a, S>,
}

macro_rules! single_row {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> EncodeResult<()> {
                (&mut *self.state).$method(v)?;
                self.state.finish_row()
            }
        )*
    };
}

impl<'r, 'a, S: RowSink> Serializer for RootSerializer<'r, 'a, S> {
    type Ok = ();
    type Error = EncodeError;
    type SerializeSeq = Compound<'r, 'a, S>;
    type SerializeTuple = Compound<'r, 'a, S>;
    type SerializeTupleStruct = Compound<'r, 'a, S>;
    type SerializeTupleVariant = Impossible<(), EncodeError>;
    type SerializeMap = Compound<'r, 'a, S>;
    type SerializeStruct = Compound<'r, 'a, S>;
    type SerializeStructVariant = Impossible<(), EncodeError>;

    single_row! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    }

    fn serialize_none(self) -> EncodeResult<()> {
        (&mut *self.state).serialize_none()?;
        self.state.finish_row()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> EncodeResult<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> EncodeResult<()> {
        (&mut *self.state).serialize_unit()?;
        self.state.finish_row()
    }

    fn serialize_unit_struct(self, name: &'static str) -> EncodeResult<()> {
        (&mut *self.state).serialize_unit_struct(name)?;
        self.state.finish_row()
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> EncodeResult<()> {
        (&mut *self.state).serialize_unit_variant(name, variant_index, variant)?;
        self.state.finish_row()
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> EncodeResult<()> {
        if name == DATE_TOKEN {
            (&mut *self.state).serialize_newtype_struct(name, value)?;
            return self.state.finish_row();
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> EncodeResult<()> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> EncodeResult<Self::SerializeSeq> {
        Ok(Compound::new(self.state, Nesting::Rows, true))
    }

    fn serialize_tuple(self, _len: usize) -> EncodeResult<Self::SerializeTuple> {
        Ok(Compound::new(self.state, Nesting::Rows, true))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleStruct> {
        Ok(Compound::new(self.state, Nesting::Rows, true))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> EncodeResult<Self::SerializeTupleVariant> {
        self.state
            .serialize_tuple_variant(name, variant_index, variant, len)
    }

    fn serialize_map(self, _len: Option<usize>) -> EncodeResult<Self::SerializeMap> {
        Ok(Compound::new(self.state, Nesting::Fields, true))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStruct> {
        Ok(Compound::new(self.state, Nesting::Fields, true))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> EncodeResult<Self::SerializeStructVariant> {
        self.state
            .serialize_struct_variant(name, variant_index, variant, len)
    }
}

/// Captures a scalar as plain text: map keys and the parts of a date.
struct TextCapture<'k> {
    key_path: &'k KeyPath,
    what: &'static str,
}

impl TextCapture<'_> {
    fn reject(&self, kind: &str) -> EncodeError {
        EncodeError::Structural {
            key_path: self.key_path.to_string(),
            message: format!("{} must be a string or an integer, got {}", self.what, kind),
        }
    }
}

impl<'k> Serializer for TextCapture<'k> {
    type Ok = String;
    type Error = EncodeError;
    type SerializeSeq = Impossible<String, EncodeError>;
    type SerializeTuple = Impossible<String, EncodeError>;
    type SerializeTupleStruct = Impossible<String, EncodeError>;
    type SerializeTupleVariant = Impossible<String, EncodeError>;
    type SerializeMap = Impossible<String, EncodeError>;
    type SerializeStruct = Impossible<String, EncodeError>;
    type SerializeStructVariant = Impossible<String, EncodeError>;

    fn serialize_bool(self, v: bool) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, _v: f32) -> EncodeResult<String> {
        Err(self.reject("a float"))
    }

    fn serialize_f64(self, _v: f64) -> EncodeResult<String> {
        Err(self.reject("a float"))
    }

    fn serialize_char(self, v: char) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> EncodeResult<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> EncodeResult<String> {
        Err(self.reject("bytes"))
    }

    fn serialize_none(self) -> EncodeResult<String> {
        Err(self.reject("null"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> EncodeResult<String> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> EncodeResult<String> {
        Err(self.reject("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> EncodeResult<String> {
        Err(self.reject(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> EncodeResult<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> EncodeResult<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> EncodeResult<String> {
        Err(self.reject(variant))
    }

    fn serialize_seq(self, _len: Option<usize>) -> EncodeResult<Self::SerializeSeq> {
        Err(self.reject("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> EncodeResult<Self::SerializeTuple> {
        Err(self.reject("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleStruct> {
        Err(self.reject(name))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleVariant> {
        Err(self.reject(variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> EncodeResult<Self::SerializeMap> {
        Err(self.reject("a map"))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStruct> {
        Err(self.reject(name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStructVariant> {
        Err(self.reject(variant))
    }
}

/// Rebuilds the instant carried by the date newtype from its
/// `(seconds, nanoseconds)` form.
struct DateCapture<'k> {
    key_path: &'k KeyPath,
}

impl DateCapture<'_> {
    fn reject(&self, kind: &str) -> EncodeError {
        EncodeError::Structural {
            key_path: self.key_path.to_string(),
            message: format!("date payload must be a (seconds, nanoseconds) pair, got {}", kind),
        }
    }
}

impl<'k> Serializer for DateCapture<'k> {
    type Ok = DateTime<Utc>;
    type Error = EncodeError;
    type SerializeSeq = Impossible<DateTime<Utc>, EncodeError>;
    type SerializeTuple = DateParts<'k>;
    type SerializeTupleStruct = Impossible<DateTime<Utc>, EncodeError>;
    type SerializeTupleVariant = Impossible<DateTime<Utc>, EncodeError>;
    type SerializeMap = Impossible<DateTime<Utc>, EncodeError>;
    type SerializeStruct = Impossible<DateTime<Utc>, EncodeError>;
    type SerializeStructVariant = Impossible<DateTime<Utc>, EncodeError>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, _v: bool) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("a bool"))
    }

    fn serialize_i8(self, _v: i8) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_i16(self, _v: i16) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_i32(self, _v: i32) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_i64(self, _v: i64) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_u8(self, _v: u8) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_u16(self, _v: u16) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_u32(self, _v: u32) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_u64(self, _v: u64) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("an integer"))
    }

    fn serialize_f32(self, _v: f32) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("a float"))
    }

    fn serialize_f64(self, _v: f64) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("a float"))
    }

    fn serialize_char(self, _v: char) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("a char"))
    }

    fn serialize_str(self, _v: &str) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("a string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("bytes"))
    }

    fn serialize_none(self) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("null"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> EncodeResult<DateTime<Utc>> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> EncodeResult<DateTime<Utc>> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> EncodeResult<DateTime<Utc>> {
        Err(self.reject(variant))
    }

    fn serialize_seq(self, _len: Option<usize>) -> EncodeResult<Self::SerializeSeq> {
        Err(self.reject("a sequence"))
    }

    fn serialize_tuple(self, len: usize) -> EncodeResult<Self::SerializeTuple> {
        if len != 2 {
            return Err(self.reject("a tuple of another length"));
        }
        Ok(DateParts {
            key_path: self.key_path,
            parts: Vec::with_capacity(2),
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleStruct> {
        Err(self.reject(name))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeTupleVariant> {
        Err(self.reject(variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> EncodeResult<Self::SerializeMap> {
        Err(self.reject("a map"))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStruct> {
        Err(self.reject(name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> EncodeResult<Self::SerializeStructVariant> {
        Err(self.reject(variant))
    }
}

struct DateParts<'k> {
    key_path: &'k KeyPath,
    parts: Vec<String>,
}

impl SerializeTuple for DateParts<'_> {
    type Ok = DateTime<Utc>;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> EncodeResult<()> {
        let part = value.serialize(TextCapture {
            key_path: self.key_path,
            what: "date part",
        })?;
        self.parts.push(part);
        Ok(())
    }

    fn end(self) -> EncodeResult<DateTime<Utc>> {
        let date = match self.parts.as_slice() {
            [seconds, nanos] => match (seconds.parse::<i64>(), nanos.parse::<u32>()) {
                (Ok(seconds), Ok(nanos)) => DateTime::from_timestamp(seconds, nanos),
                _ => None,
            },
            _ => None,
        };

        date.ok_or_else(|| EncodeError::Encoding {
            key_path: self.key_path.to_string(),
            message: format!("({}) is not a representable date", self.parts.join(", ")),
        })
    }
}
