use std::io::Read;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use kdbipc_frame::{Endianness, FrameConfig, Message, MessageHeader, MessageReader, HEADER_SIZE};
use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::error::{DecodeError, Result};
use crate::temporal::{self, Month, Temporal};
use crate::types::{Attribute, BaseType, DICT, ERROR, FUNCTION, LIST, SORTED_DICT, TABLE};
use crate::value::{Atom, Data, Dict, Function, Table, Value, Vector};

/// Resource ceilings applied to one decode call.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum nesting depth of values; the top-level value is depth 1.
    pub max_depth: u32,
    /// Maximum cumulative vector/list element count for one message.
    pub max_elements: usize,
    /// Envelope limits applied when reading from a stream.
    pub frame: FrameConfig,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_elements: 64 * 1024 * 1024,
            frame: FrameConfig::default(),
        }
    }
}

/// Read one message from `reader` and decode it with default options.
///
/// On success the reader is positioned exactly after the message.
pub fn decode<R: Read>(reader: &mut R) -> Result<Value> {
    decode_with_options(reader, &DecodeOptions::default()).map(|(_, value)| value)
}

/// Read one message from `reader` and decode it, returning the envelope too.
pub fn decode_with_options<R: Read>(
    reader: &mut R,
    options: &DecodeOptions,
) -> Result<(MessageHeader, Value)> {
    let mut messages = MessageReader::with_config(reader, options.frame.clone());
    let message = messages.read_message()?;
    let value = decode_message(&message, options)?;
    Ok((message.header, value))
}

/// Decode the body of an already framed message.
pub fn decode_message(message: &Message, options: &DecodeOptions) -> Result<Value> {
    decode_value(&message.body, message.header.endianness, options)
}

/// Decode one value from a message body (the bytes after the envelope).
///
/// A remote error signal is returned as [`DecodeError::Protocol`].
pub fn decode_value(body: &[u8], endianness: Endianness, options: &DecodeOptions) -> Result<Value> {
    let mut decoder = Decoder {
        cursor: Cursor::new(body, HEADER_SIZE, endianness),
        options,
        depth: 0,
        elements: 0,
    };

    let value = decoder.read_value()?;

    let trailing = decoder.cursor.remaining();
    if trailing > 0 {
        warn!(
            trailing,
            offset = decoder.cursor.offset(),
            "message body has undecoded trailing bytes"
        );
    }
    debug!(
        type_code = value.type_code,
        elements = decoder.elements,
        "decoded message body"
    );

    Ok(value)
}

struct Decoder<'a, 'o> {
    cursor: Cursor<'a>,
    options: &'o DecodeOptions,
    depth: u32,
    elements: usize,
}

impl<'a> Decoder<'a, '_> {
    fn read_value(&mut self) -> Result<Value> {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                max_depth: self.options.max_depth,
            });
        }

        self.depth += 1;
        let value = self.dispatch();
        self.depth -= 1;
        value
    }

    fn dispatch(&mut self) -> Result<Value> {
        let offset = self.cursor.offset();
        let code = self.cursor.read_i8()?;

        match code {
            ERROR => {
                let message = self.cursor.read_cstring()?;
                debug!(%message, offset, "decoded remote error signal");
                Err(DecodeError::Protocol(message))
            }
            -127..=-1 => {
                let base = base_type(code.unsigned_abs(), code, offset)?;
                let atom = read_atom(&mut self.cursor, base)?;
                Ok(Value::new(code, Data::Atom(atom)))
            }
            LIST => self.read_list(),
            1..=19 => {
                let base = base_type(code.unsigned_abs(), code, offset)?;
                let attribute = self.read_attribute()?;
                let vector = self.read_vector(base)?;
                Ok(Value::new(code, Data::Vector(vector)).with_attribute(attribute))
            }
            TABLE => self.read_table(),
            DICT | SORTED_DICT => self.read_dict(code),
            FUNCTION => self.read_function(),
            _ => Err(DecodeError::UnknownType { code, offset }),
        }
    }

    fn read_attribute(&mut self) -> Result<Attribute> {
        let offset = self.cursor.offset();
        let byte = self.cursor.read_u8()?;
        Attribute::from_byte(byte).ok_or(DecodeError::InvalidAttribute { byte, offset })
    }

    /// Read a 4-byte element count and check it against the remaining bytes
    /// (at `min_width` bytes per element) and the per-message element budget.
    fn read_count(&mut self, min_width: usize) -> Result<usize> {
        let offset = self.cursor.offset();
        let count = self.cursor.read_i32()?;
        let count = usize::try_from(count).map_err(|_| DecodeError::InvalidCount { count, offset })?;

        self.cursor.ensure(count.saturating_mul(min_width))?;

        self.elements = self.elements.saturating_add(count);
        if self.elements > self.options.max_elements {
            return Err(DecodeError::TooManyElements {
                count: self.elements,
                max: self.options.max_elements,
            });
        }
        Ok(count)
    }

    fn read_elements<T>(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Cursor<'a>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(read(&mut self.cursor)?);
        }
        Ok(out)
    }

    fn read_vector(&mut self, base: BaseType) -> Result<Vector> {
        // Symbols are at least one terminator byte each.
        let count = self.read_count(base.width().unwrap_or(1))?;

        let vector = match base {
            BaseType::Boolean => Vector::Boolean(self.read_elements(count, Cursor::read_bool)?),
            BaseType::Guid => Vector::Guid(self.read_elements(count, Cursor::read_guid)?),
            BaseType::Byte => Vector::Byte(self.cursor.read_exact(count)?.to_vec()),
            BaseType::Short => Vector::Short(self.read_elements(count, Cursor::read_i16)?),
            BaseType::Int => Vector::Int(self.read_elements(count, Cursor::read_i32)?),
            BaseType::Long => Vector::Long(self.read_elements(count, Cursor::read_i64)?),
            BaseType::Real => Vector::Real(self.read_elements(count, Cursor::read_f32)?),
            BaseType::Float => Vector::Float(self.read_elements(count, Cursor::read_f64)?),
            BaseType::Char => Vector::Char(self.cursor.read_latin1(count)?),
            BaseType::Symbol => Vector::Symbol(self.read_elements(count, Cursor::read_cstring)?),
            BaseType::Timestamp => Vector::Timestamp(self.read_elements(count, read_timestamp)?),
            BaseType::Month => Vector::Month(self.read_elements(count, read_month)?),
            BaseType::Date => Vector::Date(self.read_elements(count, read_date)?),
            BaseType::Datetime => Vector::Datetime(self.read_elements(count, read_datetime)?),
            BaseType::Timespan => Vector::Timespan(self.read_elements(count, read_timespan)?),
            BaseType::Minute => Vector::Minute(self.read_elements(count, read_minute)?),
            BaseType::Second => Vector::Second(self.read_elements(count, read_second)?),
            BaseType::Time => Vector::Time(self.read_elements(count, read_time)?),
        };
        Ok(vector)
    }

    fn read_list(&mut self) -> Result<Value> {
        let attribute = self.read_attribute()?;
        // Every child needs at least its type code byte.
        let count = self.read_count(1)?;

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.read_value()?);
        }
        Ok(Value::new(LIST, Data::List(items)).with_attribute(attribute))
    }

    fn read_dict(&mut self, code: i8) -> Result<Value> {
        let keys = self.read_value()?;
        let values = self.read_value()?;
        Ok(Value::new(
            code,
            Data::Dict(Dict {
                keys: Box::new(keys),
                values: Box::new(values),
            }),
        ))
    }

    fn read_table(&mut self) -> Result<Value> {
        let attribute = self.read_attribute()?;
        let offset = self.cursor.offset();
        let inner = self.read_value()?;

        let data = match into_table(inner.data) {
            Ok(table) => Data::Table(table),
            Err(data) => {
                warn!(
                    offset,
                    found = inner.type_code,
                    "table body is not a symbol-keyed dict of a general list"
                );
                data
            }
        };
        Ok(Value::new(TABLE, data).with_attribute(attribute))
    }

    fn read_function(&mut self) -> Result<Value> {
        let namespace = self.cursor.read_cstring()?;
        let offset = self.cursor.offset();
        let source = self.read_value()?;

        let found = source.type_code;
        let Data::Vector(Vector::Char(body)) = source.data else {
            return Err(DecodeError::UnexpectedShape {
                expected: "char vector",
                found,
                offset,
            });
        };
        Ok(Value::new(FUNCTION, Data::Function(Function { namespace, body })))
    }
}

fn base_type(abs: u8, code: i8, offset: usize) -> Result<BaseType> {
    BaseType::from_code(abs).ok_or(DecodeError::UnknownType { code, offset })
}

/// Split a decoded table body into columns, or hand the data back untouched.
fn into_table(data: Data) -> std::result::Result<Table, Data> {
    let (keys, values) = match data {
        Data::Dict(Dict { keys, values }) => (*keys, *values),
        other => return Err(other),
    };

    match (keys.data, values.data) {
        (Data::Vector(Vector::Symbol(columns)), Data::List(data)) if columns.len() == data.len() => {
            Ok(Table { columns, data })
        }
        (key_data, value_data) => Err(Data::Dict(Dict {
            keys: Box::new(Value {
                data: key_data,
                ..keys
            }),
            values: Box::new(Value {
                data: value_data,
                ..values
            }),
        })),
    }
}

fn read_atom(cursor: &mut Cursor<'_>, base: BaseType) -> Result<Atom> {
    let atom = match base {
        BaseType::Boolean => Atom::Boolean(cursor.read_bool()?),
        BaseType::Guid => Atom::Guid(cursor.read_guid()?),
        BaseType::Byte => Atom::Byte(cursor.read_u8()?),
        BaseType::Short => Atom::Short(cursor.read_i16()?),
        BaseType::Int => Atom::Int(cursor.read_i32()?),
        BaseType::Long => Atom::Long(cursor.read_i64()?),
        BaseType::Real => Atom::Real(cursor.read_f32()?),
        BaseType::Float => Atom::Float(cursor.read_f64()?),
        BaseType::Char => Atom::Char(cursor.read_char()?),
        BaseType::Symbol => Atom::Symbol(cursor.read_cstring()?),
        BaseType::Timestamp => Atom::Timestamp(read_timestamp(cursor)?),
        BaseType::Month => Atom::Month(read_month(cursor)?),
        BaseType::Date => Atom::Date(read_date(cursor)?),
        BaseType::Datetime => Atom::Datetime(read_datetime(cursor)?),
        BaseType::Timespan => Atom::Timespan(read_timespan(cursor)?),
        BaseType::Minute => Atom::Minute(read_minute(cursor)?),
        BaseType::Second => Atom::Second(read_second(cursor)?),
        BaseType::Time => Atom::Time(read_time(cursor)?),
    };
    Ok(atom)
}

fn read_timestamp(cursor: &mut Cursor<'_>) -> Result<Temporal<DateTime<Utc>>> {
    let offset = cursor.offset();
    temporal::timestamp(cursor.read_i64()?)
        .ok_or_else(|| out_of_range(BaseType::Timestamp, offset))
}

fn read_month(cursor: &mut Cursor<'_>) -> Result<Month> {
    Ok(temporal::month(cursor.read_i32()?))
}

fn read_date(cursor: &mut Cursor<'_>) -> Result<Temporal<NaiveDate>> {
    let offset = cursor.offset();
    temporal::date(cursor.read_i32()?).ok_or_else(|| out_of_range(BaseType::Date, offset))
}

fn read_datetime(cursor: &mut Cursor<'_>) -> Result<Temporal<DateTime<Utc>>> {
    let offset = cursor.offset();
    temporal::datetime(cursor.read_f64()?)
        .ok_or_else(|| out_of_range(BaseType::Datetime, offset))
}

/// An ordinary (non-sentinel) offset beyond chrono's calendar.
fn out_of_range(base: BaseType, offset: usize) -> DecodeError {
    DecodeError::TemporalOutOfRange {
        kind: base.name(),
        offset,
    }
}

fn read_timespan(cursor: &mut Cursor<'_>) -> Result<TimeDelta> {
    Ok(temporal::timespan(cursor.read_i64()?))
}

fn read_minute(cursor: &mut Cursor<'_>) -> Result<TimeDelta> {
    Ok(temporal::minute(cursor.read_i32()?))
}

fn read_second(cursor: &mut Cursor<'_>) -> Result<TimeDelta> {
    Ok(temporal::second(cursor.read_i32()?))
}

fn read_time(cursor: &mut Cursor<'_>) -> Result<TimeDelta> {
    Ok(temporal::time(cursor.read_i32()?))
}
