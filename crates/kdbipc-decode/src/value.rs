use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use uuid::Uuid;

use crate::temporal::{Month, Temporal};
use crate::types::{Attribute, BaseType, SORTED_DICT, TABLE};

/// One decoded value together with the wire type code it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    /// Signed wire type code, kept as received (e.g. 127 for a sorted dict).
    pub type_code: i8,
    /// Attribute byte for vectors, lists and tables; `None` elsewhere.
    pub attribute: Attribute,
    pub data: Data,
}

/// Decoded payload shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Atom(Atom),
    Vector(Vector),
    /// General list; elements need not share a type.
    List(Vec<Value>),
    Dict(Dict),
    Table(Table),
    Function(Function),
}

/// Scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Boolean(bool),
    Guid(Uuid),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Real(f32),
    Float(f64),
    Char(char),
    Symbol(String),
    Timestamp(Temporal<DateTime<Utc>>),
    Month(Month),
    Date(Temporal<NaiveDate>),
    /// Millisecond resolution.
    Datetime(Temporal<DateTime<Utc>>),
    Timespan(TimeDelta),
    Minute(TimeDelta),
    Second(TimeDelta),
    /// Time since midnight.
    Time(TimeDelta),
}

/// Homogeneous vector of one base type.
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    Boolean(Vec<bool>),
    Guid(Vec<Uuid>),
    Byte(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Real(Vec<f32>),
    Float(Vec<f64>),
    /// A char vector is one string, each wire byte mapped as Latin-1.
    Char(String),
    Symbol(Vec<String>),
    Timestamp(Vec<Temporal<DateTime<Utc>>>),
    Month(Vec<Month>),
    Date(Vec<Temporal<NaiveDate>>),
    Datetime(Vec<Temporal<DateTime<Utc>>>),
    Timespan(Vec<TimeDelta>),
    Minute(Vec<TimeDelta>),
    Second(Vec<TimeDelta>),
    Time(Vec<TimeDelta>),
}

/// Keys value paired with a values value.
///
/// Equal element counts on both sides are expected but not guaranteed by the
/// wire format; see [`Dict::is_consistent`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dict {
    pub keys: Box<Value>,
    pub values: Box<Value>,
}

/// Column-oriented table: names and column values, positionally paired.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub data: Vec<Value>,
}

/// Serialized lambda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Empty for the root namespace.
    pub namespace: String,
    /// q source text.
    pub body: String,
}

/// A dict whose keys and values are both tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedTable<'a> {
    pub keys: &'a Table,
    pub values: &'a Table,
}

impl Value {
    pub fn new(type_code: i8, data: Data) -> Self {
        Self {
            type_code,
            attribute: Attribute::None,
            data,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn is_atom(&self) -> bool {
        matches!(self.data, Data::Atom(_))
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match &self.data {
            Data::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Vector> {
        match &self.data {
            Data::Vector(vector) => Some(vector),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match &self.data {
            Data::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match &self.data {
            Data::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// The table, if this value decoded to the table shape.
    ///
    /// A value with type code 98 whose body was not a symbol-keyed dict of a
    /// general list carries the decoded data instead and returns `None` here.
    pub fn as_table(&self) -> Option<&Table> {
        match &self.data {
            Data::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.data {
            Data::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Recognize a keyed table: a dict whose keys and values are both tables.
    pub fn as_keyed_table(&self) -> Option<KeyedTable<'_>> {
        self.as_dict().and_then(Dict::as_keyed_table)
    }

    pub fn is_keyed_table(&self) -> bool {
        self.as_keyed_table().is_some()
    }

    /// True for a dict sent with the sorted dict type code.
    pub fn is_sorted_dict(&self) -> bool {
        self.type_code == SORTED_DICT && matches!(self.data, Data::Dict(_))
    }

    /// True when type code 98 arrived but the body was not table-shaped.
    pub fn is_malformed_table(&self) -> bool {
        self.type_code == TABLE && !matches!(self.data, Data::Table(_))
    }

    /// Element count for vectors and lists, row count for tables, key count
    /// for dicts. `None` for atoms, functions and ragged tables.
    pub fn len(&self) -> Option<usize> {
        match &self.data {
            Data::Atom(_) | Data::Function(_) => None,
            Data::Vector(vector) => Some(vector.len()),
            Data::List(items) => Some(items.len()),
            Data::Dict(dict) => dict.keys.len(),
            Data::Table(table) => table.row_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

impl Atom {
    pub fn base_type(&self) -> BaseType {
        match self {
            Atom::Boolean(_) => BaseType::Boolean,
            Atom::Guid(_) => BaseType::Guid,
            Atom::Byte(_) => BaseType::Byte,
            Atom::Short(_) => BaseType::Short,
            Atom::Int(_) => BaseType::Int,
            Atom::Long(_) => BaseType::Long,
            Atom::Real(_) => BaseType::Real,
            Atom::Float(_) => BaseType::Float,
            Atom::Char(_) => BaseType::Char,
            Atom::Symbol(_) => BaseType::Symbol,
            Atom::Timestamp(_) => BaseType::Timestamp,
            Atom::Month(_) => BaseType::Month,
            Atom::Date(_) => BaseType::Date,
            Atom::Datetime(_) => BaseType::Datetime,
            Atom::Timespan(_) => BaseType::Timespan,
            Atom::Minute(_) => BaseType::Minute,
            Atom::Second(_) => BaseType::Second,
            Atom::Time(_) => BaseType::Time,
        }
    }
}

impl Vector {
    pub fn base_type(&self) -> BaseType {
        match self {
            Vector::Boolean(_) => BaseType::Boolean,
            Vector::Guid(_) => BaseType::Guid,
            Vector::Byte(_) => BaseType::Byte,
            Vector::Short(_) => BaseType::Short,
            Vector::Int(_) => BaseType::Int,
            Vector::Long(_) => BaseType::Long,
            Vector::Real(_) => BaseType::Real,
            Vector::Float(_) => BaseType::Float,
            Vector::Char(_) => BaseType::Char,
            Vector::Symbol(_) => BaseType::Symbol,
            Vector::Timestamp(_) => BaseType::Timestamp,
            Vector::Month(_) => BaseType::Month,
            Vector::Date(_) => BaseType::Date,
            Vector::Datetime(_) => BaseType::Datetime,
            Vector::Timespan(_) => BaseType::Timespan,
            Vector::Minute(_) => BaseType::Minute,
            Vector::Second(_) => BaseType::Second,
            Vector::Time(_) => BaseType::Time,
        }
    }

    /// Element count, equal to the wire count.
    pub fn len(&self) -> usize {
        match self {
            Vector::Boolean(v) => v.len(),
            Vector::Guid(v) => v.len(),
            Vector::Byte(v) => v.len(),
            Vector::Short(v) => v.len(),
            Vector::Int(v) => v.len(),
            Vector::Long(v) => v.len(),
            Vector::Real(v) => v.len(),
            Vector::Float(v) => v.len(),
            Vector::Char(s) => s.chars().count(),
            Vector::Symbol(v) => v.len(),
            Vector::Timestamp(v) | Vector::Datetime(v) => v.len(),
            Vector::Month(v) => v.len(),
            Vector::Date(v) => v.len(),
            Vector::Timespan(v) | Vector::Minute(v) | Vector::Second(v) | Vector::Time(v) => {
                v.len()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dict {
    /// True unless both sides report an element count and the counts differ.
    pub fn is_consistent(&self) -> bool {
        match (self.keys.len(), self.values.len()) {
            (Some(keys), Some(values)) => keys == values,
            _ => true,
        }
    }

    pub fn as_keyed_table(&self) -> Option<KeyedTable<'_>> {
        Some(KeyedTable {
            keys: self.keys.as_table()?,
            values: self.values.as_table()?,
        })
    }
}

impl Table {
    /// Shared column length, or `None` if columns disagree or are not countable.
    pub fn row_count(&self) -> Option<usize> {
        let mut rows = None;
        for column in &self.data {
            let len = column.len()?;
            match rows {
                None => rows = Some(len),
                Some(expected) if expected != len => return None,
                Some(_) => {}
            }
        }
        Some(rows.unwrap_or(0))
    }

    /// Look up a column's values by name.
    pub fn column(&self, name: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|column| column == name)?;
        self.data.get(idx)
    }

    /// Iterate `(name, values)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.data.iter())
    }
}

impl KeyedTable<'_> {
    /// True when key and value tables agree on their row count.
    pub fn is_aligned(&self) -> bool {
        matches!(
            (self.keys.row_count(), self.values.row_count()),
            (Some(keys), Some(values)) if keys == values
        )
    }
}
