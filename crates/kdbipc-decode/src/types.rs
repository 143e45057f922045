//! Wire type codes.
//!
//! Negative codes are atoms of base type `-code`, codes 1-19 are vectors of
//! that base type, and the remaining codes name composite shapes.

/// Remote error signal.
pub const ERROR: i8 = -128;

/// General (heterogeneous) list.
pub const LIST: i8 = 0;

/// Table: attribute byte plus a dict of column names to column values.
pub const TABLE: i8 = 98;

/// Dictionary.
pub const DICT: i8 = 99;

/// Lambda: namespace plus source text.
pub const FUNCTION: i8 = 100;

/// Dictionary flagged as sorted; decoded exactly like [`DICT`].
pub const SORTED_DICT: i8 = 127;

/// Scalar base types shared by atoms (negative codes) and vectors (positive codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Boolean,
    Guid,
    Byte,
    Short,
    Int,
    Long,
    Real,
    Float,
    Char,
    Symbol,
    Timestamp,
    Month,
    Date,
    Datetime,
    Timespan,
    Minute,
    Second,
    Time,
}

impl BaseType {
    /// Map an absolute type code to its base type. Code 3 is unassigned.
    pub fn from_code(code: u8) -> Option<Self> {
        let base = match code {
            1 => Self::Boolean,
            2 => Self::Guid,
            4 => Self::Byte,
            5 => Self::Short,
            6 => Self::Int,
            7 => Self::Long,
            8 => Self::Real,
            9 => Self::Float,
            10 => Self::Char,
            11 => Self::Symbol,
            12 => Self::Timestamp,
            13 => Self::Month,
            14 => Self::Date,
            15 => Self::Datetime,
            16 => Self::Timespan,
            17 => Self::Minute,
            18 => Self::Second,
            19 => Self::Time,
            _ => return None,
        };
        Some(base)
    }

    /// Positive (vector) type code.
    pub fn code(self) -> i8 {
        match self {
            Self::Boolean => 1,
            Self::Guid => 2,
            Self::Byte => 4,
            Self::Short => 5,
            Self::Int => 6,
            Self::Long => 7,
            Self::Real => 8,
            Self::Float => 9,
            Self::Char => 10,
            Self::Symbol => 11,
            Self::Timestamp => 12,
            Self::Month => 13,
            Self::Date => 14,
            Self::Datetime => 15,
            Self::Timespan => 16,
            Self::Minute => 17,
            Self::Second => 18,
            Self::Time => 19,
        }
    }

    /// Negative (atom) type code.
    pub fn atom_code(self) -> i8 {
        -self.code()
    }

    /// q type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Guid => "guid",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Real => "real",
            Self::Float => "float",
            Self::Char => "char",
            Self::Symbol => "symbol",
            Self::Timestamp => "timestamp",
            Self::Month => "month",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Timespan => "timespan",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Time => "time",
        }
    }

    /// Fixed element width in bytes; `None` for null-terminated symbols.
    pub fn width(self) -> Option<usize> {
        match self {
            Self::Boolean | Self::Byte | Self::Char => Some(1),
            Self::Short => Some(2),
            Self::Int | Self::Real | Self::Month | Self::Date => Some(4),
            Self::Minute | Self::Second | Self::Time => Some(4),
            Self::Long | Self::Float | Self::Timestamp | Self::Datetime | Self::Timespan => Some(8),
            Self::Guid => Some(16),
            Self::Symbol => None,
        }
    }
}

/// Vector/table attribute. Recorded as sent, never verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attribute {
    #[default]
    None,
    Sorted,
    Unique,
    Parted,
    Grouped,
}

impl Attribute {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::None),
            1 => Some(Self::Sorted),
            2 => Some(Self::Unique),
            3 => Some(Self::Parted),
            4 => Some(Self::Grouped),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Sorted => 1,
            Self::Unique => 2,
            Self::Parted => 3,
            Self::Grouped => 4,
        }
    }
}
