//! Column type system.
//!
//! A [`Column`] is declared through [`crate::Columns`], which hands back a
//! typed handle (`IntegerColumn`, `StringColumn`, ...) exposing only the
//! settings that make sense for that type. Fallible setters return
//! `Result<Self>` and fail as soon as a value is rejected.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SchemaError};
use crate::ident::is_identifier;
use crate::value::SqlValue;

/// Largest length accepted by string and binary columns.
pub const MAX_LENGTH: u32 = 65_535;

static DECIMAL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("decimal literal pattern"));

/// The runtime type a column's values are held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Whole numbers.
    Integer,
    /// Text and raw bytes.
    String,
    /// Floating point numbers.
    Double,
}

impl ScalarKind {
    /// Returns true when `value` is held in this kind. NULL is never accepted
    /// here; nullability is checked separately.
    #[must_use]
    pub const fn accepts(self, value: &SqlValue) -> bool {
        matches!(
            (self, value),
            (Self::Integer, SqlValue::Int(_))
                | (Self::Double, SqlValue::Float(_))
                | (Self::String, SqlValue::Text(_) | SqlValue::Blob(_))
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Double => "double",
        })
    }
}

/// Storage size class of TEXT and BLOB columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeClass {
    /// Plain `TEXT` / `BLOB`.
    #[default]
    Default,
    /// `TINYTEXT` / `TINYBLOB`.
    Tiny,
    /// `MEDIUMTEXT` / `MEDIUMBLOB`.
    Medium,
    /// `LONGTEXT` / `LONGBLOB`.
    Long,
}

impl SizeClass {
    /// Type-name prefix used by MySQL.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Tiny => "TINY",
            Self::Medium => "MEDIUM",
            Self::Long => "LONG",
        }
    }
}

impl FromStr for SizeClass {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "" => Ok(Self::Default),
            "TINY" => Ok(Self::Tiny),
            "MEDIUM" => Ok(Self::Medium),
            "LONG" => Ok(Self::Long),
            _ => Err(SchemaError::InvalidSizeClass(s.to_string())),
        }
    }
}

/// Total digits and digits after the decimal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    /// Total number of digits.
    pub digits: u8,
    /// Digits after the decimal point.
    pub scale: u8,
}

impl Precision {
    /// Validates digits in `1..=65` and scale in `0..=min(digits, 30)`.
    pub fn new(digits: u8, scale: u8) -> std::result::Result<Self, String> {
        if !(1..=65).contains(&digits) {
            return Err(String::from("Digits must be between 1 and 65"));
        }
        let max_scale = digits.min(30);
        if scale > max_scale {
            return Err(format!("Scale must be between 0 and {max_scale}"));
        }
        Ok(Self { digits, scale })
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            digits: 10,
            scale: 0,
        }
    }
}

/// Logical type of a column and its type-specific settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// `tinyint` to `bigint`.
    Integer {
        /// Storage width: 1, 2, 3, 4 or 8.
        bytes: u8,
        /// Display width.
        digits: Option<u8>,
        /// Whether the database assigns values.
        auto_increment: bool,
    },
    /// `varchar` / `char`.
    String {
        /// Maximum (or fixed) length.
        length: u32,
        /// `char(n)` instead of `varchar(n)`.
        fixed: bool,
    },
    /// `varbinary` / `binary`.
    Binary {
        /// Maximum (or fixed) length.
        length: u32,
        /// `binary(n)` instead of `varbinary(n)`.
        fixed: bool,
    },
    /// `TEXT` family.
    Text(SizeClass),
    /// `BLOB` family.
    Blob(SizeClass),
    /// Exact numeric.
    Decimal(Precision),
    /// Single precision float.
    Float(Precision),
    /// Double precision float.
    Double(Precision),
    /// One of a fixed list of strings.
    Enum(Vec<String>),
}

impl ColumnKind {
    /// Runtime scalar kind for values of this type.
    #[must_use]
    pub const fn scalar(&self) -> ScalarKind {
        match self {
            Self::Integer { .. } => ScalarKind::Integer,
            Self::Float(_) | Self::Double(_) => ScalarKind::Double,
            Self::String { .. }
            | Self::Binary { .. }
            | Self::Text(_)
            | Self::Blob(_)
            | Self::Decimal(_)
            | Self::Enum(_) => ScalarKind::String,
        }
    }

    /// Whether a non-null default is written as a quoted literal.
    #[must_use]
    pub const fn quotes_default(&self) -> bool {
        matches!(
            self,
            Self::String { .. } | Self::Binary { .. } | Self::Decimal(_) | Self::Enum(_)
        )
    }

    /// Numeric precision, for decimal and floating point columns.
    #[must_use]
    pub const fn precision(&self) -> Option<Precision> {
        match self {
            Self::Decimal(p) | Self::Float(p) | Self::Double(p) => Some(*p),
            _ => None,
        }
    }
}

/// Largest display width for an integer of `bytes` bytes.
#[must_use]
pub const fn max_integer_digits(bytes: u8, unsigned: bool) -> Option<u8> {
    match (bytes, unsigned) {
        (1, _) => Some(3),
        (2, _) => Some(5),
        (3, false) => Some(7),
        (3, true) => Some(8),
        (4, _) => Some(10),
        (8, false) => Some(19),
        (8, true) => Some(20),
        _ => None,
    }
}

/// A declared column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    nullable: bool,
    unsigned: bool,
    unique: bool,
    charset: Option<String>,
    collation: Option<String>,
    default: Option<SqlValue>,
}

impl Column {
    pub(crate) fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        let default = match &kind {
            ColumnKind::Decimal(_) => Some(SqlValue::Text(String::from("0"))),
            ColumnKind::Float(_) | ColumnKind::Double(_) => Some(SqlValue::Float(0.0)),
            _ => None,
        };
        Self {
            name: name.into(),
            kind,
            nullable: false,
            unsigned: false,
            unique: false,
            charset: None,
            collation: None,
            default,
        }
    }

    pub(crate) fn with_charset(mut self, charset: &str, collation: &str) -> Self {
        self.charset = Some(charset.to_string());
        self.collation = Some(collation.to_string());
        self
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical type.
    #[must_use]
    pub const fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    /// Runtime scalar kind.
    #[must_use]
    pub const fn scalar_kind(&self) -> ScalarKind {
        self.kind.scalar()
    }

    /// Whether NULL is allowed.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether `UNSIGNED` was requested (numeric columns only).
    #[must_use]
    pub const fn is_unsigned(&self) -> bool {
        self.unsigned
    }

    /// Single-column uniqueness (integer and string columns only).
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether the database assigns increasing values.
    #[must_use]
    pub const fn is_auto_increment(&self) -> bool {
        matches!(
            self.kind,
            ColumnKind::Integer {
                auto_increment: true,
                ..
            }
        )
    }

    /// Character set of string and text columns.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Collation of string and text columns.
    #[must_use]
    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }

    /// Declared default. `Some(SqlValue::Null)` is an explicit NULL default.
    #[must_use]
    pub const fn default_value(&self) -> Option<&SqlValue> {
        self.default.as_ref()
    }

    /// Whether inserts may omit this column.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.as_ref().is_some_and(|v| !v.is_null())
    }

    /// Checks that `value` can be stored in this column.
    pub fn check_value(&self, value: &SqlValue) -> std::result::Result<(), String> {
        if value.is_null() {
            return if self.nullable {
                Ok(())
            } else {
                Err(String::from("cannot be NULL"))
            };
        }
        let scalar = self.scalar_kind();
        if !scalar.accepts(value) {
            return Err(format!(
                "must be of type {scalar}, got {}",
                value.type_name()
            ));
        }
        if let ColumnKind::Enum(options) = &self.kind {
            if let SqlValue::Text(text) = value {
                if !options.iter().any(|o| o == text) {
                    return Err(format!("\"{text}\" is not an enum option"));
                }
            }
        }
        Ok(())
    }

    /// Converts a raw value read from a driver into this column's scalar kind.
    ///
    /// Doubles are rounded to one digit beyond the declared scale.
    pub fn coerce(&self, value: SqlValue) -> std::result::Result<SqlValue, String> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }
        match self.scalar_kind() {
            ScalarKind::Integer => coerce_integer(value),
            ScalarKind::Double => {
                let places = self.kind.precision().map_or(0, |p| p.scale) + 1;
                coerce_double(value).map(|x| SqlValue::Float(round_to(x, places)))
            }
            ScalarKind::String => coerce_string(value),
        }
    }

    fn null_default(&mut self) -> Result<()> {
        if !self.nullable {
            return Err(SchemaError::column(
                &self.name,
                "Default value cannot be NULL unless column is nullable",
            ));
        }
        self.default = Some(SqlValue::Null);
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::column(&self.name, message)
    }

    fn check_charset_name(&self, what: &str, value: &str) -> Result<()> {
        if is_identifier(value) {
            Ok(())
        } else {
            Err(self.error(format!("Invalid {what} \"{value}\"")))
        }
    }
}

fn coerce_integer(value: SqlValue) -> std::result::Result<SqlValue, String> {
    match value {
        SqlValue::Int(n) => Ok(SqlValue::Int(n)),
        SqlValue::Bool(b) => Ok(SqlValue::Int(i64::from(b))),
        #[allow(clippy::cast_possible_truncation)]
        SqlValue::Float(x) if x.is_finite() => Ok(SqlValue::Int(x.trunc() as i64)),
        SqlValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(SqlValue::Int)
            .map_err(|_| format!("\"{s}\" is not an integer")),
        other => Err(format!("cannot hold {} as integer", other.type_name())),
    }
}

fn coerce_double(value: SqlValue) -> std::result::Result<f64, String> {
    match value {
        SqlValue::Float(x) => Ok(x),
        #[allow(clippy::cast_precision_loss)]
        SqlValue::Int(n) => Ok(n as f64),
        SqlValue::Bool(b) => Ok(f64::from(u8::from(b))),
        SqlValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("\"{s}\" is not a number")),
        other => Err(format!("cannot hold {} as double", other.type_name())),
    }
}

fn coerce_string(value: SqlValue) -> std::result::Result<SqlValue, String> {
    Ok(match value {
        SqlValue::Int(n) => SqlValue::Text(n.to_string()),
        SqlValue::Float(x) => SqlValue::Text(x.to_string()),
        SqlValue::Bool(b) => SqlValue::Text(String::from(if b { "1" } else { "0" })),
        other => other,
    })
}

fn round_to(x: f64, places: u8) -> f64 {
    let factor = 10_f64.powi(i32::from(places));
    (x * factor).round() / factor
}

// Handles write through to the borrowed column; dropping one keeps its changes.
macro_rules! nullable_handle {
    ($handle:ident) => {
        impl $handle<'_> {
            /// Allows NULL values in this column.
            #[allow(clippy::return_self_not_must_use)]
            pub fn nullable(self) -> Self {
                self.0.nullable = true;
                self
            }

            /// The column as declared so far.
            #[must_use]
            pub fn column(&self) -> &Column {
                &*self.0
            }
        }
    };
}

/// Handle for declaring an integer column.
#[derive(Debug)]
pub struct IntegerColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(IntegerColumn);

impl IntegerColumn<'_> {
    /// Sets the storage width in bytes and an optional display width.
    pub fn size(self, bytes: u8, digits: Option<u8>) -> Result<Self> {
        let Some(max) = max_integer_digits(bytes, self.0.unsigned) else {
            return Err(self.0.error(format!(
                "Invalid integer size {bytes}, expected 1, 2, 3, 4 or 8 bytes"
            )));
        };
        // Zero digits means no display width.
        let digits = digits.filter(|&d| d != 0);
        if digits.is_some_and(|d| d > max) {
            return Err(self.0.error(format!(
                "Integer of {bytes} bytes takes at most {max} digits"
            )));
        }
        if let ColumnKind::Integer {
            bytes: b,
            digits: ds,
            ..
        } = &mut self.0.kind
        {
            *b = bytes;
            *ds = digits;
        }
        Ok(self)
    }

    /// Lets the database assign increasing values.
    #[allow(clippy::return_self_not_must_use)]
    pub fn auto_increment(self) -> Self {
        if let ColumnKind::Integer { auto_increment, .. } = &mut self.0.kind {
            *auto_increment = true;
        }
        self
    }

    /// Adds a single-column unique key.
    #[allow(clippy::return_self_not_must_use)]
    pub fn unique(self) -> Self {
        self.0.unique = true;
        self
    }

    /// Allows negative values (the initial state).
    pub fn signed(self) -> Result<Self> {
        self.set_unsigned(false)
    }

    /// Restricts to non-negative values; the display width is re-checked.
    pub fn unsigned(self) -> Result<Self> {
        self.set_unsigned(true)
    }

    fn set_unsigned(self, unsigned: bool) -> Result<Self> {
        if unsigned {
            if let Some(SqlValue::Int(n)) = self.0.default {
                if n < 0 {
                    return Err(self.0.error("Unsigned column cannot default to a negative value"));
                }
            }
        }
        if let ColumnKind::Integer { bytes, digits, .. } = self.0.kind {
            // Width limits differ between signed and unsigned for 3 and 8 bytes.
            let max = max_integer_digits(bytes, unsigned).unwrap_or(0);
            if digits.is_some_and(|d| d > max) {
                let sign = if unsigned { "unsigned" } else { "signed" };
                return Err(self.0.error(format!(
                    "Integer of {bytes} bytes takes at most {max} digits when {sign}"
                )));
            }
        }
        self.0.unsigned = unsigned;
        Ok(self)
    }

    /// Sets the default; `None` needs a nullable column.
    pub fn default(self, value: Option<i64>) -> Result<Self> {
        match value {
            None => self.0.null_default()?,
            Some(n) if n < 0 && self.0.unsigned => {
                return Err(self.0.error("Unsigned column cannot default to a negative value"));
            }
            Some(n) => self.0.default = Some(SqlValue::Int(n)),
        }
        Ok(self)
    }
}

fn check_length(column: &Column, length: u32) -> Result<()> {
    if (1..=MAX_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(column.error(format!("Length must be between 1 and {MAX_LENGTH}")))
    }
}

fn set_length(column: &mut Column, length: u32, fixed: bool) -> Result<()> {
    check_length(column, length)?;
    match &mut column.kind {
        ColumnKind::String { length: l, fixed: f } | ColumnKind::Binary { length: l, fixed: f } => {
            *l = length;
            *f = fixed;
        }
        _ => {}
    }
    Ok(())
}

fn set_text_default(column: &mut Column, value: Option<&str>) -> Result<()> {
    let Some(text) = value else {
        return column.null_default();
    };
    if let ColumnKind::String { length, .. } | ColumnKind::Binary { length, .. } = column.kind {
        if text.chars().count() > length as usize {
            return Err(column.error(format!("Default value exceeds length of {length}")));
        }
    }
    column.default = Some(SqlValue::Text(text.to_string()));
    Ok(())
}

/// Handle for declaring a `varchar`/`char` column.
#[derive(Debug)]
pub struct StringColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(StringColumn);

impl StringColumn<'_> {
    /// Variable length up to `length` characters.
    pub fn length(self, length: u32) -> Result<Self> {
        set_length(self.0, length, false)?;
        Ok(self)
    }

    /// Fixed length of exactly `length` characters.
    pub fn fixed(self, length: u32) -> Result<Self> {
        set_length(self.0, length, true)?;
        Ok(self)
    }

    /// Sets the default; `None` needs a nullable column.
    pub fn default(self, value: Option<&str>) -> Result<Self> {
        set_text_default(self.0, value)?;
        Ok(self)
    }

    /// Adds a single-column unique key.
    #[allow(clippy::return_self_not_must_use)]
    pub fn unique(self) -> Self {
        self.0.unique = true;
        self
    }

    /// Overrides the table's character set.
    pub fn charset(self, charset: &str) -> Result<Self> {
        self.0.check_charset_name("charset", charset)?;
        self.0.charset = Some(charset.to_string());
        Ok(self)
    }

    /// Overrides the table's collation.
    pub fn collation(self, collation: &str) -> Result<Self> {
        self.0.check_charset_name("collation", collation)?;
        self.0.collation = Some(collation.to_string());
        Ok(self)
    }
}

/// Handle for declaring a `varbinary`/`binary` column.
#[derive(Debug)]
pub struct BinaryColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(BinaryColumn);

impl BinaryColumn<'_> {
    /// Variable length up to `length` bytes.
    pub fn length(self, length: u32) -> Result<Self> {
        set_length(self.0, length, false)?;
        Ok(self)
    }

    /// Fixed length of exactly `length` bytes.
    pub fn fixed(self, length: u32) -> Result<Self> {
        set_length(self.0, length, true)?;
        Ok(self)
    }

    pub fn default(self, value: Option<&str>) -> Result<Self> {
        set_text_default(self.0, value)?;
        Ok(self)
    }
}

/// Handle for declaring a `TEXT` column.
#[derive(Debug)]
pub struct TextColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(TextColumn);

impl TextColumn<'_> {
    /// Picks the storage size class.
    #[allow(clippy::return_self_not_must_use)]
    pub fn size(self, size: SizeClass) -> Self {
        self.0.kind = ColumnKind::Text(size);
        self
    }

    /// Overrides the table's character set.
    pub fn charset(self, charset: &str) -> Result<Self> {
        self.0.check_charset_name("charset", charset)?;
        self.0.charset = Some(charset.to_string());
        Ok(self)
    }

    pub fn collation(self, collation: &str) -> Result<Self> {
        self.0.check_charset_name("collation", collation)?;
        self.0.collation = Some(collation.to_string());
        Ok(self)
    }
}

/// Handle for declaring a `BLOB` column.
#[derive(Debug)]
pub struct BlobColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(BlobColumn);

impl BlobColumn<'_> {
    /// Picks the storage size class.
    #[allow(clippy::return_self_not_must_use)]
    pub fn size(self, size: SizeClass) -> Self {
        self.0.kind = ColumnKind::Blob(size);
        self
    }
}

fn set_precision(column: &mut Column, digits: u8, scale: u8) -> Result<()> {
    let precision = Precision::new(digits, scale).map_err(|m| column.error(m))?;
    match &mut column.kind {
        ColumnKind::Decimal(p) | ColumnKind::Float(p) | ColumnKind::Double(p) => *p = precision,
        _ => {}
    }
    Ok(())
}

/// Handle for declaring a `decimal` column.
#[derive(Debug)]
pub struct DecimalColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(DecimalColumn);

impl DecimalColumn<'_> {
    /// Sets total digits and digits after the point.
    pub fn precision(self, digits: u8, scale: u8) -> Result<Self> {
        set_precision(self.0, digits, scale)?;
        Ok(self)
    }

    #[allow(clippy::return_self_not_must_use)]
    pub fn signed(self) -> Self {
        self.0.unsigned = false;
        self
    }

    /// Writes `UNSIGNED` on MySQL.
    #[allow(clippy::return_self_not_must_use)]
    pub fn unsigned(self) -> Self {
        self.0.unsigned = true;
        self
    }

    /// Sets the default from a numeric literal such as `"-12.50"`.
    pub fn default(self, value: Option<&str>) -> Result<Self> {
        match value {
            None => self.0.null_default()?,
            Some(v) if DECIMAL_LITERAL.is_match(v) => {
                self.0.default = Some(SqlValue::Text(v.to_string()));
            }
            Some(v) => return Err(self.0.error(format!("Invalid decimal default \"{v}\""))),
        }
        Ok(self)
    }
}

/// Handle for declaring a `float` or `double` column.
#[derive(Debug)]
pub struct FloatColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(FloatColumn);

impl FloatColumn<'_> {
    /// Sets total digits and digits after the point.
    pub fn precision(self, digits: u8, scale: u8) -> Result<Self> {
        set_precision(self.0, digits, scale)?;
        Ok(self)
    }

    #[allow(clippy::return_self_not_must_use)]
    pub fn signed(self) -> Self {
        self.0.unsigned = false;
        self
    }

    /// Writes `UNSIGNED` on MySQL.
    #[allow(clippy::return_self_not_must_use)]
    pub fn unsigned(self) -> Self {
        self.0.unsigned = true;
        self
    }

    /// Sets the default; it must be finite.
    pub fn default(self, value: Option<f64>) -> Result<Self> {
        match value {
            None => self.0.null_default()?,
            Some(x) if x.is_finite() => self.0.default = Some(SqlValue::Float(x)),
            Some(x) => return Err(self.0.error(format!("Invalid default {x}"))),
        }
        Ok(self)
    }
}

/// Handle for declaring an `enum` column.
#[derive(Debug)]
pub struct EnumColumn<'a>(pub(crate) &'a mut Column);

nullable_handle!(EnumColumn);

impl EnumColumn<'_> {
    /// Sets the allowed values, in declaration order.
    pub fn options<S: AsRef<str>>(self, options: &[S]) -> Result<Self> {
        if options.is_empty() {
            return Err(self.0.error("Enum requires at least one option"));
        }
        let mut list = Vec::with_capacity(options.len());
        for option in options {
            let option = option.as_ref();
            if option.is_empty() {
                return Err(self.0.error("Enum options cannot be empty strings"));
            }
            if list.iter().any(|o| o == option) {
                return Err(self.0.error(format!("Duplicate enum option \"{option}\"")));
            }
            list.push(option.to_string());
        }
        self.0.kind = ColumnKind::Enum(list);
        Ok(self)
    }

    /// Sets the default; it must be one of the options.
    pub fn default(self, value: Option<&str>) -> Result<Self> {
        let Some(v) = value else {
            self.0.null_default()?;
            return Ok(self);
        };
        let known = matches!(&self.0.kind, ColumnKind::Enum(opts) if opts.iter().any(|o| o == v));
        if !known {
            return Err(self.0.error(format!("Default value \"{v}\" is not an enum option")));
        }
        self.0.default = Some(SqlValue::Text(v.to_string()));
        Ok(self)
    }
}
