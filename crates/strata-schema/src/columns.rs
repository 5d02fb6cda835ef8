//! Ordered column container.

use crate::column::{
    BinaryColumn, BlobColumn, Column, ColumnKind, DecimalColumn, EnumColumn, FloatColumn,
    IntegerColumn, Precision, SizeClass, StringColumn, TextColumn,
};
use crate::error::{Result, SchemaError};
use crate::ident::{check_identifier, is_identifier};

/// Charset applied to string and text columns unless overridden.
pub const DEFAULT_CHARSET: &str = "utf8mb4";
/// Collation applied to string and text columns unless overridden.
pub const DEFAULT_COLLATION: &str = "utf8mb4_unicode_ci";

/// The columns of one table, in declaration order.
///
/// Declaration order is DDL order. At most one column is the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    table: String,
    columns: Vec<Column>,
    primary_key: Option<String>,
    charset: String,
    collation: String,
}

impl Columns {
    /// Creates an empty container for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            primary_key: None,
            charset: DEFAULT_CHARSET.to_string(),
            collation: DEFAULT_COLLATION.to_string(),
        }
    }

    /// Changes the charset and collation given to string and text columns
    /// declared after this call.
    pub fn defaults(&mut self, charset: &str, collation: &str) -> Result<&mut Self> {
        for (what, value) in [("charset", charset), ("collation", collation)] {
            if !is_identifier(value) {
                return Err(SchemaError::InvalidIdentifier {
                    kind: what,
                    name: value.to_string(),
                });
            }
        }
        self.charset = charset.to_string();
        self.collation = collation.to_string();
        Ok(self)
    }

    fn declare(&mut self, column: Column) -> Result<&mut Column> {
        check_identifier("column", column.name())?;
        if self.contains(column.name()) {
            return Err(SchemaError::DuplicateColumn(column.name().to_string()));
        }
        let index = self.columns.len();
        self.columns.push(column);
        Ok(&mut self.columns[index])
    }

    /// Declares a 4-byte signed integer column.
    pub fn int(&mut self, name: &str) -> Result<IntegerColumn<'_>> {
        let kind = ColumnKind::Integer {
            bytes: 4,
            digits: None,
            auto_increment: false,
        };
        self.declare(Column::new(name, kind)).map(IntegerColumn)
    }

    /// Declares a `varchar(255)` column.
    pub fn string(&mut self, name: &str) -> Result<StringColumn<'_>> {
        let kind = ColumnKind::String {
            length: 255,
            fixed: false,
        };
        let column = Column::new(name, kind).with_charset(&self.charset, &self.collation);
        self.declare(column).map(StringColumn)
    }

    /// Declares a `varbinary(255)` column.
    pub fn binary(&mut self, name: &str) -> Result<BinaryColumn<'_>> {
        let kind = ColumnKind::Binary {
            length: 255,
            fixed: false,
        };
        self.declare(Column::new(name, kind)).map(BinaryColumn)
    }

    pub fn text(&mut self, name: &str) -> Result<TextColumn<'_>> {
        let column = Column::new(name, ColumnKind::Text(SizeClass::Default))
            .with_charset(&self.charset, &self.collation);
        self.declare(column).map(TextColumn)
    }

    pub fn blob(&mut self, name: &str) -> Result<BlobColumn<'_>> {
        self.declare(Column::new(name, ColumnKind::Blob(SizeClass::Default)))
            .map(BlobColumn)
    }

    /// Declares a `decimal(10,0)` column defaulting to `"0"`.
    pub fn decimal(&mut self, name: &str) -> Result<DecimalColumn<'_>> {
        self.declare(Column::new(name, ColumnKind::Decimal(Precision::default())))
            .map(DecimalColumn)
    }

    pub fn float(&mut self, name: &str) -> Result<FloatColumn<'_>> {
        self.declare(Column::new(name, ColumnKind::Float(Precision::default())))
            .map(FloatColumn)
    }

    pub fn double(&mut self, name: &str) -> Result<FloatColumn<'_>> {
        self.declare(Column::new(name, ColumnKind::Double(Precision::default())))
            .map(FloatColumn)
    }

    /// Declares an enum column; set its values with [`EnumColumn::options`].
    pub fn enumeration(&mut self, name: &str) -> Result<EnumColumn<'_>> {
        self.declare(Column::new(name, ColumnKind::Enum(Vec::new())))
            .map(EnumColumn)
    }

    /// Designates an already declared column as the primary key.
    pub fn primary_key(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(SchemaError::UndefinedColumn {
                table: self.table.clone(),
                column: name.to_string(),
            });
        }
        self.primary_key = Some(name.to_string());
        Ok(())
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The primary key column, if one was designated.
    #[must_use]
    pub fn primary_key_column(&self) -> Option<&Column> {
        self.primary_key.as_deref().and_then(|name| self.get(name))
    }

    /// Whether `name` is the primary key.
    #[must_use]
    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_key.as_deref() == Some(name)
    }

    /// Columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Column names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
