//! MySQL / MariaDB dialect.

use super::{referenced_table, Dialect, DialectKind};
use crate::column::{Column, ColumnKind};
use crate::constraint::{ForeignKey, UniqueKey};
use crate::error::Result;
use crate::table::Table;
use crate::value::quote_literal;

/// MySQL dialect for SQL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn column_type(&self, column: &Column) -> String {
        match column.kind() {
            ColumnKind::Integer { bytes, digits, .. } => {
                let name = match bytes {
                    1 => "tinyint",
                    2 => "smallint",
                    3 => "mediumint",
                    8 => "bigint",
                    _ => "int",
                };
                match digits {
                    Some(d) => format!("{name}({d})"),
                    None => name.to_string(),
                }
            }
            ColumnKind::String { length, fixed } => {
                format!("{}({length})", if *fixed { "char" } else { "varchar" })
            }
            ColumnKind::Binary { length, fixed } => {
                format!("{}({length})", if *fixed { "binary" } else { "varbinary" })
            }
            ColumnKind::Text(size) => format!("{}TEXT", size.prefix()),
            ColumnKind::Blob(size) => format!("{}BLOB", size.prefix()),
            ColumnKind::Decimal(p) => format!("decimal({},{})", p.digits, p.scale),
            ColumnKind::Float(p) => format!("float({},{})", p.digits, p.scale),
            ColumnKind::Double(p) => format!("double({},{})", p.digits, p.scale),
            ColumnKind::Enum(options) => {
                let list: Vec<String> = options.iter().map(|o| quote_literal(o)).collect();
                format!("enum({})", list.join(","))
            }
        }
    }

    fn autoincrement_keyword(&self) -> &'static str {
        " auto_increment"
    }

    fn inline_unique(&self) -> bool {
        false
    }

    fn charset_clause(&self, column: &Column) -> String {
        let mut clause = String::new();
        if let Some(charset) = column.charset() {
            clause.push_str(" CHARACTER SET ");
            clause.push_str(charset);
        }
        if let Some(collation) = column.collation() {
            clause.push_str(" COLLATE ");
            clause.push_str(collation);
        }
        clause
    }

    fn unique_key(&self, key: &UniqueKey) -> String {
        format!(
            "UNIQUE KEY {} ({})",
            self.quote_identifier(key.name()),
            self.column_list(key.columns())
        )
    }

    fn foreign_key(&self, fk: &ForeignKey) -> Result<String> {
        Ok(format!(
            "FOREIGN KEY ({}) REFERENCES {}",
            self.quote_identifier(fk.column()),
            referenced_table(self, fk)?
        ))
    }

    fn table_suffix(&self, table: &Table) -> String {
        format!(") ENGINE={};", table.engine())
    }

    fn upsert_clause(&self, conflict_column: &str, columns: &[&str]) -> String {
        if columns.is_empty() {
            let key = self.quote_identifier(conflict_column);
            return format!(" ON DUPLICATE KEY UPDATE {key}={key}");
        }
        let sets: Vec<String> = columns
            .iter()
            .map(|c| format!("{}=?", self.quote_identifier(c)))
            .collect();
        format!(" ON DUPLICATE KEY UPDATE {}", sets.join(", "))
    }

    fn upsert_rebinds_values(&self) -> bool {
        true
    }

    fn row_lock_suffix(&self) -> &'static str {
        " FOR UPDATE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::SizeClass;
    use crate::Columns;

    fn type_of(build: impl FnOnce(&mut Columns)) -> String {
        let mut cols = Columns::new("t");
        build(&mut cols);
        let column = cols.iter().next().unwrap();
        MySqlDialect::new().column_type(column)
    }

    #[test]
    fn test_integer_types() {
        assert_eq!(type_of(|c| { c.int("a").unwrap(); }), "int");
        assert_eq!(
            type_of(|c| { c.int("a").unwrap().size(1, Some(3)).unwrap(); }),
            "tinyint(3)"
        );
        assert_eq!(
            type_of(|c| { c.int("a").unwrap().size(8, None).unwrap(); }),
            "bigint"
        );
    }

    #[test]
    fn test_string_and_binary_types() {
        assert_eq!(type_of(|c| { c.string("a").unwrap(); }), "varchar(255)");
        assert_eq!(
            type_of(|c| { c.string("a").unwrap().fixed(2).unwrap(); }),
            "char(2)"
        );
        assert_eq!(
            type_of(|c| { c.binary("a").unwrap().fixed(16).unwrap(); }),
            "binary(16)"
        );
    }

    #[test]
    fn test_size_classes() {
        assert_eq!(
            type_of(|c| { c.text("a").unwrap().size(SizeClass::Medium); }),
            "MEDIUMTEXT"
        );
        assert_eq!(type_of(|c| { c.blob("a").unwrap(); }), "BLOB");
    }

    #[test]
    fn test_numeric_types() {
        assert_eq!(type_of(|c| { c.decimal("a").unwrap(); }), "decimal(10,0)");
        assert_eq!(
            type_of(|c| { c.double("a").unwrap().precision(12, 4).unwrap(); }),
            "double(12,4)"
        );
    }

    #[test]
    fn test_enum_type_escapes_options() {
        assert_eq!(
            type_of(|c| { c.enumeration("a").unwrap().options(&["it's", "b"]).unwrap(); }),
            "enum('it''s','b')"
        );
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(MySqlDialect::new().quote_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn test_upsert_clause() {
        let dialect = MySqlDialect::new();
        assert_eq!(
            dialect.upsert_clause("id", &["name", "email"]),
            " ON DUPLICATE KEY UPDATE `name`=?, `email`=?"
        );
        assert_eq!(
            dialect.upsert_clause("id", &[]),
            " ON DUPLICATE KEY UPDATE `id`=`id`"
        );
    }
}
