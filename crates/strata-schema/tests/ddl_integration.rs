//! End-to-end declaration and compilation tests.

use proptest::prelude::*;
use strata_schema::column::max_integer_digits;
use strata_schema::{
    Columns, DialectKind, LineEnding, SchemaError, SizeClass, Table, TableBuilder,
};

fn accounts() -> Table {
    Table::declare("accounts")
        .unwrap()
        .build(|cols, constraints| {
            cols.int("id")?.size(4, Some(10))?.unsigned()?.auto_increment();
            cols.string("username")?.length(40)?.unique();
            cols.string("country")?.fixed(2)?;
            cols.enumeration("status")?
                .options(&["active", "frozen"])?
                .default(Some("active"))?;
            cols.decimal("balance")?.precision(14, 4)?.default(Some("0.0000"))?;
            cols.binary("token")?.fixed(32)?.nullable();
            cols.blob("avatar")?.size(SizeClass::Medium).nullable();
            cols.int("referrer")?.unsigned()?.nullable().default(None)?;
            cols.primary_key("id")?;
            constraints
                .unique_key("uk_country_username")?
                .columns(&["country", "username"])?;
            constraints.foreign_key("referrer")?.table("accounts", "id")?;
            Ok(())
        })
        .unwrap()
}

#[test]
fn test_mysql_full_table() {
    let sql = TableBuilder::new(&accounts())
        .drop_existing()
        .compile()
        .unwrap();

    let expected = [
        "DROP TABLE IF EXISTS `accounts`;",
        "CREATE TABLE `accounts` (",
        "  `id` int(10) UNSIGNED PRIMARY KEY auto_increment NOT NULL,",
        "  `username` varchar(40) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL,",
        "  `country` char(2) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL,",
        "  `status` enum('active','frozen') NOT NULL DEFAULT 'active',",
        "  `balance` decimal(14,4) NOT NULL DEFAULT '0.0000',",
        "  `token` binary(32) DEFAULT NULL,",
        "  `avatar` MEDIUMBLOB DEFAULT NULL,",
        "  `referrer` int UNSIGNED DEFAULT NULL,",
        "  UNIQUE KEY (`username`),",
        "  UNIQUE KEY `uk_country_username` (`country`,`username`),",
        "  FOREIGN KEY (`referrer`) REFERENCES `accounts`(`id`)",
        ") ENGINE=InnoDB;",
    ]
    .join("\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_sqlite_full_table() {
    let sql = TableBuilder::new(&accounts())
        .dialect(DialectKind::Sqlite)
        .if_not_exists()
        .line_ending(LineEnding::CrLf)
        .compile()
        .unwrap();

    let expected = [
        "CREATE TABLE IF NOT EXISTS \"accounts\" (",
        "  \"id\" integer PRIMARY KEY AUTOINCREMENT NOT NULL,",
        "  \"username\" TEXT UNIQUE NOT NULL,",
        "  \"country\" TEXT NOT NULL,",
        "  \"status\" TEXT CHECK(\"status\" IN ('active','frozen')) NOT NULL DEFAULT 'active',",
        "  \"balance\" NUMERIC NOT NULL DEFAULT '0.0000',",
        "  \"token\" BLOB DEFAULT NULL,",
        "  \"avatar\" BLOB DEFAULT NULL,",
        "  \"referrer\" integer UNSIGNED DEFAULT NULL,",
        "  CONSTRAINT \"uk_country_username\" UNIQUE (\"country\",\"username\"),",
        "  CONSTRAINT \"cnstrnt_referrer_frgn\" FOREIGN KEY (\"referrer\") REFERENCES \"accounts\"(\"id\")",
        ");",
    ]
    .join("\r\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_unknown_dialect_name() {
    assert!(matches!(
        "postgres".parse::<DialectKind>(),
        Err(SchemaError::UnsupportedDialect(name)) if name == "postgres"
    ));
}

#[test]
fn test_failed_callback_aborts_declaration() {
    let result = Table::declare("broken").unwrap().build(|cols, _| {
        cols.int("id")?;
        cols.primary_key("uuid")?;
        Ok(())
    });
    assert_eq!(
        result.unwrap_err(),
        SchemaError::UndefinedColumn {
            table: "broken".to_string(),
            column: "uuid".to_string(),
        }
    );
}

proptest! {
    #[test]
    fn prop_integer_size_fails_iff_digits_exceed_width(
        bytes in prop::sample::select(vec![1u8, 2, 3, 4, 8]),
        unsigned in any::<bool>(),
        digits in 1u8..=24,
    ) {
        let mut cols = Columns::new("t");
        let mut column = cols.int("n").unwrap();
        if unsigned {
            column = column.unsigned().unwrap();
        }
        let max = max_integer_digits(bytes, unsigned).unwrap();
        let result = column.size(bytes, Some(digits));
        prop_assert_eq!(result.is_err(), digits > max);
    }

    #[test]
    fn prop_null_default_requires_nullable(nullable in any::<bool>()) {
        let mut cols = Columns::new("t");
        let mut column = cols.string("s").unwrap();
        if nullable {
            column = column.nullable();
        }
        prop_assert_eq!(column.default(None).is_ok(), nullable);
    }
}
