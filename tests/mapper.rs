#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use tenon::{
        FieldConfig, IdKey, IdentityCache, ParentRef, QueryBuilder, Result, ResultCursor,
        SqlType, StandardDialect, TableConfig, Value,
        persister::{self, DateTextPersister, Persister},
    };
    use tenon_testkit::{
        ACCOUNT_TIER_BY_NAME, ACCOUNT_TIER_BY_ORDINAL, AccountTier, StubConnection, StubCursor,
        StubRows, account_table, init_logs, order_table,
    };
    use time::macros::{date, datetime};

    const DIALECT: StandardDialect = StandardDialect::new();
    static US_DATE: DateTextPersister = DateTextPersister::new("[month]/[day]/[year]");

    /// A single-column cursor already positioned on its only row.
    fn cursor_over(value: Value) -> Result<StubCursor> {
        let mut cursor = StubCursor::new(StubRows::new(["value"]).row([value]));
        cursor.next()?;
        Ok(cursor)
    }

    fn account_rows() -> StubRows {
        StubRows::new(["id", "name", "password", "tier"])
    }

    #[test]
    fn identity_cache_returns_the_instance_already_built_for_an_id() -> Result<()> {
        init_logs();
        let table = account_table(&DIALECT)?;
        let connection = StubConnection::new();
        connection.queue_rows(
            account_rows()
                .row([
                    Value::Int32(Some(1)),
                    Value::Varchar(Some("alice".into())),
                    Value::Varchar(None),
                    Value::Varchar(Some("Basic".into())),
                ])
                .row([
                    Value::Int32(Some(1)),
                    Value::Varchar(Some("renamed".into())),
                    Value::Varchar(None),
                    Value::Varchar(Some("Basic".into())),
                ]),
        );
        let compiled = QueryBuilder::new(&table).compile(&DIALECT)?;
        let cache = IdentityCache::new();
        let rows = compiled.run(&connection, Some(&cache))?;
        assert_eq!(rows.len(), 2);
        assert!(Rc::ptr_eq(&rows[0], &rows[1]));
        // The cached instance wins, the second row is not re-applied.
        assert_eq!(rows[1].borrow().name, "alice");
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn without_a_cache_every_row_is_a_fresh_instance() -> Result<()> {
        init_logs();
        let table = account_table(&DIALECT)?;
        let connection = StubConnection::new();
        connection.queue_rows(
            account_rows()
                .row([
                    Value::Int32(Some(1)),
                    Value::Varchar(Some("alice".into())),
                    Value::Varchar(None),
                    Value::Varchar(Some("Basic".into())),
                ])
                .row([
                    Value::Int32(Some(1)),
                    Value::Varchar(Some("alice".into())),
                    Value::Varchar(None),
                    Value::Varchar(Some("Basic".into())),
                ]),
        );
        let compiled = QueryBuilder::new(&table).compile(&DIALECT)?;
        let rows = compiled.run(&connection, None)?;
        assert!(!Rc::ptr_eq(&rows[0], &rows[1]));
        Ok(())
    }

    #[test]
    fn id_keys_normalize_integer_widths() -> Result<()> {
        assert_eq!(IdKey::try_from(&Value::Int16(Some(5)))?, IdKey::Int(5));
        assert_eq!(IdKey::try_from(&Value::Int32(Some(5)))?, IdKey::Int(5));
        assert_eq!(IdKey::try_from(&Value::Int64(Some(5)))?, IdKey::Int(5));
        assert_eq!(
            IdKey::try_from(&Value::Enum(Some(AccountTier::Silver.as_value())))?,
            IdKey::Enum(1)
        );
        assert_eq!(
            IdKey::try_from(&Value::Varchar(Some("k".into())))?,
            IdKey::Text("k".into())
        );
        assert!(IdKey::try_from(&Value::Null).is_err());
        let error = IdKey::try_from(&Value::Int32(None)).unwrap_err();
        assert!(error.to_string().contains("cannot key the identity cache"));
        Ok(())
    }

    #[test]
    fn foreign_collections_defer_until_fetched() -> Result<()> {
        init_logs();
        let accounts = account_table(&DIALECT)?;
        let orders = order_table(&DIALECT)?;
        let connection = StubConnection::new();
        connection.queue_rows(account_rows().row([
            Value::Int32(Some(1)),
            Value::Varchar(Some("alice".into())),
            Value::Varchar(None),
            Value::Varchar(Some("Basic".into())),
        ]));
        let compiled = QueryBuilder::new(&accounts).compile(&DIALECT)?;
        let account = compiled.run(&connection, None)?.remove(0);

        let account_ref = account.borrow();
        let collection = account_ref.orders.as_ref().unwrap();
        assert!(!collection.is_loaded());
        assert!(collection.cached().is_none());
        assert_eq!(collection.owner_id(), &Value::Int32(Some(1)));

        connection.queue_rows(
            StubRows::new(["id", "account_id", "quantity", "total"])
                .row([
                    Value::Int32(Some(10)),
                    Value::Int32(Some(1)),
                    Value::Int32(Some(2)),
                    Value::Int64(Some(700)),
                ])
                .row([
                    Value::Int32(Some(11)),
                    Value::Int32(Some(1)),
                    Value::Int32(Some(3)),
                    Value::Int64(Some(900)),
                ]),
        );
        let children = collection.fetch(&orders, &DIALECT, &connection, None, None)?;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].borrow().quantity, 2);
        assert_eq!(children[1].borrow().total, 900);

        // Without the owner handed down, the foreign field is a shell
        // carrying only the id.
        {
            let child = children[0].borrow();
            let owner = child.account.as_ref().unwrap().borrow();
            assert_eq!(owner.id, Some(1));
            assert_eq!(owner.name, "");
        }

        let recorded = connection.recorded();
        assert_eq!(
            recorded.last().unwrap().sql,
            "SELECT * FROM \"orders\" WHERE \"account_id\" = 1 "
        );

        // Memoized, a second fetch runs no query.
        let before = connection.recorded().len();
        collection.fetch(&orders, &DIALECT, &connection, None, None)?;
        assert_eq!(connection.recorded().len(), before);
        assert!(collection.is_loaded());
        assert_eq!(collection.cached().unwrap().len(), 2);
        Ok(())
    }

    #[test]
    fn collection_fetch_hands_the_owner_down_to_its_children() -> Result<()> {
        init_logs();
        let accounts = account_table(&DIALECT)?;
        let orders = order_table(&DIALECT)?;
        let connection = StubConnection::new();
        connection.queue_rows(account_rows().row([
            Value::Int32(Some(1)),
            Value::Varchar(Some("alice".into())),
            Value::Varchar(None),
            Value::Varchar(Some("Basic".into())),
        ]));
        let compiled = QueryBuilder::new(&accounts).compile(&DIALECT)?;
        let account = compiled.run(&connection, None)?.remove(0);

        connection.queue_rows(StubRows::new(["id", "account_id", "quantity", "total"]).row([
            Value::Int32(Some(10)),
            Value::Int32(Some(1)),
            Value::Int32(Some(2)),
            Value::Int64(Some(700)),
        ]));
        let parent = ParentRef::new(account.clone());
        let account_ref = account.borrow();
        let collection = account_ref.orders.as_ref().unwrap();
        let children = collection.fetch(&orders, &DIALECT, &connection, None, Some(&parent))?;
        let child = children[0].borrow();
        assert!(Rc::ptr_eq(child.account.as_ref().unwrap(), &account));
        Ok(())
    }

    #[test]
    fn a_projection_without_the_id_cannot_seed_collections() -> Result<()> {
        init_logs();
        let table = account_table(&DIALECT)?;
        let connection = StubConnection::new();
        connection.queue_rows(
            StubRows::new(["name"]).row([Value::Varchar(Some("alice".into()))]),
        );
        let mut query = QueryBuilder::new(&table);
        query.select_columns(["name"])?;
        let error = query.compile(&DIALECT)?.run(&connection, None).unwrap_err();
        assert_eq!(
            error.to_string(),
            "The projection of account must include the id to build its collections"
        );
        Ok(())
    }

    #[test]
    fn identity_persisters_accept_only_their_own_width() -> Result<()> {
        let argument = persister::LONG.to_argument(Value::Int64(Some(313213123)))?;
        assert_eq!(argument, Value::Int64(Some(313213123)));
        let cursor = cursor_over(argument)?;
        assert_eq!(
            persister::LONG.from_result(&cursor, 0)?,
            Value::Int64(Some(313213123))
        );

        let error = persister::LONG
            .to_argument(Value::Int32(Some(5)))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "LongPersister cannot convert the value Int32(Some(5))"
        );
        assert_eq!(persister::LONG.to_argument(Value::Null)?, Value::Int64(None));
        Ok(())
    }

    #[test]
    fn boolean_persisters_encode_their_flags() -> Result<()> {
        assert_eq!(
            persister::BOOLEAN_CHAR.to_argument(Value::Boolean(Some(true)))?,
            Value::Char(Some('1'))
        );
        assert_eq!(
            persister::BOOLEAN_CHAR.to_argument(Value::Boolean(None))?,
            Value::Char(None)
        );
        let cursor = cursor_over(Value::Char(Some('0')))?;
        assert_eq!(
            persister::BOOLEAN_CHAR.from_result(&cursor, 0)?,
            Value::Boolean(Some(false))
        );
        let cursor = cursor_over(Value::Char(Some('x')))?;
        let error = persister::BOOLEAN_CHAR.from_result(&cursor, 0).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot read boolean flag from character 'x'"
        );

        assert_eq!(
            persister::BOOLEAN_INTEGER.to_argument(Value::Boolean(Some(true)))?,
            Value::Int32(Some(1))
        );
        let cursor = cursor_over(Value::Int32(Some(5)))?;
        assert_eq!(
            persister::BOOLEAN_INTEGER.from_result(&cursor, 0)?,
            Value::Boolean(Some(true))
        );
        let cursor = cursor_over(Value::Int32(Some(0)))?;
        assert_eq!(
            persister::BOOLEAN_INTEGER.from_result(&cursor, 0)?,
            Value::Boolean(Some(false))
        );
        Ok(())
    }

    #[test]
    fn enum_persisters_store_the_name_or_the_ordinal() -> Result<()> {
        assert_eq!(
            ACCOUNT_TIER_BY_NAME.to_argument(Value::Enum(Some(AccountTier::Silver.as_value())))?,
            Value::Varchar(Some("Silver".into()))
        );
        let cursor = cursor_over(Value::Varchar(Some("Silver".into())))?;
        assert_eq!(
            ACCOUNT_TIER_BY_NAME.from_result(&cursor, 0)?,
            Value::Enum(Some(AccountTier::Silver.as_value()))
        );
        let cursor = cursor_over(Value::Varchar(Some("Platinum".into())))?;
        let error = ACCOUNT_TIER_BY_NAME.from_result(&cursor, 0).unwrap_err();
        assert_eq!(
            error.to_string(),
            "'Platinum' does not name any known enum variant"
        );

        assert!(ACCOUNT_TIER_BY_ORDINAL.is_numeric());
        assert_eq!(
            ACCOUNT_TIER_BY_ORDINAL
                .to_argument(Value::Enum(Some(AccountTier::Gold.as_value())))?,
            Value::Int32(Some(2))
        );
        let cursor = cursor_over(Value::Int32(Some(1)))?;
        assert_eq!(
            ACCOUNT_TIER_BY_ORDINAL.from_result(&cursor, 0)?,
            Value::Enum(Some(AccountTier::Silver.as_value()))
        );
        let cursor = cursor_over(Value::Int32(Some(9)))?;
        let error = ACCOUNT_TIER_BY_ORDINAL.from_result(&cursor, 0).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Ordinal 9 does not match any known enum variant"
        );
        Ok(())
    }

    #[test]
    fn a_date_can_be_stored_as_patterned_text() -> Result<()> {
        assert_eq!(
            US_DATE.to_argument(Value::Date(Some(date!(2024 - 03 - 09))))?,
            Value::Varchar(Some("03/09/2024".into()))
        );
        let cursor = cursor_over(Value::Varchar(Some("12/25/2023".into())))?;
        assert_eq!(
            US_DATE.from_result(&cursor, 0)?,
            Value::Date(Some(date!(2023 - 12 - 25)))
        );
        assert_eq!(
            US_DATE.parse_default("01/02/2003")?,
            Value::Date(Some(date!(2003 - 01 - 02)))
        );
        let cursor = cursor_over(Value::Varchar(Some("2023-12-25".into())))?;
        assert!(US_DATE.from_result(&cursor, 0).is_err());
        Ok(())
    }

    #[test]
    fn text_can_be_stored_as_encoded_bytes() -> Result<()> {
        let argument =
            persister::TEXT_UTF8_BYTES.to_argument(Value::Varchar(Some("héllo".into())))?;
        assert_eq!(argument, Value::Blob(Some("héllo".as_bytes().into())));
        let cursor = cursor_over(argument)?;
        assert_eq!(
            persister::TEXT_UTF8_BYTES.from_result(&cursor, 0)?,
            Value::Varchar(Some("héllo".into()))
        );

        let argument =
            persister::TEXT_UTF16_BYTES.to_argument(Value::Varchar(Some("héllo".into())))?;
        let Value::Blob(Some(bytes)) = &argument else {
            panic!("expected encoded bytes, got {:?}", argument);
        };
        assert_eq!(bytes.len(), 10);
        let cursor = cursor_over(argument.clone())?;
        assert_eq!(
            persister::TEXT_UTF16_BYTES.from_result(&cursor, 0)?,
            Value::Varchar(Some("héllo".into()))
        );

        // An odd byte count cannot be UTF-16.
        let cursor = cursor_over(Value::Blob(Some(vec![0x00].into_boxed_slice())))?;
        assert!(persister::TEXT_UTF16_BYTES.from_result(&cursor, 0).is_err());
        Ok(())
    }

    #[test]
    fn defaults_parse_and_substitute_for_null_fields() -> Result<()> {
        assert_eq!(
            persister::INTEGER.parse_default("42")?,
            Value::Int32(Some(42))
        );
        assert_eq!(
            persister::INTEGER.parse_default("abc").unwrap_err().to_string(),
            "Cannot parse 'abc' as a 32 bit integer"
        );
        assert_eq!(
            persister::BOOLEAN.parse_default("1")?,
            Value::Boolean(Some(true))
        );
        assert_eq!(
            persister::TIMESTAMP.parse_default("2024-03-09 10:20:30")?,
            Value::Timestamp(Some(datetime!(2024-03-09 10:20:30)))
        );
        assert_eq!(
            persister::BLOB.parse_default("DEAD")?,
            Value::Blob(Some(vec![0xDE, 0xAD].into_boxed_slice()))
        );

        #[derive(Debug, Default)]
        struct Gadget {
            id: Option<i32>,
            level: Option<i32>,
        }
        let table = TableConfig::new(Gadget::default)
            .field(
                FieldConfig::new("id", SqlType::Integer)
                    .generated_id()
                    .get(|gadget: &Gadget| Value::Int32(gadget.id))
                    .set(|gadget, value| Ok(gadget.id = value.to_i32()?)),
            )
            .field(
                FieldConfig::new("level", SqlType::Integer)
                    .default_value("7")
                    .get(|gadget: &Gadget| Value::Int32(gadget.level))
                    .set(|gadget, value| Ok(gadget.level = value.to_i32()?)),
            )
            .build(&DIALECT)?;
        let level = table.find_column("level")?;
        assert_eq!(
            table.field(level).extract_argument(&Gadget::default())?,
            Value::Int32(Some(7))
        );
        let gadget = Gadget {
            level: Some(3),
            ..Default::default()
        };
        assert_eq!(
            table.field(level).extract_argument(&gadget)?,
            Value::Int32(Some(3))
        );

        let error = TableConfig::new(Gadget::default)
            .field(
                FieldConfig::new("level", SqlType::Integer)
                    .default_value("many")
                    .get(|gadget: &Gadget| Value::Int32(gadget.level))
                    .set(|gadget, value| Ok(gadget.level = value.to_i32()?)),
            )
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(error.to_string(), "Invalid default for field gadget.level");
        Ok(())
    }

    #[test]
    fn table_construction_is_validated() {
        #[derive(Debug, Default)]
        struct Broken {
            a: i32,
        }
        fn field(name: &str) -> FieldConfig<Broken> {
            FieldConfig::new(name, SqlType::Integer)
                .get(|broken: &Broken| Value::Int32(Some(broken.a)))
                .set(|broken, value| Ok(broken.a = value.to_i32()?.unwrap_or_default()))
        }

        let error = TableConfig::new(Broken::default)
            .field(field("a").column_name("x"))
            .field(field("b").column_name("x"))
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(error.to_string(), "Table broken maps the column x twice");

        let error = TableConfig::new(Broken::default)
            .field(field("a").id())
            .field(field("b").id())
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Table broken declares more than one id field: a and b"
        );

        let error = TableConfig::new(Broken::default)
            .field(
                FieldConfig::new("a", SqlType::Integer)
                    .get(|broken: &Broken| Value::Int32(Some(broken.a))),
            )
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Field broken.a needs both an accessor and a mutator"
        );

        let error = TableConfig::new(Broken::default)
            .field(field("a").id().generated_id())
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Field broken.a mixes more than one id flavor"
        );

        let error = TableConfig::new(Broken::default)
            .field(
                FieldConfig::new("a", SqlType::Enum)
                    .get(|broken: &Broken| Value::Int32(Some(broken.a)))
                    .set(|broken, value| Ok(broken.a = value.to_i32()?.unwrap_or_default())),
            )
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Field broken.a of type ENUM has no persister, configure one explicitly"
        );

        let error = TableConfig::new(Broken::default)
            .field(FieldConfig::foreign_collection("stuff", "owner_id"))
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Foreign collection broken.stuff has no collection constructor"
        );

        let error = TableConfig::new(Broken::default)
            .build(&DIALECT)
            .unwrap_err();
        assert_eq!(error.to_string(), "Table broken has no persisted fields");
    }
}
