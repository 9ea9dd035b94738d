#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use tenon::{
        ArgumentHolder, CompiledCreate, CompiledDelete, CompiledDeleteCollection,
        CompiledQueryById, CompiledUpdate, DeleteBuilder, Dialect, FieldConfig, FirebirdDialect,
        MySqlDialect, QueryBuilder, Result, SqlType, StandardDialect, TableConfig, UpdateBuilder,
        Value,
    };
    use tenon_testkit::{AccountTier, account_table, order_table};
    use time::macros::{date, datetime};
    use uuid::Uuid;

    const DIALECT: StandardDialect = StandardDialect::new();
    const FIREBIRD: FirebirdDialect = FirebirdDialect::new();
    const MYSQL: MySqlDialect = MySqlDialect::new();

    #[test]
    fn insert_excludes_a_post_insert_generated_id() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let create = CompiledCreate::compile(&table, &DIALECT)?;
        assert_eq!(
            create.sql(),
            "INSERT INTO \"account\" (\"name\" ,\"password\" ,\"tier\" ) VALUES (? ,? ,? ) "
        );
        Ok(())
    }

    #[test]
    fn insert_with_a_sequence_id_includes_the_id_column() -> Result<()> {
        let table = account_table(&FIREBIRD)?;
        let create = CompiledCreate::compile(&table, &FIREBIRD)?;
        assert_eq!(
            create.sql(),
            "INSERT INTO \"ACCOUNT\" (\"ID\" ,\"NAME\" ,\"PASSWORD\" ,\"TIER\" ) VALUES (? ,? ,? ,? ) "
        );
        Ok(())
    }

    #[test]
    fn insert_needs_at_least_one_column() -> Result<()> {
        #[derive(Debug, Default)]
        struct Marker {
            id: Option<i32>,
        }
        let table = TableConfig::new(Marker::default)
            .field(
                FieldConfig::new("id", SqlType::Integer)
                    .generated_id()
                    .get(|marker: &Marker| Value::Int32(marker.id))
                    .set(|marker, value| Ok(marker.id = value.to_i32()?)),
            )
            .build(&DIALECT)?;
        let error = CompiledCreate::compile(&table, &DIALECT).unwrap_err();
        assert_eq!(error.to_string(), "Table marker has no insertable columns");
        Ok(())
    }

    #[test]
    fn update_by_id_sets_every_column_but_the_id() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let update = CompiledUpdate::compile(&table, &DIALECT)?;
        assert_eq!(
            update.sql(),
            Some(
                "UPDATE \"account\" SET \"name\" = ? ,\"password\" = ? ,\"tier\" = ? WHERE \"id\" = ? "
            )
        );
        Ok(())
    }

    #[test]
    fn delete_by_id_shape() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let delete = CompiledDelete::compile(&table, &DIALECT)?;
        assert_eq!(delete.sql(), "DELETE FROM \"account\" WHERE \"id\" = ? ");
        Ok(())
    }

    #[test]
    fn delete_collection_sizes_the_placeholder_list() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let delete = CompiledDeleteCollection::compile(&table, &DIALECT, 3)?;
        assert_eq!(
            delete.sql(),
            "DELETE FROM \"account\" WHERE \"id\" IN (? ,? ,? ) "
        );
        let error = CompiledDeleteCollection::compile(&table, &DIALECT, 0).unwrap_err();
        assert_eq!(error.to_string(), "Cannot compile a delete over zero ids");
        Ok(())
    }

    #[test]
    fn query_by_id_shape() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let query = CompiledQueryById::compile(&table, &DIALECT)?;
        assert_eq!(query.sql(), "SELECT * FROM \"account\" WHERE \"id\" = ? ");
        Ok(())
    }

    #[test]
    fn select_star_and_projection() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let query = QueryBuilder::new(&table);
        assert_eq!(query.compile(&DIALECT)?.sql(), "SELECT * FROM \"account\" ");

        let mut query = QueryBuilder::new(&table);
        query.select_columns(["id", "name"])?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT \"id\" ,\"name\" FROM \"account\" "
        );

        let mut query = QueryBuilder::new(&table);
        let error = query.select_columns(std::iter::empty::<&str>()).unwrap_err();
        assert_eq!(error.to_string(), "The projection needs at least one column");
        Ok(())
    }

    #[test]
    fn full_select_renders_its_sections_in_order() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.select_columns(["id", "name"])?;
        query.where_().eq("tier", AccountTier::Gold.as_value())?;
        query.order_by("id", true)?;
        query.limit(10);
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT \"id\" ,\"name\" FROM \"account\" WHERE \"tier\" = 'Gold' ORDER BY \"id\" LIMIT 10 "
        );
        Ok(())
    }

    #[test]
    fn comparison_operator_segments() -> Result<()> {
        let table = order_table(&DIALECT)?;
        {
            let mut query = QueryBuilder::new(&table);
            query.where_().eq("total", 5i64)?;
            assert_eq!(
                query.compile(&DIALECT)?.sql(),
                "SELECT * FROM \"orders\" WHERE \"total\" = 5 "
            );
        }
        {
            let mut query = QueryBuilder::new(&table);
            query.where_().ne("total", 5i64)?;
            assert_eq!(
                query.compile(&DIALECT)?.sql(),
                "SELECT * FROM \"orders\" WHERE \"total\" <> 5 "
            );
        }
        {
            let mut query = QueryBuilder::new(&table);
            query.where_().gt("total", 5i64)?;
            assert_eq!(
                query.compile(&DIALECT)?.sql(),
                "SELECT * FROM \"orders\" WHERE \"total\" > 5 "
            );
        }
        {
            let mut query = QueryBuilder::new(&table);
            query.where_().ge("total", 5i64)?;
            assert_eq!(
                query.compile(&DIALECT)?.sql(),
                "SELECT * FROM \"orders\" WHERE \"total\" >= 5 "
            );
        }
        {
            let mut query = QueryBuilder::new(&table);
            query.where_().lt("total", 5i64)?;
            assert_eq!(
                query.compile(&DIALECT)?.sql(),
                "SELECT * FROM \"orders\" WHERE \"total\" < 5 "
            );
        }
        {
            let mut query = QueryBuilder::new(&table);
            query.where_().le("total", 5i64)?;
            assert_eq!(
                query.compile(&DIALECT)?.sql(),
                "SELECT * FROM \"orders\" WHERE \"total\" <= 5 "
            );
        }
        {
            let accounts = account_table(&DIALECT)?;
            let mut query = QueryBuilder::new(&accounts);
            query.where_().like("name", "bo%")?;
            assert_eq!(
                query.compile(&DIALECT)?.sql(),
                "SELECT * FROM \"account\" WHERE \"name\" LIKE 'bo%' "
            );
        }
        Ok(())
    }

    #[test]
    fn literals_quote_by_column_type() -> Result<()> {
        let accounts = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&accounts);
        query.where_().eq("name", "it's")?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE \"name\" = 'it''s' "
        );

        let mut query = QueryBuilder::new(&accounts);
        query.where_().eq("tier", AccountTier::Silver.as_value())?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE \"tier\" = 'Silver' "
        );

        let orders = order_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&orders);
        query.where_().eq("quantity", 7)?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"orders\" WHERE \"quantity\" = 7 "
        );
        Ok(())
    }

    #[test]
    fn null_checks() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().is_null("password")?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE \"password\" IS NULL "
        );

        let mut query = QueryBuilder::new(&table);
        query.where_().is_not_null("password")?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE \"password\" IS NOT NULL "
        );
        Ok(())
    }

    #[test]
    fn between_renders_both_bounds() -> Result<()> {
        let table = order_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().between("quantity", 10, 20)?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"orders\" WHERE \"quantity\" BETWEEN 10 AND 20 "
        );
        Ok(())
    }

    #[test]
    fn in_list_renders_a_comma_separated_tuple() -> Result<()> {
        let orders = order_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&orders);
        query.where_().is_in("quantity", [1, 2, 3])?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"orders\" WHERE \"quantity\" IN (1 ,2 ,3 ) "
        );

        let accounts = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&accounts);
        query.where_().is_in("name", ["a", "b"])?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE \"name\" IN ('a' ,'b' ) "
        );
        Ok(())
    }

    #[test]
    fn chained_and_extends_one_flat_group() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query
            .where_()
            .eq("id", 1)?
            .and()?
            .eq("name", "a")?
            .and()?
            .eq("password", "b")?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE (\"id\" = 1 AND \"name\" = 'a' AND \"password\" = 'b' ) "
        );
        Ok(())
    }

    #[test]
    fn or_then_and_nests_the_or_group() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query
            .where_()
            .eq("name", "a")?
            .or()?
            .eq("password", "b")?
            .and()?
            .eq("id", 1)?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE ((\"name\" = 'a' OR \"password\" = 'b' ) AND \"id\" = 1 ) "
        );
        Ok(())
    }

    #[test]
    fn group_collapses_the_top_clauses() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().eq("id", 1)?;
        query.where_().eq("name", "a")?;
        query.where_().is_null("password")?;
        query.where_().and_group(3)?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE (\"id\" = 1 AND \"name\" = 'a' AND \"password\" IS NULL ) "
        );
        Ok(())
    }

    #[test]
    fn group_count_must_match_the_stack() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().eq("id", 1)?;
        let error = query.where_().or_group(2).unwrap_err();
        assert_eq!(
            error.to_string(),
            "A OR group over 2 clauses was requested but only 1 were built"
        );
        let error = query.where_().and_group(0).unwrap_err();
        assert_eq!(error.to_string(), "A AND group needs at least one clause");
        Ok(())
    }

    #[test]
    fn not_wraps_a_single_comparison() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().not()?.eq("name", "bob")?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE (NOT \"name\" = 'bob' ) "
        );

        let mut query = QueryBuilder::new(&table);
        query.where_().not()?.is_null("password")?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE (NOT \"password\" IS NULL ) "
        );
        Ok(())
    }

    #[test]
    fn not_rejects_anything_but_a_comparison() -> Result<()> {
        let accounts = account_table(&DIALECT)?;
        let orders = order_table(&DIALECT)?;

        let sub = QueryBuilder::new(&orders);
        let mut query = QueryBuilder::new(&accounts);
        query.where_().not()?;
        let error = query.where_().exists(sub).unwrap_err();
        assert_eq!(error.to_string(), "NOT only works with a comparison clause");

        let mut query = QueryBuilder::new(&accounts);
        query.where_().not()?.not()?;
        let error = query.where_().eq("id", 1).unwrap_err();
        assert_eq!(error.to_string(), "NOT only works with a comparison clause");
        Ok(())
    }

    #[test]
    fn raw_text_is_carried_verbatim() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().raw("\"id\" % 2 = 0")?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE \"id\" % 2 = 0 "
        );
        Ok(())
    }

    #[test]
    fn exists_drops_the_separator_before_the_closing_parenthesis() -> Result<()> {
        let accounts = account_table(&DIALECT)?;
        let orders = order_table(&DIALECT)?;
        let mut sub = QueryBuilder::new(&orders);
        sub.where_().eq("account_id", 5)?;
        let mut query = QueryBuilder::new(&accounts);
        query.where_().exists(sub)?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE EXISTS (SELECT * FROM \"orders\" WHERE \"account_id\" = 5) "
        );
        Ok(())
    }

    #[test]
    fn in_sub_query_keeps_the_embedded_text_intact() -> Result<()> {
        let accounts = account_table(&DIALECT)?;
        let orders = order_table(&DIALECT)?;
        let mut sub = QueryBuilder::new(&orders);
        sub.select_columns(["account_id"])?;
        let mut query = QueryBuilder::new(&accounts);
        query.where_().in_sub_query("id", sub)?;
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" WHERE \"id\" IN (SELECT \"account_id\" FROM \"orders\" ) "
        );
        Ok(())
    }

    #[test]
    fn in_sub_query_checks_the_projection() -> Result<()> {
        let accounts = account_table(&DIALECT)?;
        let orders = order_table(&DIALECT)?;

        let sub = QueryBuilder::new(&orders);
        let mut query = QueryBuilder::new(&accounts);
        let error = query.where_().in_sub_query("id", sub).unwrap_err();
        assert_eq!(
            error.to_string(),
            "The sub-query for id must select exactly one column, it selects 4"
        );

        let mut sub = QueryBuilder::new(&orders);
        sub.select_columns(["total"])?;
        let mut query = QueryBuilder::new(&accounts);
        let error = query.where_().in_sub_query("id", sub).unwrap_err();
        assert_eq!(
            error.to_string(),
            "The sub-query for id selects a LONG column where INTEGER is expected"
        );
        Ok(())
    }

    #[test]
    fn holders_render_placeholders_and_bind_their_column() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let holder = ArgumentHolder::new();
        let mut query = QueryBuilder::new(&table);
        query.where_().eq("name", &holder)?;
        let compiled = query.compile(&DIALECT)?;
        assert_eq!(compiled.sql(), "SELECT * FROM \"account\" WHERE \"name\" = ? ");
        assert_eq!(holder.column(), Some("name"));
        Ok(())
    }

    #[test]
    fn a_holder_cannot_move_to_another_column() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let holder = ArgumentHolder::new();
        let mut query = QueryBuilder::new(&table);
        query
            .where_()
            .eq("name", &holder)?
            .and()?
            .eq("password", &holder)?;
        let error = query.compile(&DIALECT).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument holder is already bound to column name and cannot be moved to password"
        );
        Ok(())
    }

    #[test]
    fn order_limit_offset_render_in_sequence() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let mut query = QueryBuilder::new(&table);
        query.order_by("name", false)?.order_by("id", true)?;
        query.limit(3).offset(2);
        assert_eq!(
            query.compile(&DIALECT)?.sql(),
            "SELECT * FROM \"account\" ORDER BY \"name\" DESC ,\"id\" LIMIT 3 OFFSET 2 "
        );
        Ok(())
    }

    #[test]
    fn firebird_renders_first_and_rejects_offset() -> Result<()> {
        let table = account_table(&FIREBIRD)?;
        let mut query = QueryBuilder::new(&table);
        query.limit(3);
        assert_eq!(
            query.compile(&FIREBIRD)?.sql(),
            "SELECT FIRST 3 * FROM \"ACCOUNT\" "
        );

        let mut query = QueryBuilder::new(&table);
        query.offset(2);
        let error = query.compile(&FIREBIRD).unwrap_err();
        assert_eq!(error.to_string(), "The dialect cannot render OFFSET");
        Ok(())
    }

    #[test]
    fn firebird_upcases_entities_and_still_finds_lower_case_columns() -> Result<()> {
        let table = account_table(&FIREBIRD)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().eq("name", "x")?;
        assert_eq!(
            query.compile(&FIREBIRD)?.sql(),
            "SELECT * FROM \"ACCOUNT\" WHERE \"NAME\" = 'x' "
        );
        Ok(())
    }

    #[test]
    fn mysql_quotes_identifiers_with_backticks() -> Result<()> {
        let table = account_table(&MYSQL)?;
        let mut query = QueryBuilder::new(&table);
        query.where_().eq("name", "x")?;
        assert_eq!(
            query.compile(&MYSQL)?.sql(),
            "SELECT * FROM `account` WHERE `name` = 'x' "
        );
        Ok(())
    }

    #[test]
    fn update_builder_mixes_literals_holders_and_null() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let holder = ArgumentHolder::new();
        let mut update = UpdateBuilder::new(&table);
        update.set("name", "bob")?;
        update.set("password", &holder)?;
        update.where_().eq("id", 5)?;
        assert_eq!(
            update.compile(&DIALECT)?.sql(),
            "UPDATE \"account\" SET \"name\" = 'bob' ,\"password\" = ? WHERE \"id\" = 5 "
        );

        let mut update = UpdateBuilder::new(&table);
        update.set("password", Value::Null)?;
        assert_eq!(
            update.compile(&DIALECT)?.sql(),
            "UPDATE \"account\" SET \"password\" = NULL "
        );

        let update = UpdateBuilder::new(&table);
        let error = update.compile(&DIALECT).unwrap_err();
        assert_eq!(error.to_string(), "The update of account sets no columns");
        Ok(())
    }

    #[test]
    fn delete_builder_with_and_without_a_predicate() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let delete = DeleteBuilder::new(&table);
        assert_eq!(delete.compile(&DIALECT)?.sql(), "DELETE FROM \"account\" ");

        let mut delete = DeleteBuilder::new(&table);
        delete.where_().eq("id", 3)?;
        assert_eq!(
            delete.compile(&DIALECT)?.sql(),
            "DELETE FROM \"account\" WHERE \"id\" = 3 "
        );
        Ok(())
    }

    #[test]
    fn predicate_construction_errors() -> Result<()> {
        let table = account_table(&DIALECT)?;
        let orders = order_table(&DIALECT)?;

        let mut query = QueryBuilder::new(&table);
        let error = query.where_().eq("nope", 1).unwrap_err();
        assert_eq!(error.to_string(), "Table account has no column nope");

        let mut query = QueryBuilder::new(&table);
        let error = query.where_().and().unwrap_err();
        assert_eq!(error.to_string(), "AND needs an existing clause on its left");

        let mut query = QueryBuilder::new(&table);
        query.where_().eq("id", 1)?.and()?;
        let error = query.where_().or().unwrap_err();
        assert_eq!(
            error.to_string(),
            "OR cannot join a clause that is still missing its right-hand side"
        );

        let mut query = QueryBuilder::new(&table);
        query.where_().eq("id", 1)?;
        query.where_().eq("name", "a")?;
        let error = query.compile(&DIALECT).unwrap_err();
        assert_eq!(
            error.to_string(),
            "2 clauses remain unjoined, use and_group or or_group"
        );

        let mut query = QueryBuilder::new(&table);
        let mut out = String::new();
        let mut arguments = Vec::new();
        let error = query
            .where_()
            .append_sql(&DIALECT, &mut out, &mut arguments)
            .unwrap_err();
        assert_eq!(error.to_string(), "No clauses were built");

        let mut query = QueryBuilder::new(&orders);
        let error = query
            .where_()
            .is_in("quantity", Vec::<i32>::new())
            .unwrap_err();
        assert_eq!(error.to_string(), "IN on quantity requires at least one value");

        let mut query = QueryBuilder::new(&orders);
        let error = query.where_().between("quantity", 10, "x").unwrap_err();
        assert_eq!(error.to_string(), "Invalid high bound of BETWEEN on quantity");

        let mut query = QueryBuilder::new(&table);
        let error = query.where_().eq("password", Value::Null).unwrap_err();
        assert!(
            format!("{:#}", error)
                .contains("The value for password is null, use is_null instead")
        );
        Ok(())
    }

    #[test]
    fn value_rendering() {
        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Null, true);
        assert_eq!(out, "NULL");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Varchar(None), true);
        assert_eq!(out, "NULL");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Boolean(Some(true)), false);
        assert_eq!(out, "true");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Boolean(Some(false)), true);
        assert_eq!(out, "'false'");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Char(Some('x')), true);
        assert_eq!(out, "'x'");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Float64(Some(1.5)), false);
        assert_eq!(out, "1.5");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Decimal(Some(Decimal::new(12345, 2))), false);
        assert_eq!(out, "123.45");

        let mut out = String::new();
        DIALECT.write_value(
            &mut out,
            &Value::Blob(Some(vec![0xDE, 0xAD].into_boxed_slice())),
            true,
        );
        assert_eq!(out, "'\\xDE\\xAD'");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Date(Some(date!(2024 - 03 - 09))), true);
        assert_eq!(out, "'2024-03-09'");

        let mut out = String::new();
        DIALECT.write_value(
            &mut out,
            &Value::Timestamp(Some(datetime!(2024-03-09 10:20:30.123))),
            true,
        );
        assert_eq!(out, "'2024-03-09 10:20:30.123'");

        let mut out = String::new();
        DIALECT.write_value(
            &mut out,
            &Value::Timestamp(Some(datetime!(2024-03-09 10:20:30))),
            true,
        );
        assert_eq!(out, "'2024-03-09 10:20:30'");

        let mut out = String::new();
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        DIALECT.write_value(&mut out, &Value::Uuid(Some(id)), true);
        assert_eq!(out, "'67e55044-10b1-426f-9247-bb680e5fe0c8'");

        let mut out = String::new();
        DIALECT.write_value(&mut out, &Value::Serialized(Some(json!({"a": 1}))), true);
        assert_eq!(out, "'{\"a\":1}'");
    }

    #[test]
    fn identifier_and_literal_escaping() {
        let mut out = String::new();
        DIALECT.write_identifier(&mut out, "we\"ird");
        assert_eq!(out, "\"we\"\"ird\"");

        let mut out = String::new();
        DIALECT.write_string_literal(&mut out, "it's");
        assert_eq!(out, "'it''s'");

        let mut out = String::new();
        MYSQL.write_identifier(&mut out, "back`tick");
        assert_eq!(out, "`back``tick`");
    }

    #[test]
    fn next_sequence_statements() {
        let mut out = String::new();
        DIALECT.write_next_sequence(&mut out, "account_id_seq");
        assert_eq!(out, "SELECT NEXTVAL('account_id_seq')");

        let mut out = String::new();
        FIREBIRD.write_next_sequence(&mut out, "ACCOUNT_ID_SEQ");
        assert_eq!(out, "SELECT NEXT VALUE FOR \"ACCOUNT_ID_SEQ\" FROM RDB$DATABASE");
    }
}
