//! Query builder unit tests

#[cfg(test)]
mod tests {
    use crate::query_builder::pagination::{page_offset, total_pages};
    use crate::query_builder::{
        Conditions, Page, QueryOperator, QueryOptions, SortOrder, SqlGenerator, UpdateOperation,
        UpdateSet,
    };
    use crate::traits::ColumnName;
    use crate::StoreError;
    use type_mapping::PostgresValue;
    use uuid::Uuid;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum ItemColumn {
        InstanceId,
        CharacterId,
        ItemId,
        Count,
        Slot,
    }

    impl ColumnName for ItemColumn {
        fn as_str(&self) -> &'static str {
            match self {
                ItemColumn::InstanceId => "instance_id",
                ItemColumn::CharacterId => "character_id",
                ItemColumn::ItemId => "item_id",
                ItemColumn::Count => "count",
                ItemColumn::Slot => "slot",
            }
        }
    }

    // ========================================
    // Conditions
    // ========================================

    #[test]
    fn test_conditions_keep_insertion_order() {
        let character = Uuid::new_v4();
        let conditions = Conditions::new()
            .eq(ItemColumn::CharacterId, character)
            .eq(ItemColumn::ItemId, 7);

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions.predicates()[0].column, ItemColumn::CharacterId);
        assert_eq!(
            conditions.predicates()[0].value,
            PostgresValue::Uuid(Some(character))
        );
        assert_eq!(conditions.predicates()[1].operator, QueryOperator::Eq);
    }

    #[test]
    fn test_eq_opt_skips_absent_values() {
        let conditions = Conditions::new()
            .eq_opt(ItemColumn::ItemId, Some(3))
            .eq_opt(ItemColumn::Slot, Option::<i32>::None);

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions.predicates()[0].column, ItemColumn::ItemId);
    }

    #[test]
    fn test_eq_opt_with_only_absent_values_is_empty() {
        let conditions = Conditions::<ItemColumn>::new()
            .eq_opt(ItemColumn::ItemId, Option::<i32>::None)
            .eq_opt(ItemColumn::CharacterId, Option::<Uuid>::None);

        assert!(conditions.is_empty());
    }

    // ========================================
    // SQL Generation
    // ========================================

    #[test]
    fn test_sql_generation_empty_conditions() {
        let (where_clause, values) =
            SqlGenerator::build_where_clause(&Conditions::<ItemColumn>::new(), 1);
        assert_eq!(where_clause, "");
        assert!(values.is_empty());
    }

    #[test]
    fn test_sql_generation_parameter_numbering() {
        let conditions = Conditions::new()
            .eq(ItemColumn::CharacterId, Uuid::nil())
            .eq(ItemColumn::ItemId, 4)
            .lte(ItemColumn::Count, 6);

        let (where_clause, values) = SqlGenerator::build_where_clause(&conditions, 1);

        assert_eq!(
            where_clause,
            "WHERE \"character_id\" = $1 AND \"item_id\" = $2 AND \"count\" <= $3"
        );
        assert_eq!(values.len(), 3);
        assert_eq!(values[2], PostgresValue::Integer(Some(6)));
    }

    #[test]
    fn test_sql_generation_starts_at_given_index() {
        let conditions = Conditions::new().eq(ItemColumn::InstanceId, Uuid::nil());
        let (where_clause, _) = SqlGenerator::build_where_clause(&conditions, 10);
        assert_eq!(where_clause, "WHERE \"instance_id\" = $10");
    }

    #[test]
    fn test_sql_generation_null_conditions() {
        let conditions = Conditions::new()
            .eq(ItemColumn::Slot, Option::<i32>::None)
            .ne(ItemColumn::CharacterId, Option::<Uuid>::None)
            .eq(ItemColumn::ItemId, 1);

        let (where_clause, values) = SqlGenerator::build_where_clause(&conditions, 1);

        assert_eq!(
            where_clause,
            "WHERE \"slot\" IS NULL AND \"character_id\" IS NOT NULL AND \"item_id\" = $1"
        );
        assert_eq!(values, vec![PostgresValue::Integer(Some(1))]);
    }

    #[test]
    fn test_sql_generation_ordering_against_null_matches_nothing() {
        let conditions = Conditions::new().gt(ItemColumn::Count, Option::<i32>::None);
        let (where_clause, values) = SqlGenerator::build_where_clause(&conditions, 1);

        assert!(where_clause.contains("1=0"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_sql_generation_special_characters_stay_in_parameters() {
        let conditions = Conditions::new().eq(ItemColumn::InstanceId, "'; DROP TABLE users; --");
        let (where_clause, values) = SqlGenerator::build_where_clause(&conditions, 1);

        assert!(!where_clause.contains("DROP"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_sql_generation_many_filters() {
        let mut conditions = Conditions::new();
        for i in 0..100 {
            conditions = conditions.eq(ItemColumn::ItemId, i);
        }

        let (where_clause, values) = SqlGenerator::build_where_clause(&conditions, 1);

        assert!(where_clause.starts_with("WHERE"));
        assert_eq!(where_clause.matches(" AND ").count(), 99);
        assert!(where_clause.ends_with("$100"));
        assert_eq!(values.len(), 100);
    }

    // ========================================
    // Ordering and limits
    // ========================================

    #[test]
    fn test_sort_order_sql_conversion() {
        assert_eq!(SortOrder::Asc.to_sql(), "ASC");
        assert_eq!(SortOrder::Desc.to_sql(), "DESC");
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }

    #[test]
    fn test_empty_options_add_nothing() {
        let options = QueryOptions::<ItemColumn>::new();

        assert_eq!(SqlGenerator::build_order_clause(&options), "");
        let (limit_clause, values) = SqlGenerator::build_limit_clause(&options, 1);
        assert_eq!(limit_clause, "");
        assert!(values.is_empty());
    }

    #[test]
    fn test_order_clause_generation() {
        let options = QueryOptions::new().order_by(ItemColumn::Count, SortOrder::Desc);
        assert_eq!(
            SqlGenerator::build_order_clause(&options),
            "ORDER BY \"count\" DESC"
        );
    }

    #[test]
    fn test_limit_and_offset_are_bound() {
        let options = QueryOptions::<ItemColumn>::new().limit(10).offset(20);
        let (limit_clause, values) = SqlGenerator::build_limit_clause(&options, 3);

        assert_eq!(limit_clause, "LIMIT $3 OFFSET $4");
        assert_eq!(
            values,
            vec![PostgresValue::BigInt(Some(10)), PostgresValue::BigInt(Some(20))]
        );
    }

    #[test]
    fn test_offset_without_limit() {
        let options = QueryOptions::<ItemColumn>::new().offset(5);
        let (limit_clause, values) = SqlGenerator::build_limit_clause(&options, 1);

        assert_eq!(limit_clause, "OFFSET $1");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_assemble_skips_empty_fragments() {
        let sql = SqlGenerator::assemble(&["SELECT * FROM \"t\"", "", "ORDER BY \"id\" ASC", ""]);
        assert_eq!(sql, "SELECT * FROM \"t\" ORDER BY \"id\" ASC");
    }

    // ========================================
    // Update sets
    // ========================================

    #[test]
    fn test_set_clause_numbering_and_timestamp() {
        let update = UpdateSet::new()
            .increment(ItemColumn::Count, 2)
            .set(ItemColumn::Slot, Option::<i32>::None);

        let (set_clause, values) = SqlGenerator::build_set_clause(&update, 1);

        assert_eq!(
            set_clause,
            "\"count\" = \"count\" + $1, \"slot\" = $2, \"__updated_at__\" = NOW()"
        );
        assert_eq!(values[1], PostgresValue::Integer(None));
    }

    #[test]
    fn test_update_set_replaces_repeated_column() {
        let update = UpdateSet::new()
            .set(ItemColumn::Count, 1)
            .set(ItemColumn::Slot, 2)
            .decrement(ItemColumn::Count, 3);

        assert_eq!(update.len(), 2);
        let (column, operation) = &update.operations()[0];
        assert_eq!(*column, ItemColumn::Count);
        assert!(matches!(operation, UpdateOperation::Decrement(_)));
        assert_eq!(operation.value(), &PostgresValue::Integer(Some(3)));
    }

    #[test]
    fn test_update_set_retain() {
        let update = UpdateSet::new()
            .set(ItemColumn::InstanceId, Uuid::nil())
            .set(ItemColumn::Count, 1)
            .retain(|c| c != ItemColumn::InstanceId);

        assert_eq!(update.len(), 1);
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_operation_sql() {
        let op = UpdateOperation::Decrement(PostgresValue::from(1));
        assert_eq!(op.to_sql("count", 4), "\"count\" = \"count\" - $4");
    }

    // ========================================
    // Pagination
    // ========================================

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 5), 5);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 20).unwrap(), 0);
        assert_eq!(page_offset(3, 20).unwrap(), 40);
    }

    #[test]
    fn test_page_offset_rejects_out_of_range_arguments() {
        assert!(matches!(page_offset(0, 10), Err(StoreError::Validation(_))));
        assert!(matches!(page_offset(1, 0), Err(StoreError::Validation(_))));
        assert!(matches!(page_offset(-2, -2), Err(StoreError::Validation(_))));
        assert!(matches!(page_offset(i64::MAX, 2), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec![1, 2, 3], 7, 1, 3);
        let value = serde_json::to_value(&page).unwrap();

        assert_eq!(value["totalPages"], 3);
        assert_eq!(value["pageSize"], 3);
        assert_eq!(value["data"].as_array().map(|d| d.len()), Some(3));
    }
}
