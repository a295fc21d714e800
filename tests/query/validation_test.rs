#[path = "../common/fixture.rs"]
mod fixture;

#[cfg(test)]
mod tests {
    use super::fixture::request;
    use anyset::model::ColumnClassification;
    use anyset::query::ValidationError;
    use serde_json::json;

    #[test]
    fn test_category_filter_on_category_column() {
        let req = request(json!({
            "table_name": "t",
            "filters": [{"kind": "category", "column_name": "cat", "values": ["a"]}]
        }))
        .unwrap();
        assert_eq!(req.filters().len(), 1);
        assert_eq!(req.table_name(), "t");
    }

    #[test]
    fn test_unknown_table() {
        let err = request(json!({"table_name": "missing"})).unwrap_err();
        assert_eq!(err, ValidationError::TableNotFound("missing".into()));
    }

    #[test]
    fn test_category_filter_on_fact_column() {
        let err = request(json!({
            "table_name": "t",
            "filters": [{"kind": "category", "column_name": "fct", "values": ["a"]}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::FilterColumnInvalid {
                column: "fct".into(),
                expected: ColumnClassification::Category
            }
        );
    }

    #[test]
    fn test_fact_filter_on_category_column() {
        let err = request(json!({
            "table_name": "t",
            "filters": [{"kind": "fact", "column_name": "cat", "min": 1}]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::FilterColumnInvalid { expected: ColumnClassification::Fact, .. }));
    }

    #[test]
    fn test_select_column_must_exist() {
        let err = request(json!({"table_name": "t", "select": ["cat", "ghost"]})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::SelectColumnNotFound {
                table: "t".into(),
                column: "ghost".into()
            }
        );
    }

    #[test]
    fn test_aggregation_requires_fact_column() {
        let err = request(json!({
            "table_name": "t",
            "aggregations": [{"column_name": "cat", "function": "COUNT", "alias": "n"}]
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::AggregationColumnNotFound("cat".into()));
    }

    #[test]
    fn test_custom_aggregation_must_be_declared() {
        assert!(request(json!({"table_name": "t", "aggregations": [["ratio", "r"]]})).is_ok());
        let err = request(json!({"table_name": "t", "aggregations": [["DROP TABLE t", "r"]]})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CustomAggregationFunctionNotFound("DROP TABLE t".into())
        );
    }

    #[test]
    fn test_pagination_boundaries() {
        let page = |limit: i64, offset: i64| {
            request(json!({"table_name": "t", "pagination": {"limit": limit, "offset": offset}}))
        };
        assert_eq!(
            page(0, 0).unwrap_err(),
            ValidationError::InvalidPaginationParameters { limit: 0, offset: 0 }
        );
        assert_eq!(
            page(10, -1).unwrap_err(),
            ValidationError::InvalidPaginationParameters { limit: 10, offset: -1 }
        );
        let ok = page(1, 0).unwrap();
        assert_eq!((ok.pagination().limit(), ok.pagination().offset()), (1, 0));
    }

    #[test]
    fn test_checks_run_in_order() {
        // Bad filter and bad pagination: the filter is reported.
        let err = request(json!({
            "table_name": "t",
            "filters": [{"kind": "category", "column_name": "fct", "values": []}],
            "select": ["ghost"],
            "pagination": {"limit": 0}
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::FilterColumnInvalid { .. }));

        // Bad select and bad aggregation: the select is reported.
        let err = request(json!({
            "table_name": "t",
            "select": ["ghost"],
            "aggregations": [["nope", "n"]]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::SelectColumnNotFound { .. }));
    }

    #[test]
    fn test_order_by_is_not_checked() {
        let req = request(json!({
            "table_name": "t",
            "aggregations": [["fct", "SUM", "total"]],
            "order_by": [["total", "DESC"]]
        }))
        .unwrap();
        assert!(req.group_by().is_empty());

        let req = request(json!({
            "table_name": "t",
            "select": ["cat"],
            "aggregations": [["fct", "SUM", "total"]],
            "order_by": [["total", "DESC"], ["region", "ASC"]]
        }))
        .unwrap();
        assert_eq!(req.group_by(), ["cat", "region"]);
    }

    #[test]
    fn test_group_by_keeps_alias_and_column() {
        let req = request(json!({
            "table_name": "t",
            "select": [{"column_name": "cat", "alias": "c"}],
            "order_by": [{"column_name": "cat", "direction": "ASC"}]
        }))
        .unwrap();
        assert_eq!(req.group_by(), ["c", "cat"]);
    }

    #[test]
    fn test_malformed_tokens_rejected_before_schema() {
        let err = request(json!({
            "table_name": "missing",
            "aggregations": [["fct", "STDDEV", "s"]]
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::UnknownAggregationFunction("STDDEV".into()));
    }
}
