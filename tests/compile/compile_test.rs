#[path = "../common/fixture.rs"]
mod fixture;

#[cfg(test)]
mod tests {
    use super::fixture::request;
    use anyset::compile::{compile_query, CompileOptions};
    use anyset::sql::{Dialect, ParamValue};
    use serde_json::json;

    #[test]
    fn test_single_category_filter() {
        let req = request(json!({
            "table_name": "t",
            "filters": [{"kind": "category", "column_name": "cat", "values": ["a"]}]
        }))
        .unwrap();
        let compiled = compile_query(&req, CompileOptions::default()).unwrap();

        insta::assert_snapshot!(compiled.sql, @r#"
        SELECT
          *
        FROM "t"
        WHERE "cat" IN (:p0)
        LIMIT 100 OFFSET 0
        "#);
        assert_eq!(compiled.params.names(), vec!["p0"]);
        assert_eq!(
            compiled.params.get("p0"),
            Some(&ParamValue::TextList(vec!["a".into()]))
        );
    }

    #[test]
    fn test_values_never_inlined() {
        let req = request(json!({
            "table_name": "t",
            "filters": [
                {"kind": "category", "column_name": "cat", "values": ["x'; DROP TABLE t; --"]},
                {"kind": "fact", "column_name": "fct", "min": 123456}
            ]
        }))
        .unwrap();
        let compiled = compile_query(&req, CompileOptions::default()).unwrap();
        assert!(!compiled.sql.contains("DROP"));
        assert!(!compiled.sql.contains("123456"));
        assert_eq!(compiled.params.len(), 2);
    }

    #[test]
    fn test_group_by_follows_projection() {
        let req = request(json!({
            "table_name": "t",
            "select": ["region", ["city", "c"]],
            "aggregations": [["fct", "AVG", "avg_fct"]],
            "breakdown": "cat"
        }))
        .unwrap();
        let compiled = compile_query(&req, CompileOptions::default()).unwrap();

        insta::assert_snapshot!(compiled.sql, @r#"
        SELECT
          "region" AS "region",
          "city" AS "c",
          AVG("fct") AS "avg_fct"
        FROM "t"
        GROUP BY "region", "c", "cat"
        LIMIT 100 OFFSET 0
        "#);
        assert_eq!(compiled.params.len(), 0);
    }

    #[test]
    fn test_order_by_aggregate_alias_not_grouped() {
        let req = request(json!({
            "table_name": "t",
            "select": ["cat"],
            "aggregations": [["fct", "SUM", "total"]],
            "order_by": [["total", "DESC"]]
        }))
        .unwrap();
        let compiled = compile_query(&req, CompileOptions::default()).unwrap();

        insta::assert_snapshot!(compiled.sql, @r#"
        SELECT
          "cat" AS "cat",
          SUM("fct") AS "total"
        FROM "t"
        GROUP BY "cat"
        ORDER BY "total" DESC
        LIMIT 100 OFFSET 0
        "#);
    }

    #[test]
    fn test_custom_aggregation_expands_definition() {
        let req = request(json!({"table_name": "t", "aggregations": [["ratio", "r"]]})).unwrap();
        let compiled = compile_query(&req, CompileOptions::default()).unwrap();
        assert!(compiled.sql.contains("SUM(fct) / COUNT(*) AS \"r\""));
        assert!(!compiled.sql.contains("GROUP BY"));
    }

    #[test]
    fn test_same_request_same_output() {
        let body = json!({
            "table_name": "t",
            "select": ["cat"],
            "filters": [
                {"kind": "category", "column_name": "region", "values": ["US", "EU"]},
                {"kind": "fact", "column_name": "fct", "min": 1, "max": 9}
            ],
            "order_by": [["cat", "DESC"]]
        });
        let first = compile_query(&request(body.clone()).unwrap(), CompileOptions::default()).unwrap();
        let second = compile_query(&request(body).unwrap(), CompileOptions::default()).unwrap();
        assert_eq!(first.sql, second.sql);
        assert_eq!(first.params, second.params);
    }

    #[test]
    fn test_dialect_placeholders() {
        let req = request(json!({
            "table_name": "t",
            "filters": [{"kind": "category", "column_name": "cat", "values": ["a", "b"]}]
        }))
        .unwrap();

        for dialect in [Dialect::Postgres, Dialect::DuckDb, Dialect::Snowflake] {
            let compiled = compile_query(&req, CompileOptions::default().with_dialect(dialect)).unwrap();
            assert_eq!(compiled.dialect, dialect);
            assert_eq!(compiled.params.len(), 1, "{}", dialect);
        }

        let duck = compile_query(&req, CompileOptions::default().with_dialect(Dialect::DuckDb)).unwrap();
        assert!(duck.sql.contains("IN ($p0)"));
    }
}
