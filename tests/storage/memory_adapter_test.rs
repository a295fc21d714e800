#[path = "../common/fixture.rs"]
mod fixture;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::fixture::{loaded_adapter, request, sales_dataset, sales_rows};
    use anyset::compile::{compile_query, CompileOptions, CompiledQuery};
    use anyset::storage::{
        ColumnData, ColumnRef, ConnectionGate, InMemoryAdapter, StorageError, StoragePort,
    };
    use futures::TryStreamExt;
    use serde_json::json;

    fn compiled(body: serde_json::Value) -> CompiledQuery {
        compile_query(&request(body).unwrap(), CompileOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_filters_and_select_star() {
        let adapter = loaded_adapter(sales_dataset());
        let query = compiled(json!({
            "table_name": "t",
            "filters": [
                {"kind": "category", "column_name": "cat", "values": ["a"]},
                {"kind": "fact", "column_name": "fct", "min": 5}
            ]
        }));
        let result = adapter.execute_query(&query).await.unwrap();

        assert_eq!(result.rows(), 1);
        assert_eq!(result.columns().len(), 6);
        assert_eq!(
            result.column("city").unwrap().data,
            ColumnData::String(vec![Some("NY".into())])
        );
        assert_eq!(result.dataset(), sales_dataset().id());
        assert_eq!(result.version(), 1);
    }

    #[tokio::test]
    async fn test_grouped_aggregation_ordered() {
        let adapter = loaded_adapter(sales_dataset());
        let query = compiled(json!({
            "table_name": "t",
            "select": ["cat"],
            "aggregations": [["fct", "SUM", "total"]],
            "order_by": [["total", "DESC"]]
        }));
        let result = adapter.execute_query(&query).await.unwrap();

        // Nulls sort last ascending, so first descending.
        assert_eq!(
            result.column("cat").unwrap().data,
            ColumnData::String(vec![Some("c".into()), Some("a".into()), Some("b".into())])
        );
        assert_eq!(
            result.column("total").unwrap().data,
            ColumnData::Number(vec![None, Some(12.5), Some(12.0)])
        );
    }

    #[tokio::test]
    async fn test_aggregation_without_grouping_yields_one_row() {
        let adapter = loaded_adapter(sales_dataset());
        let query = compiled(json!({
            "table_name": "t",
            "aggregations": [["fct", "COUNT", "n"], ["fct", "MAX", "top"]]
        }));
        let result = adapter.execute_query(&query).await.unwrap();
        assert_eq!(result.rows(), 1);
        assert_eq!(result.column("n").unwrap().data, ColumnData::Number(vec![Some(4.0)]));
        assert_eq!(result.column("top").unwrap().data, ColumnData::Number(vec![Some(10.0)]));

        let nothing = compiled(json!({
            "table_name": "t",
            "filters": [{"kind": "category", "column_name": "cat", "values": ["zzz"]}],
            "aggregations": [["fct", "COUNT", "n"]]
        }));
        let result = adapter.execute_query(&nothing).await.unwrap();
        assert_eq!(result.column("n").unwrap().data, ColumnData::Number(vec![Some(0.0)]));
    }

    #[tokio::test]
    async fn test_pagination_after_ordering() {
        let adapter = loaded_adapter(sales_dataset());
        let query = compiled(json!({
            "table_name": "t",
            "select": ["cat", "fct"],
            "order_by": [["fct", "ASC"]],
            "pagination": {"limit": 2, "offset": 1}
        }));
        let result = adapter.execute_query(&query).await.unwrap();
        assert_eq!(
            result.column("fct").unwrap().data,
            ColumnData::Number(vec![Some(5.0), Some(7.0)])
        );
        assert_eq!(
            result.column("cat").unwrap().data,
            ColumnData::String(vec![Some("b".into()), Some("b".into())])
        );
    }

    #[tokio::test]
    async fn test_custom_aggregation_unsupported() {
        let adapter = loaded_adapter(sales_dataset());
        let query = compiled(json!({"table_name": "t", "aggregations": [["ratio", "r"]]}));
        let err = adapter.execute_query(&query).await.unwrap_err();
        assert!(matches!(err, StorageError::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_rejects_query_for_other_dataset() {
        let mut definition = super::fixture::sales_definition();
        definition.version = 2;
        let other = Arc::new(anyset::model::Dataset::bind(definition).unwrap());
        let adapter = InMemoryAdapter::new(other);

        let err = adapter
            .execute_query(&compiled(json!({"table_name": "t"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::QueryFailed { ref dataset, .. } if dataset == "sales/v2"));
    }

    #[tokio::test]
    async fn test_pool_exhaustion() {
        let gate = ConnectionGate::new(1, Duration::from_millis(20));
        let mut adapter = InMemoryAdapter::with_gate(sales_dataset(), gate.clone());
        adapter.insert_json_rows("t", &sales_rows()).unwrap();

        let held = gate.acquire().await.unwrap();
        let err = adapter
            .execute_query(&compiled(json!({"table_name": "t"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::PoolExhausted { .. }));
        assert!(err.is_retryable());

        drop(held);
        assert!(adapter.execute_query(&compiled(json!({"table_name": "t"}))).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_cancels() {
        let adapter = loaded_adapter(sales_dataset());
        adapter.close();
        let err = adapter
            .execute_query(&compiled(json!({"table_name": "t"})))
            .await
            .unwrap_err();
        assert_eq!(err, StorageError::Cancelled);
    }

    #[tokio::test]
    async fn test_raw_filter_data() {
        let adapter = loaded_adapter(sales_dataset());
        let rows: Vec<_> = adapter
            .fetch_raw_filter_data(&[ColumnRef::new("t", "region"), ColumnRef::new("t", "cat")])
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 2));

        let none: Vec<_> = adapter
            .fetch_raw_filter_data(&[])
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_insert_rejects_unknown_column() {
        let mut adapter = InMemoryAdapter::new(sales_dataset());
        let row = json!({"cat": "a", "bogus": 1});
        let err = adapter
            .insert_json_rows("t", &[row.as_object().unwrap().clone()])
            .unwrap_err();
        assert!(matches!(err, StorageError::MalformedResult(_)));
        assert_eq!(adapter.row_count("t"), 0);
    }
}
