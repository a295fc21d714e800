#[path = "../common/fixture.rs"]
mod fixture;

#[cfg(test)]
mod tests {
    use super::fixture::{sales_dataset, sales_definition};
    use anyset::model::{
        AdapterKind, ColumnClassification, ColumnDataType, ColumnDefinition, Dataset, SchemaError,
    };

    #[test]
    fn test_classification_matches_declaration_exactly() {
        let dataset = sales_dataset();
        for table in dataset.tables() {
            for column in table.columns() {
                for classification in ColumnClassification::ALL {
                    let got = dataset
                        .is_column_classified_as(column.name(), classification, table.name())
                        .unwrap();
                    assert_eq!(
                        got,
                        classification == column.classification(),
                        "{}.{} as {}",
                        table.name(),
                        column.name(),
                        classification
                    );
                }
            }
        }
    }

    #[test]
    fn test_classification_by_name() {
        let dataset = sales_dataset();
        assert!(dataset.is_column_classified_as_named("fct", "Fact", "t").unwrap());
        assert!(!dataset.is_column_classified_as_named("fct", "Category", "t").unwrap());
        assert_eq!(
            dataset.is_column_classified_as_named("fct", "Measure", "t"),
            Err(SchemaError::UnknownClassification("Measure".into()))
        );
    }

    #[test]
    fn test_unknown_table_and_column() {
        let dataset = sales_dataset();
        assert_eq!(
            dataset.is_column_classified_as("cat", ColumnClassification::Category, "nope"),
            Err(SchemaError::UnknownTable("nope".into()))
        );
        assert_eq!(
            dataset.is_column_classified_as("ghost", ColumnClassification::Category, "t"),
            Err(SchemaError::UnknownColumn {
                table: "t".into(),
                column: "ghost".into()
            })
        );
    }

    #[test]
    fn test_columns_by_classification_keep_declaration_order() {
        let dataset = sales_dataset();
        assert_eq!(
            dataset.columns_classified_as(ColumnClassification::Category, "t").unwrap(),
            ["cat", "region", "city"]
        );
        assert_eq!(
            dataset.columns_classified_as(ColumnClassification::Fact, "t").unwrap(),
            ["fct"]
        );
        assert!(dataset.columns_classified_as(ColumnClassification::Fact, "x").is_err());
    }

    #[test]
    fn test_identity() {
        let dataset = sales_dataset();
        assert_eq!(dataset.id(), "dataset-sales-data");
        assert_eq!(dataset.key(), "sales/v1");
        assert_eq!(dataset.adapter(), AdapterKind::InMemory);
        assert_eq!(dataset.custom_aggregation("ratio"), Some("SUM(fct) / COUNT(*)"));
        assert_eq!(dataset.custom_aggregation("other"), None);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut def = sales_definition();
        def.tables[0].columns.push(ColumnDefinition {
            name: "cat".into(),
            classification: ColumnClassification::Other,
            data_type: ColumnDataType::String,
            description: None,
            parent: None,
        });
        assert_eq!(
            Dataset::bind(def),
            Err(SchemaError::DuplicateColumn {
                table: "t".into(),
                column: "cat".into()
            })
        );
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut def = sales_definition();
        def.tables[0].columns[3].parent = Some("country".into());
        assert!(matches!(
            Dataset::bind(def),
            Err(SchemaError::UnknownParentColumn { .. })
        ));
    }

    #[test]
    fn test_adapter_kind_names() {
        let kind: AdapterKind = serde_json::from_str("\"PostgreSQL\"").unwrap();
        assert_eq!(kind, AdapterKind::PostgreSql);
        let kind: AdapterKind = serde_json::from_str("\"Postgres\"").unwrap();
        assert_eq!(kind, AdapterKind::PostgreSql);
        assert!(serde_json::from_str::<AdapterKind>("\"Oracle\"").is_err());
    }
}
