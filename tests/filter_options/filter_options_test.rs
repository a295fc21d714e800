#[path = "../common/fixture.rs"]
mod fixture;

#[cfg(test)]
mod tests {
    use super::fixture::{loaded_adapter, sales_dataset};
    use anyset::filter_options::{
        collect_filter_options, derive_hierarchy, FilterOption, FilterOptionValue,
    };
    use anyset::storage::{CellValue, InMemoryAdapter};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn value(s: &str) -> FilterOptionValue<String> {
        FilterOptionValue {
            label: s.into(),
            value: s.into(),
        }
    }

    #[test]
    fn test_hierarchy_tree_first_seen_order() {
        let rows = vec![
            vec![text("US"), text("NY")],
            vec![text("US"), text("LA")],
            vec![text("EU"), text("Paris")],
            vec![text("US"), text("NY")],
        ];
        let option = derive_hierarchy("geo", &["region", "city"], &rows).unwrap();

        let FilterOption::Hierarchy { name, values } = option else {
            panic!("expected a hierarchy option");
        };
        assert_eq!(name, "geo");
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, "US");
        assert_eq!(values[1].value, "EU");
        assert_eq!(
            *values[0].children,
            FilterOption::Category {
                name: "city".into(),
                values: vec![value("NY"), value("LA")],
                parent_id: Some("US".into()),
            }
        );
        assert_eq!(
            *values[1].children,
            FilterOption::Category {
                name: "city".into(),
                values: vec![value("Paris")],
                parent_id: Some("EU".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_collect_from_adapter() {
        let dataset = sales_dataset();
        let adapter = loaded_adapter(dataset.clone());
        let options = collect_filter_options(&dataset, &adapter).await.unwrap();

        let names: Vec<&str> = options.iter().map(FilterOption::name).collect();
        assert_eq!(names, vec!["cat", "fct", "region", "city", "geo"]);

        assert_eq!(
            options[0],
            FilterOption::Category {
                name: "cat".into(),
                values: vec![value("a"), value("b"), value("c")],
                parent_id: None,
            }
        );
        assert_eq!(
            options[1],
            FilterOption::MinMax {
                name: "fct".into(),
                values: (
                    FilterOptionValue { label: "2.5".into(), value: 2.5 },
                    FilterOptionValue { label: "10".into(), value: 10.0 },
                ),
            }
        );
        assert!(matches!(&options[4], FilterOption::Hierarchy { values, .. } if values.len() == 2));
    }

    #[tokio::test]
    async fn test_empty_dataset() {
        let dataset = sales_dataset();
        let adapter = InMemoryAdapter::new(dataset.clone());
        let options = collect_filter_options(&dataset, &adapter).await.unwrap();

        // Categories list nothing, the fact has no range, the hierarchy is empty.
        let names: Vec<&str> = options.iter().map(FilterOption::name).collect();
        assert_eq!(names, vec!["cat", "region", "city", "geo"]);
        assert!(matches!(&options[3], FilterOption::Hierarchy { values, .. } if values.is_empty()));
    }
}
