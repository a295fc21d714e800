#[path = "../common/fixture.rs"]
mod fixture;

#[cfg(test)]
mod tests {
    use super::fixture::{sales_dataset, sales_definition};
    use anyset::model::{
        ColumnClassification, Dataset, HierarchyColumnFault, HierarchyLevel, SchemaError,
    };

    #[test]
    fn test_declared_hierarchy_binds() {
        let dataset = sales_dataset();
        let geo = &dataset.hierarchies()[0];
        assert_eq!(geo.name, "geo");
        assert_eq!(geo.column_names(), vec!["region", "city"]);
    }

    #[test]
    fn test_fact_level_rejected_at_bind() {
        let mut def = sales_definition();
        def.category_hierarchies[0].levels.push(HierarchyLevel::new("t", "fct"));
        assert_eq!(
            Dataset::bind(def),
            Err(SchemaError::InvalidHierarchyColumn {
                hierarchy: "geo".into(),
                table: "t".into(),
                column: "fct".into(),
                reason: HierarchyColumnFault::NotCategory(ColumnClassification::Fact),
            })
        );
    }

    #[test]
    fn test_missing_table_and_column_rejected() {
        let mut def = sales_definition();
        def.category_hierarchies[0].levels[0] = HierarchyLevel::new("nope", "region");
        assert!(matches!(
            Dataset::bind(def),
            Err(SchemaError::InvalidHierarchyColumn {
                reason: HierarchyColumnFault::MissingTable,
                ..
            })
        ));

        let mut def = sales_definition();
        def.category_hierarchies[0].levels[1] = HierarchyLevel::new("t", "district");
        assert!(matches!(
            Dataset::bind(def),
            Err(SchemaError::InvalidHierarchyColumn {
                reason: HierarchyColumnFault::MissingColumn,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_hierarchy_rejected() {
        let mut def = sales_definition();
        def.category_hierarchies[0].levels.clear();
        assert_eq!(
            Dataset::bind(def),
            Err(SchemaError::EmptyHierarchy("geo".into()))
        );
        assert_eq!(
            SchemaError::EmptyHierarchy("geo".into()).to_string(),
            "hierarchy 'geo' has no levels"
        );
    }

    #[test]
    fn test_levels_across_tables_rejected() {
        let mut def = sales_definition();
        let mut cities = def.tables[0].clone();
        cities.name = "cities".into();
        def.tables.push(cities);
        def.category_hierarchies[0].levels[1] = HierarchyLevel::new("cities", "city");

        assert_eq!(
            Dataset::bind(def),
            Err(SchemaError::InvalidHierarchyColumn {
                hierarchy: "geo".into(),
                table: "cities".into(),
                column: "city".into(),
                reason: HierarchyColumnFault::TableMismatch("t".into()),
            })
        );
    }
}
