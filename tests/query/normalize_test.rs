#[path = "../common/fixture.rs"]
mod fixture;

#[cfg(test)]
mod tests {
    use super::fixture::{request, wire};
    use anyset::query::{
        normalize, Aggregation, AggregationFunction, CategoryFilter, FactFilter, Filter, OrderBy,
        SelectItem,
    };
    use anyset::sql::SortDir;
    use serde_json::json;

    #[test]
    fn test_bare_select_equivalent_to_object() {
        let bare = request(json!({"table_name": "t", "select": ["cat"]})).unwrap();
        let object = request(json!({
            "table_name": "t",
            "select": [{"column_name": "cat", "alias": "cat"}]
        }))
        .unwrap();
        assert_eq!(bare.select(), object.select());
        assert_eq!(bare.group_by(), object.group_by());
    }

    #[test]
    fn test_every_select_shape() {
        let n = normalize(wire(json!({
            "table_name": "t",
            "select": ["cat", ["fct", "f"], {"column_name": "region"}, {"column_name": "city", "alias": "c"}]
        })))
        .unwrap();
        let item = |column: &str, alias: &str| SelectItem {
            column: column.into(),
            alias: alias.into(),
        };
        assert_eq!(
            n.select,
            vec![
                item("cat", "cat"),
                item("fct", "f"),
                item("region", "region"),
                item("city", "c")
            ]
        );
    }

    #[test]
    fn test_every_aggregation_shape() {
        let n = normalize(wire(json!({
            "table_name": "t",
            "aggregations": [
                ["fct", "sum", "total"],
                ["ratio", "r"],
                {"column_name": "fct", "aggregation_function": "MEDIAN", "alias": "m"},
                {"function_name": "ratio", "alias": "r2"}
            ]
        })))
        .unwrap();
        assert_eq!(
            n.aggregations,
            vec![
                Aggregation::Standard {
                    column: "fct".into(),
                    function: AggregationFunction::Sum,
                    alias: "total".into()
                },
                Aggregation::Custom {
                    function: "ratio".into(),
                    alias: "r".into()
                },
                Aggregation::Standard {
                    column: "fct".into(),
                    function: AggregationFunction::Median,
                    alias: "m".into()
                },
                Aggregation::Custom {
                    function: "ratio".into(),
                    alias: "r2".into()
                },
            ]
        );
    }

    #[test]
    fn test_order_by_shapes() {
        let n = normalize(wire(json!({
            "table_name": "t",
            "order_by": [["cat", "desc"], {"column_name": "fct", "direction": "ASC"}, {"column_name": "region"}]
        })))
        .unwrap();
        assert_eq!(
            n.order_by,
            vec![
                OrderBy { column: "cat".into(), direction: SortDir::Desc },
                OrderBy { column: "fct".into(), direction: SortDir::Asc },
                OrderBy { column: "region".into(), direction: SortDir::Asc },
            ]
        );
    }

    #[test]
    fn test_pagination_shapes() {
        let pair = normalize(wire(json!({"table_name": "t", "pagination": [30, 10]}))).unwrap();
        assert_eq!((pair.offset, pair.limit), (30, 10));

        let object = normalize(wire(json!({"table_name": "t", "pagination": {"offset": 5}}))).unwrap();
        assert_eq!((object.offset, object.limit), (5, 100));
    }

    #[test]
    fn test_filter_shapes() {
        let n = normalize(wire(json!({
            "table_name": "t",
            "filters": [
                {"kind": "category", "column_name": "cat", "values": ["a", "a", "b"]},
                {"kind": "QueryRequestFilterFact", "column_name": "fct", "values": [1, null]},
                {"kind": "fact", "column_name": "fct", "max": 9}
            ]
        })))
        .unwrap();
        assert_eq!(
            n.filters,
            vec![
                Filter::Category(CategoryFilter {
                    column: "cat".into(),
                    values: vec!["a".into(), "b".into()]
                }),
                Filter::Fact(FactFilter { column: "fct".into(), min: Some(1.0), max: None }),
                Filter::Fact(FactFilter { column: "fct".into(), min: None, max: Some(9.0) }),
            ]
        );
    }

    #[test]
    fn test_breakdown_carried() {
        let req = request(json!({"table_name": "t", "select": ["cat"], "breakdown": "region"})).unwrap();
        assert_eq!(req.breakdown(), Some("region"));
        assert_eq!(req.group_by(), ["cat", "region"]);
    }
}
