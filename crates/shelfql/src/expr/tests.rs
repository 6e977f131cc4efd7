use super::*;
use crate::error::QueryError;
use crate::schema::SchemaRegistry;

#[test]
fn case_with_else_and_alias() {
    let sql = CaseExpr::new()
        .when("age > 18", "'Adult'")
        .else_value("'Minor'")
        .alias("category")
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "CASE WHEN age > 18 THEN 'Adult' ELSE 'Minor' END AS \"category\""
    );
}

#[test]
fn case_multiple_arms_no_else() {
    let sql = CaseExpr::new()
        .when("price < 100", "'cheap'")
        .when("price < 500", "'mid'")
        .build()
        .unwrap();
    assert_eq!(
        sql,
        "CASE WHEN price < 100 THEN 'cheap' WHEN price < 500 THEN 'mid' END"
    );
}

#[test]
fn case_skips_half_filled_pairs() {
    let sql = CaseExpr::new()
        .when("", "'orphan then'")
        .when("available", "")
        .when("available", "'yes'")
        .build()
        .unwrap();
    assert_eq!(sql, "CASE WHEN available THEN 'yes' END");
}

#[test]
fn case_without_pairs_is_incomplete() {
    let err = CaseExpr::new().build().unwrap_err();
    assert!(err.is_incomplete());

    // All pairs blank behaves the same as no pairs.
    let err = CaseExpr::new().when("", "").build().unwrap_err();
    assert!(err.is_incomplete());
}

#[test]
fn case_sanitizes_when_condition() {
    let err = CaseExpr::new()
        .when("1=1; DROP TABLE Books", "'x'")
        .build()
        .unwrap_err();
    assert!(matches!(err, QueryError::UnsafeClause(_)));
}

#[test]
fn coalesce_basic() {
    let sql = build_coalesce("return_date", "'not returned'", Some("returned")).unwrap();
    assert_eq!(
        sql,
        "COALESCE(\"return_date\", 'not returned') AS \"returned\""
    );
}

#[test]
fn coalesce_without_alias() {
    let sql = build_coalesce("phone", "'—', 'n/a'", None).unwrap();
    assert_eq!(sql, "COALESCE(\"phone\", '—', 'n/a')");
}

#[test]
fn coalesce_requires_fallbacks() {
    assert!(build_coalesce("phone", "   ", None).unwrap_err().is_incomplete());
}

#[test]
fn coalesce_rejects_bad_column() {
    assert!(matches!(
        build_coalesce("bad column", "'x'", None),
        Err(QueryError::Identifier(_))
    ));
}

#[test]
fn nullif_basic() {
    let sql = build_nullif("discount_percent", "0", Some("real_discount")).unwrap();
    assert_eq!(
        sql,
        "NULLIF(\"discount_percent\", 0) AS \"real_discount\""
    );
}

#[test]
fn rank_query() {
    let registry = SchemaRegistry::library_rental();
    let sql = WindowQuery::new(WindowKind::Rank, "Books", "price", SortDir::Desc)
        .partition_by("genre")
        .build(&registry)
        .unwrap();
    assert_eq!(
        sql,
        "SELECT *, RANK() OVER (PARTITION BY \"genre\" ORDER BY \"price\" DESC) AS rank_value FROM \"Books\""
    );
}

#[test]
fn lag_query_with_default() {
    let registry = SchemaRegistry::library_rental();
    let sql = WindowQuery::new(WindowKind::Lag, "Books", "price", SortDir::Asc)
        .offset(2)
        .default_literal("0")
        .build(&registry)
        .unwrap();
    assert_eq!(
        sql,
        "SELECT *, LAG(\"price\", 2, 0) OVER (ORDER BY \"price\" ASC) AS lag_value FROM \"Books\""
    );
}

#[test]
fn lead_query_default_offset() {
    let sql = WindowQuery::new(WindowKind::Lead, "Readers", "registered_on", SortDir::Asc)
        .build_unchecked()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT *, LEAD(\"registered_on\", 1) OVER (ORDER BY \"registered_on\" ASC) AS lead_value FROM \"Readers\""
    );
}

#[test]
fn lag_rejects_zero_offset() {
    let err = WindowQuery::new(WindowKind::Lag, "Books", "price", SortDir::Asc)
        .offset(0)
        .build_unchecked()
        .unwrap_err();
    assert!(err.is_incomplete());
}

#[test]
fn window_checks_table_and_columns() {
    let registry = SchemaRegistry::library_rental();
    assert!(matches!(
        WindowQuery::new(WindowKind::Rank, "Magazines", "price", SortDir::Asc).build(&registry),
        Err(QueryError::UnknownTable(_))
    ));
    assert!(matches!(
        WindowQuery::new(WindowKind::Rank, "Books", "weight", SortDir::Asc).build(&registry),
        Err(QueryError::UnknownColumn { .. })
    ));
}
