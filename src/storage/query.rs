// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Row queries: a table, column filters, ordering and a limit.
//!
//! The same [`Query`] is evaluated in process by the memory backend and
//! rendered to PostgREST query parameters by the REST backend.

use std::cmp::Ordering;

use serde_json::Value;

use super::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lte,
    Gte,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    filters: Vec<Filter>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn table(name: &str) -> Self {
        Self {
            table: name.to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    fn filter(mut self, column: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value,
        });
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value.into())
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value.into())
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value.into())
    }

    pub fn one_of<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(column, FilterOp::In, Value::Array(values))
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Whether `row` satisfies every filter.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|filter| {
            let cell = row.get(&filter.column).unwrap_or(&Value::Null);
            match filter.op {
                FilterOp::Eq => cell == &filter.value,
                FilterOp::Lte => matches!(
                    compare(cell, &filter.value),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                FilterOp::Gte => matches!(
                    compare(cell, &filter.value),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                FilterOp::In => match &filter.value {
                    Value::Array(values) => values.contains(cell),
                    _ => false,
                },
            }
        })
    }

    /// Sort and truncate already-filtered rows.
    pub fn arrange(&self, rows: &mut Vec<Row>) {
        if !self.order.is_empty() {
            rows.sort_by(|a, b| {
                for (column, direction) in &self.order {
                    let left = a.get(column).unwrap_or(&Value::Null);
                    let right = b.get(column).unwrap_or(&Value::Null);
                    let ordering = match (left.is_null(), right.is_null()) {
                        (true, true) => Ordering::Equal,
                        // nulls last, both directions
                        (true, false) => return Ordering::Greater,
                        (false, true) => return Ordering::Less,
                        (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
                    };
                    let ordering = match direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
    }

    /// PostgREST query parameters (`column=op.value`, `order`, `limit`).
    pub fn postgrest_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|filter| {
                let rendered = match (filter.op, &filter.value) {
                    (FilterOp::Eq, Value::Null) => "is.null".to_string(),
                    (FilterOp::Eq, value) => format!("eq.{}", scalar(value)),
                    (FilterOp::Lte, value) => format!("lte.{}", scalar(value)),
                    (FilterOp::Gte, value) => format!("gte.{}", scalar(value)),
                    (FilterOp::In, Value::Array(values)) => {
                        let items: Vec<String> = values.iter().map(list_item).collect();
                        format!("in.({})", items.join(","))
                    }
                    (FilterOp::In, value) => format!("in.({})", list_item(value)),
                };
                (filter.column.clone(), rendered)
            })
            .collect();

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(column, direction)| match direction {
                    Direction::Asc => format!("{column}.asc"),
                    Direction::Desc => format!("{column}.desc"),
                })
                .collect();
            params.push(("order".to_string(), order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_item(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => other.to_string(),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn renders_postgrest_params() {
        let query = Query::table("user_meal_plan")
            .eq("is_active", true)
            .lte("start_date", "2025-01-15")
            .gte("end_date", "2025-01-15")
            .one_of("meal_type_id", [1, 2])
            .order_by("id", Direction::Desc)
            .limit(1);

        assert_eq!(
            query.postgrest_params(),
            vec![
                ("is_active".to_string(), "eq.true".to_string()),
                ("start_date".to_string(), "lte.2025-01-15".to_string()),
                ("end_date".to_string(), "gte.2025-01-15".to_string()),
                ("meal_type_id".to_string(), "in.(1,2)".to_string()),
                ("order".to_string(), "id.desc".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn string_lists_are_quoted() {
        let query = Query::table("user_profiles").one_of("id", ["a", "b,c"]);
        assert_eq!(
            query.postgrest_params(),
            vec![("id".to_string(), r#"in.("a","b,c")"#.to_string())]
        );
    }

    #[test]
    fn filters_match_rows() {
        let query = Query::table("t")
            .eq("active", true)
            .gte("date", "2025-01-01")
            .lte("date", "2025-01-31");

        assert!(query.matches(&row(json!({"active": true, "date": "2025-01-15"}))));
        assert!(!query.matches(&row(json!({"active": false, "date": "2025-01-15"}))));
        assert!(!query.matches(&row(json!({"active": true, "date": "2025-02-01"}))));
        assert!(!query.matches(&row(json!({"active": true}))));
    }

    #[test]
    fn in_filter_matches_members() {
        let query = Query::table("t").one_of("id", [1, 3]);
        assert!(query.matches(&row(json!({"id": 3}))));
        assert!(!query.matches(&row(json!({"id": 2}))));
    }

    #[test]
    fn arrange_orders_with_nulls_last_and_limits() {
        let query = Query::table("t").order_by("rank", Direction::Asc).limit(3);
        let mut rows = vec![
            row(json!({"rank": 3})),
            row(json!({"rank": null})),
            row(json!({"rank": 1})),
            row(json!({"rank": 2})),
        ];
        query.arrange(&mut rows);
        let ranks: Vec<&Value> = rows.iter().map(|r| &r["rank"]).collect();
        assert_eq!(ranks, vec![&json!(1), &json!(2), &json!(3)]);

        let desc = Query::table("t").order_by("rank", Direction::Desc);
        let mut rows = vec![row(json!({"rank": 1})), row(json!({"rank": 2}))];
        desc.arrange(&mut rows);
        assert_eq!(rows[0]["rank"], json!(2));
    }
}
