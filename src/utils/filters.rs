//! Dynamic `WHERE` clause building for list queries.
//!
//! Services push optional conditions; each pushes its own numbered
//! placeholder, and the collected values are bound in the same order onto
//! both the count query and the data query.

use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use uuid::Uuid;

#[derive(Debug, Clone)]
enum FilterValue {
    Uuid(Uuid),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct SqlFilters {
    conditions: Vec<String>,
    values: Vec<FilterValue>,
}

impl SqlFilters {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// `column = $n` when `value` is present.
    pub fn eq_uuid<T: Into<Uuid>>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            let n = self.next_placeholder();
            self.conditions.push(format!("{} = ${}", column, n));
            self.values.push(FilterValue::Uuid(value.into()));
        }
        self
    }

    /// `column = $n::pg_type` for Postgres enum columns.
    pub fn eq_enum(&mut self, column: &str, pg_type: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            let n = self.next_placeholder();
            self.conditions
                .push(format!("{} = ${}::{}", column, n, pg_type));
            self.values.push(FilterValue::Text(value.to_string()));
        }
        self
    }

    /// `(a ILIKE $n OR b ILIKE $n ...)` with an already escaped pattern.
    pub fn search(&mut self, columns: &[&str], pattern: Option<String>) -> &mut Self {
        if let Some(pattern) = pattern
            && !columns.is_empty()
        {
            let n = self.next_placeholder();
            let any = columns
                .iter()
                .map(|c| format!("{} ILIKE ${}", c, n))
                .collect::<Vec<_>>()
                .join(" OR ");
            self.conditions.push(format!("({})", any));
            self.values.push(FilterValue::Text(pattern));
        }
        self
    }

    /// A condition without bound values.
    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    /// Number of placeholders used so far.
    pub fn bound(&self) -> usize {
        self.values.len()
    }

    /// ` WHERE ...`, or an empty string when no condition was pushed.
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn bind_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            query = match value {
                FilterValue::Uuid(id) => query.bind(*id),
                FilterValue::Text(text) => query.bind(text.clone()),
            };
        }
        query
    }

    pub fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    ) -> QueryScalar<'q, Postgres, O, PgArguments> {
        for value in &self.values {
            query = match value {
                FilterValue::Uuid(id) => query.bind(*id),
                FilterValue::Text(text) => query.bind(text.clone()),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters() {
        let filters = SqlFilters::new();
        assert_eq!(filters.where_sql(), "");
        assert_eq!(filters.bound(), 0);
    }

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        let mut filters = SqlFilters::new();
        filters
            .eq_uuid("s.class_id", Some(Uuid::nil()))
            .eq_uuid::<Uuid>("s.section_id", None)
            .search(&["s.first_name", "s.last_name"], Some("%ada%".to_string()))
            .eq_enum("sc.day", "day_of_week", Some("monday"))
            .raw("sc.status <> 'inactive'");

        assert_eq!(
            filters.where_sql(),
            " WHERE s.class_id = $1 AND (s.first_name ILIKE $2 OR s.last_name ILIKE $2) \
             AND sc.day = $3::day_of_week AND sc.status <> 'inactive'"
        );
        assert_eq!(filters.bound(), 3);
    }
}
