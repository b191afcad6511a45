//! Listing query builder using SeaQuery.
//!
//! Generates Postgres SQL from a predicate list with support for:
//! - Equality, range and IN predicates
//! - Case-insensitive search across several columns
//! - Stable ordering and offset/limit pagination

use sea_query::extension::postgres::PgExpr;
use sea_query::{
    Alias, Asterisk, Cond, Expr, ExprTrait, Order, PostgresQueryBuilder, Query, SelectStatement,
    SimpleExpr, Value,
};

use super::paginator::PageWindow;
use super::types::{FilterValue, Predicate, QuerySort, SortDirection};

/// Query builder for one collection.
pub struct ListingQueryBuilder<'a> {
    collection: &'a str,
    predicates: &'a [Predicate],
    sorts: &'a [QuerySort],
}

impl<'a> ListingQueryBuilder<'a> {
    pub fn new(collection: &'a str, predicates: &'a [Predicate], sorts: &'a [QuerySort]) -> Self {
        Self {
            collection,
            predicates,
            sorts,
        }
    }

    /// Build the main SELECT query for one page.
    pub fn build(&self, window: PageWindow) -> String {
        let mut query = Query::select();

        query.column((Alias::new(self.collection), Asterisk));
        query.from(Alias::new(self.collection));

        self.add_filters(&mut query);
        self.add_sorts(&mut query);

        query.limit(window.limit);
        query.offset(window.offset);

        query.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query under the same predicates.
    pub fn build_count(&self) -> String {
        let mut query = Query::select();

        query.expr(Expr::col(Asterisk).count());
        query.from(Alias::new(self.collection));

        self.add_filters(&mut query);

        query.to_string(PostgresQueryBuilder)
    }

    /// Add WHERE conditions, one per predicate.
    fn add_filters(&self, query: &mut SelectStatement) {
        for predicate in self.predicates {
            query.and_where(self.build_condition(predicate));
        }
    }

    /// Build a single predicate condition.
    fn build_condition(&self, predicate: &Predicate) -> SimpleExpr {
        match predicate {
            Predicate::Equals { field, value } => self.column(field).eq(sql_value(value)),
            Predicate::GreaterOrEqual { field, value } => self.column(field).gte(sql_value(value)),
            Predicate::LessOrEqual { field, value } => self.column(field).lte(sql_value(value)),
            Predicate::In { field, values } => {
                if values.is_empty() {
                    // Nothing can match an empty set
                    return Expr::cust("FALSE");
                }
                self.column(field).is_in(values.iter().map(sql_value))
            }
            Predicate::Search { fields, term } => {
                let pattern = format!("%{}%", escape_like_wildcards(term));
                let mut any = Cond::any();
                for field in fields {
                    any = any.add(self.column(field).ilike(pattern.as_str()));
                }
                any.into()
            }
        }
    }

    fn column(&self, field: &str) -> Expr {
        Expr::col((Alias::new(self.collection), Alias::new(field)))
    }

    /// Add ORDER BY clauses.
    fn add_sorts(&self, query: &mut SelectStatement) {
        for sort in self.sorts {
            let order = match sort.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            query.order_by((Alias::new(self.collection), Alias::new(&sort.field)), order);
        }
    }
}

/// Convert a filter value to a bound SQL value.
fn sql_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::String(s) => s.clone().into(),
        FilterValue::Integer(i) => (*i).into(),
        FilterValue::Float(f) => (*f).into(),
        FilterValue::Boolean(b) => (*b).into(),
    }
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
pub(crate) fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
