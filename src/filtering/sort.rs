use sea_orm::{EntityTrait, Order, QueryOrder, Select, sea_query::SimpleExpr};

use super::conditions::FilterContext;
use crate::config::ParamNames;
use crate::models::DataTableRequest;

/// A whitelisted sort request.
#[derive(Debug, Clone, PartialEq)]
pub enum SortDirective {
    /// Sort by a column of the base entity.
    Column { column: String, order: Order },
    /// Sort by a column of a related record (`relation.column`).
    Related {
        relation: String,
        column: String,
        order: Order,
    },
}

/// `desc` in any case sorts descending; anything else, or nothing, ascending.
#[must_use]
pub fn parse_order(direction: Option<&str>) -> Order {
    match direction {
        Some(direction) if direction.eq_ignore_ascii_case("desc") => Order::Desc,
        _ => Order::Asc,
    }
}

/// Read the sort column and direction from the request.
///
/// Returns `None` when no column is requested or when the column is not in
/// `sortable`; the query then keeps whatever order the storage layer gives.
#[must_use]
pub fn parse_sort(
    request: &DataTableRequest,
    names: &ParamNames,
    sortable: &[String],
) -> Option<SortDirective> {
    let column = request.first_filled(&names.sort_column)?;
    if !sortable.iter().any(|allowed| allowed == column) {
        tracing::debug!(column, "Sort column is not sortable, ignoring");
        return None;
    }
    let order = parse_order(request.get(&names.sort_direction));

    let directive = match column.split_once('.') {
        Some((relation, related_column)) => SortDirective::Related {
            relation: relation.to_string(),
            column: related_column.to_string(),
            order,
        },
        None => SortDirective::Column {
            column: column.to_string(),
            order,
        },
    };
    Some(directive)
}

/// Add the ordering for `directive` to `select`.
///
/// Related columns are ordered by a correlated subquery projecting the related
/// value; a relation that was never registered leaves the query unsorted.
pub fn apply_sort<E: EntityTrait>(
    select: Select<E>,
    directive: &SortDirective,
    ctx: &FilterContext<'_>,
) -> Select<E> {
    match directive {
        SortDirective::Column { column, order } => {
            select.order_by(SimpleExpr::from(ctx.column(column)), order.clone())
        }
        SortDirective::Related {
            relation,
            column,
            order,
        } => match ctx.relations.scope(relation, ctx.base) {
            Some(scope) => select.order_by(scope.projected(column), order.clone()),
            None => select,
        },
    }
}
