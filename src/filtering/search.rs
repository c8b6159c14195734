use sea_orm::Condition;

use super::conditions::FilterContext;

/// Build the OR group for a free-text search.
///
/// Plain columns get a case-insensitive partial match; `relation.column`
/// entries match when any related row's column does. Returns `None` when
/// there is nothing to search, so the caller adds no clause at all.
#[must_use]
pub fn build_search_condition(
    term: &str,
    columns: &[String],
    ctx: &FilterContext<'_>,
) -> Option<Condition> {
    if term.is_empty() {
        return None;
    }

    let mut any = Condition::any();
    for column in columns {
        if let Some((relation, related_column)) = column.split_once('.') {
            let Some(scope) = ctx.relations.scope(relation, ctx.base) else {
                continue;
            };
            let matches = ctx.matcher.contains(scope.column(related_column), term);
            any = any.add(scope.exists(matches));
        } else {
            any = any.add(ctx.matcher.contains(ctx.column(column).into(), term));
        }
    }

    (!any.is_empty()).then_some(any)
}
