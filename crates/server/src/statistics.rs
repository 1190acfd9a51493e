//! Dashboard statistics endpoints

use api_types::{
    chart::{ChartMonth, ChartQuery, MonthlyChart},
    summary::Summary,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Datelike;
use engine::{
    format::{MonthStyle, format_idr, month_name},
    views,
};

use crate::server::ServerState;

/// Total balance plus income and expense of the current month.
pub async fn summary(State(state): State<ServerState>) -> Json<Summary> {
    let now = (state.clock)();
    let local = now.with_timezone(&state.timezone);

    let ledger = state.ledger.current();
    let totals = views::current_month_totals(ledger.transactions(), now, state.timezone);
    let total = ledger.total_balance();

    Json(Summary {
        total_balance: total.value(),
        total_balance_label: format_idr(total),
        month_label: format!(
            "{} {}",
            month_name(local.month0(), MonthStyle::Full),
            local.year()
        ),
        income: totals.income.value(),
        income_label: format_idr(totals.income),
        expense: totals.expense.value(),
        expense_label: format_idr(totals.expense),
    })
}

pub async fn chart(
    State(state): State<ServerState>,
    Query(query): Query<ChartQuery>,
) -> Json<MonthlyChart> {
    let year = query
        .year
        .unwrap_or_else(|| (state.clock)().with_timezone(&state.timezone).year());

    let ledger = state.ledger.current();
    let months = views::aggregate_monthly(ledger.transactions(), year, state.timezone)
        .iter()
        .map(|bucket| ChartMonth {
            month: bucket.month0,
            label: month_name(bucket.month0, MonthStyle::Short).to_string(),
            income: bucket.income.value(),
            expense: bucket.expense.value(),
        })
        .collect();

    Json(MonthlyChart { year, months })
}
