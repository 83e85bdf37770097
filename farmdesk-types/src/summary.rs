//! Derived figures for the dashboard, reports and assistant briefing.
//!
//! All functions are pure folds over record slices; none of them cache.

use crate::{ExpenseRecord, FarmSnapshot, HarvestRecord, IsoDate, Order, Period};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of most recent sales days shown in the sales trend.
pub const SALES_TREND_DAYS: usize = 15;

/// A labelled amount in a breakdown, e.g. revenue of one variety.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub name: String,
    pub value: f64,
}

/// Sums `value` per name, keeping names in first-seen order.
fn breakdown<'a>(items: impl Iterator<Item = (&'a str, f64)>) -> Vec<Breakdown> {
    let mut out: Vec<Breakdown> = Vec::new();
    for (name, value) in items {
        match out.iter_mut().find(|b| b.name == name) {
            Some(entry) => entry.value += value,
            None => out.push(Breakdown {
                name: name.to_string(),
                value,
            }),
        }
    }
    out
}

/// Whole-farm totals across a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FarmTotals {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub total_harvest_kg: f64,
    pub total_work_hours: f64,
}

impl FarmTotals {
    pub fn from_snapshot(snapshot: &FarmSnapshot) -> Self {
        let total_revenue = snapshot.orders.iter().map(Order::revenue).sum::<f64>();
        let total_expenses = snapshot.expenses.iter().map(|e| e.amount).sum::<f64>();
        Self {
            total_revenue,
            total_expenses,
            net_profit: total_revenue - total_expenses,
            total_harvest_kg: snapshot.harvests.iter().map(|h| h.weight).sum(),
            total_work_hours: snapshot.work_records.iter().map(|w| w.hours_worked).sum(),
        }
    }
}

/// Financial report over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub period: String,
    pub order_count: usize,
    pub expense_count: usize,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub revenue_by_variety: Vec<Breakdown>,
    pub expenses_by_category: Vec<Breakdown>,
}

impl PeriodReport {
    pub fn compute(orders: &[Order], expenses: &[ExpenseRecord], period: Period) -> Self {
        let orders: Vec<&Order> = orders.iter().filter(|o| period.contains(&o.date)).collect();
        let expenses: Vec<&ExpenseRecord> = expenses
            .iter()
            .filter(|e| period.contains(&e.date))
            .collect();

        let total_revenue = orders.iter().map(|o| o.revenue()).sum::<f64>();
        let total_expenses = expenses.iter().map(|e| e.amount).sum::<f64>();

        Self {
            period: period.to_string(),
            order_count: orders.len(),
            expense_count: expenses.len(),
            total_revenue,
            total_expenses,
            net_profit: total_revenue - total_expenses,
            revenue_by_variety: breakdown(orders.iter().map(|o| (o.variety(), o.revenue()))),
            expenses_by_category: breakdown(
                expenses.iter().map(|e| (e.category_name(), e.amount)),
            ),
        }
    }
}

/// Sales aggregated over one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: IsoDate,
    pub revenue: f64,
    pub weight: f64,
}

/// Per-day revenue and weight, oldest first, limited to the last `days`
/// days that had any sales.
pub fn sales_trend(orders: &[Order], days: usize) -> Vec<DailySales> {
    let mut by_day: BTreeMap<IsoDate, DailySales> = BTreeMap::new();
    for order in orders {
        let entry = by_day.entry(order.date).or_insert_with(|| DailySales {
            date: order.date,
            revenue: 0.0,
            weight: 0.0,
        });
        entry.revenue += order.revenue();
        entry.weight += order.weight;
    }
    let skip = by_day.len().saturating_sub(days);
    by_day.into_values().skip(skip).collect()
}

/// Harvested kilograms per variety, in first-seen order.
pub fn harvest_by_variety(harvests: &[HarvestRecord]) -> Vec<Breakdown> {
    breakdown(harvests.iter().map(|h| (h.variety(), h.weight)))
}

/// Kilograms harvested on `date`.
pub fn harvest_on(harvests: &[HarvestRecord], date: IsoDate) -> f64 {
    harvests
        .iter()
        .filter(|h| h.date == date)
        .map(|h| h.weight)
        .sum()
}

/// Years that have orders or expenses, newest first. Falls back to
/// `current_year` when there is no data at all.
pub fn available_years(orders: &[Order], expenses: &[ExpenseRecord], current_year: i32) -> Vec<i32> {
    let mut years: Vec<i32> = orders
        .iter()
        .map(|o| o.date.year())
        .chain(expenses.iter().map(|e| e.date.year()))
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    if years.is_empty() {
        years.push(current_year);
    }
    years
}
