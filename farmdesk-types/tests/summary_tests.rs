use farmdesk_types::summary::{
    available_years, harvest_by_variety, harvest_on, sales_trend, FarmTotals, PeriodReport,
};
use farmdesk_types::{
    ExpenseCategory, ExpenseRecord, FarmSnapshot, GreenhouseNumber, HarvestRecord, IsoDate, Order,
    OrderStatus, PaymentStatus, Period, RecordId, Task, VegetableType, WorkRecord,
};

fn date(s: &str) -> IsoDate {
    IsoDate::parse(s).unwrap()
}

fn order(day: &str, vegetable: VegetableType, weight: f64, price: f64) -> Order {
    Order {
        id: RecordId::new(),
        date: date(day),
        vegetable_type: vegetable,
        other_vegetable: None,
        weight,
        price,
        order_status: OrderStatus::Completed,
        payment_status: PaymentStatus::Paid,
    }
}

fn expense(day: &str, category: ExpenseCategory, amount: f64) -> ExpenseRecord {
    ExpenseRecord {
        id: RecordId::new(),
        date: date(day),
        category,
        other_category: None,
        description: String::new(),
        amount,
    }
}

fn harvest(day: &str, vegetable: VegetableType, weight: f64) -> HarvestRecord {
    HarvestRecord {
        id: RecordId::new(),
        date: date(day),
        greenhouse_number: GreenhouseNumber::new(1).unwrap(),
        vegetable_type: vegetable,
        other_vegetable: None,
        weight,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── FarmTotals ──────────────────────────────────────────────────

#[test]
fn totals_over_snapshot() {
    let snapshot = FarmSnapshot {
        harvests: vec![
            harvest("2025-07-01", VegetableType::Cucumber, 10.0),
            harvest("2025-07-02", VegetableType::Tomato, 5.5),
        ],
        work_records: vec![WorkRecord {
            id: RecordId::new(),
            date: date("2025-07-01"),
            greenhouse_number: GreenhouseNumber::new(2).unwrap(),
            task: Task::Water,
            other_task: None,
            hours_worked: 4.0,
        }],
        orders: vec![
            order("2025-07-30", VegetableType::Cucumber, 38.9, 230.0),
            order("2025-07-27", VegetableType::Cucumber, 35.3, 250.0),
        ],
        expenses: vec![expense("2025-07-05", ExpenseCategory::Seeds, 1000.0)],
    };

    let totals = FarmTotals::from_snapshot(&snapshot);
    assert!(approx(totals.total_revenue, 8947.0 + 8825.0));
    assert!(approx(totals.total_expenses, 1000.0));
    assert!(approx(totals.net_profit, 17772.0 - 1000.0));
    assert!(approx(totals.total_harvest_kg, 15.5));
    assert!(approx(totals.total_work_hours, 4.0));
}

#[test]
fn totals_of_empty_snapshot_are_zero() {
    let totals = FarmTotals::from_snapshot(&FarmSnapshot::default());
    assert_eq!(totals.total_revenue, 0.0);
    assert_eq!(totals.net_profit, 0.0);
}

// ── PeriodReport ────────────────────────────────────────────────

#[test]
fn report_filters_by_year_month() {
    let orders = vec![
        order("2025-07-30", VegetableType::Cucumber, 38.9, 230.0),
        order("2025-07-20", VegetableType::Tomato, 10.0, 100.0),
        order("2025-08-03", VegetableType::Cucumber, 32.5, 170.0),
    ];
    let expenses = vec![
        expense("2025-07-02", ExpenseCategory::Seeds, 500.0),
        expense("2025-07-09", ExpenseCategory::Seeds, 250.0),
        expense("2025-07-10", ExpenseCategory::Labor, 1000.0),
        expense("2024-07-10", ExpenseCategory::Labor, 9999.0),
    ];

    let report = PeriodReport::compute(&orders, &expenses, "2025-07".parse().unwrap());
    assert_eq!(report.period, "2025-07");
    assert_eq!(report.order_count, 2);
    assert_eq!(report.expense_count, 3);
    assert!(approx(report.total_revenue, 8947.0 + 1000.0));
    assert!(approx(report.total_expenses, 1750.0));
    assert!(approx(report.net_profit, 9947.0 - 1750.0));

    let names: Vec<&str> = report.revenue_by_variety.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Cucumber", "Tomato"]);
    assert_eq!(report.expenses_by_category.len(), 2);
    assert!(approx(report.expenses_by_category[0].value, 750.0));
}

#[test]
fn report_for_whole_year() {
    let orders = vec![
        order("2025-07-30", VegetableType::Cucumber, 1.0, 100.0),
        order("2025-10-02", VegetableType::Cucumber, 1.0, 50.0),
        order("2024-10-02", VegetableType::Cucumber, 1.0, 75.0),
    ];
    let report = PeriodReport::compute(&orders, &[], Period::Year(2025));
    assert_eq!(report.order_count, 2);
    assert!(approx(report.total_revenue, 150.0));
    assert!(approx(report.net_profit, 150.0));
}

// ── Trends and breakdowns ───────────────────────────────────────

#[test]
fn sales_trend_groups_days_oldest_first() {
    let orders = vec![
        order("2025-07-30", VegetableType::Cucumber, 2.0, 10.0),
        order("2025-07-01", VegetableType::Cucumber, 1.0, 10.0),
        order("2025-07-30", VegetableType::Tomato, 3.0, 10.0),
    ];
    let trend = sales_trend(&orders, 15);
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].date, date("2025-07-01"));
    assert_eq!(trend[1].date, date("2025-07-30"));
    assert!(approx(trend[1].revenue, 50.0));
    assert!(approx(trend[1].weight, 5.0));
}

#[test]
fn sales_trend_keeps_most_recent_days() {
    let orders: Vec<Order> = (1..=20)
        .map(|day| order(&format!("2025-08-{day:02}"), VegetableType::Cucumber, 1.0, 1.0))
        .collect();
    let trend = sales_trend(&orders, 15);
    assert_eq!(trend.len(), 15);
    assert_eq!(trend[0].date, date("2025-08-06"));
    assert_eq!(trend[14].date, date("2025-08-20"));
}

#[test]
fn harvest_breakdown_and_daily_yield() {
    let harvests = vec![
        harvest("2025-07-01", VegetableType::Cucumber, 10.0),
        harvest("2025-07-01", VegetableType::Tomato, 4.0),
        harvest("2025-07-02", VegetableType::Cucumber, 6.0),
    ];
    let by_variety = harvest_by_variety(&harvests);
    assert_eq!(by_variety.len(), 2);
    assert_eq!(by_variety[0].name, "Cucumber");
    assert!(approx(by_variety[0].value, 16.0));

    assert!(approx(harvest_on(&harvests, date("2025-07-01")), 14.0));
    assert_eq!(harvest_on(&harvests, date("2025-07-03")), 0.0);
}

#[test]
fn available_years_newest_first() {
    let orders = vec![
        order("2024-12-30", VegetableType::Cucumber, 1.0, 1.0),
        order("2025-01-02", VegetableType::Cucumber, 1.0, 1.0),
    ];
    let expenses = vec![expense("2025-03-01", ExpenseCategory::Seeds, 1.0)];
    assert_eq!(available_years(&orders, &expenses, 2030), vec![2025, 2024]);
    assert_eq!(available_years(&[], &[], 2030), vec![2030]);
}
