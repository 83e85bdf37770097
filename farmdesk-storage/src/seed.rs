//! Historical orders present on first run.

use farmdesk_types::{IsoDate, Order, OrderStatus, PaymentStatus, RecordId, VegetableType};

/// `(id, date, kilograms, price per kilogram)` of each seed order. All are
/// completed, paid cucumber sales.
const SEED_ORDERS: &[(&str, &str, f64, f64)] = &[
    ("3", "2025-07-30", 38.9, 230.0),
    ("4", "2025-07-27", 35.3, 250.0),
    ("5", "2025-07-25", 56.0, 160.0),
    ("6", "2025-07-24", 59.7, 170.0),
    ("7", "2025-07-22", 44.3, 165.0),
    ("8", "2025-07-20", 42.0, 140.0),
    ("9", "2025-07-06", 25.0, 170.0),
    ("10", "2025-07-05", 50.0, 170.0),
    ("11", "2025-07-01", 51.0, 120.0),
    ("12", "2025-08-03", 32.5, 170.0),
    ("13", "2025-08-05", 42.0, 180.0),
    ("14", "2025-08-07", 23.0, 210.0),
    ("15", "2025-08-10", 23.0, 200.0),
    ("16", "2025-08-09", 64.25, 200.0),
    ("17", "2025-08-11", 54.50, 200.0),
    ("19", "2025-08-19", 54.00, 165.0),
    ("20", "2025-08-16", 30.00, 190.0),
    ("21", "2025-08-14", 23.00, 200.0),
    ("22", "2025-08-20", 23.00, 105.0),
    ("23", "2025-08-23", 67.00, 105.0),
    ("24", "2025-08-22", 85.50, 120.0),
    ("25", "2025-08-25", 108.00, 100.0),
    ("26", "2025-08-26", 51.20, 100.0),
    ("28", "2025-08-28", 52.30, 150.0),
    ("29", "2025-09-04", 109.00, 180.0),
    ("30", "2025-09-01", 30.80, 130.0),
    ("31", "2025-09-05", 32.60, 180.0),
    ("32", "2025-09-07", 71.90, 140.0),
    ("33", "2025-09-09", 31.80, 160.0),
    ("34", "2025-09-13", 22.00, 135.0),
    ("36", "2025-09-16", 29.60, 160.0),
    ("37", "2025-09-26", 40.20, 200.0),
    ("38", "2025-09-22", 55.90, 250.0),
    ("39", "2025-10-02", 39.50, 120.0),
    ("40", "2025-10-08", 190.00, 49.90),
    ("41", "2025-10-13", 34.00, 190.0),
    ("42", "2025-10-11", 30.00, 190.0),
];

/// The orders a brand-new store starts with.
pub fn seed_orders() -> Vec<Order> {
    SEED_ORDERS
        .iter()
        .filter_map(|&(id, date, weight, price)| {
            Some(Order {
                id: RecordId::from_string(id),
                date: IsoDate::parse(date).ok()?,
                vegetable_type: VegetableType::Cucumber,
                other_vegetable: None,
                weight,
                price,
                order_status: OrderStatus::Completed,
                payment_status: PaymentStatus::Paid,
            })
        })
        .collect()
}
