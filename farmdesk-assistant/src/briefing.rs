//! The read-only data briefing handed to the language model.

use farmdesk_types::summary::{harvest_by_variety, FarmTotals};
use farmdesk_types::FarmSnapshot;
use std::fmt::Write;

/// Number of orders listed under "Recent Orders".
pub const RECENT_ORDERS: usize = 5;

/// Renders totals, per-variety harvest and the most recent orders.
pub fn build_briefing(snapshot: &FarmSnapshot) -> String {
    let totals = FarmTotals::from_snapshot(snapshot);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "CURRENT FARM DATA SNAPSHOT (WEERA AGRICULTURE):");
    let _ = writeln!(out, "- Total Revenue: Rs. {}", grouped(totals.total_revenue));
    let _ = writeln!(out, "- Total Expenses: Rs. {}", grouped(totals.total_expenses));
    let _ = writeln!(out, "- Net Profit/Loss: Rs. {}", grouped(totals.net_profit));
    let _ = writeln!(out, "- Total Harvest Yield: {}kg", grouped(totals.total_harvest_kg));
    let _ = writeln!(
        out,
        "- Total Labor Investment: {} hours",
        grouped(totals.total_work_hours)
    );

    let _ = writeln!(out, "\nVariety Performance:");
    for entry in harvest_by_variety(&snapshot.harvests) {
        let _ = writeln!(out, "- {}: {}kg", entry.name, grouped(entry.value));
    }

    let _ = writeln!(out, "\nRecent Orders:");
    for order in snapshot.orders.iter().take(RECENT_ORDERS) {
        let _ = writeln!(
            out,
            "- {}: {}, {}kg @ Rs.{}/kg",
            order.date,
            order.variety(),
            grouped(order.weight),
            grouped(order.price)
        );
    }
    out
}

/// Consultant persona and rules, followed by the current briefing.
pub fn system_instruction(snapshot: &FarmSnapshot) -> String {
    format!(
        "You are WEERA AI, an expert agricultural business consultant for WEERA AGRICULTURE (PVT) LTD.\n\
         You have full access to the company's real-time farm data.\n\
         \n\
         Your goal is to answer ANY question the user asks about their farm operations, finances, and performance using the data provided.\n\
         \n\
         RULES:\n\
         1. Always use the data snapshot provided to give specific answers.\n\
         2. Be professional, helpful, and analytical.\n\
         3. If the user asks about things not in the data, use your general agricultural expertise to guide them.\n\
         4. Keep answers concise but thorough.\n\
         5. Always refer to the company as \"Weera Agriculture\".\n\
         \n\
         {}",
        build_briefing(snapshot)
    )
}

/// Formats with comma thousands separators and at most two decimals,
/// e.g. `17772.5` as `17,772.5`.
pub fn grouped(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut int_grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            int_grouped.push(',');
        }
        int_grouped.push(digit);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        format!("{sign}{int_grouped}")
    } else {
        format!("{sign}{int_grouped}.{frac}")
    }
}
