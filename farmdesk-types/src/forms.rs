//! Entry forms: the validation boundary between user input and records.
//!
//! Forms hold the raw text a user typed. `validate()` either produces a
//! well-formed record with an unassigned id or says which field is wrong.
//! Stores downstream assume their input already passed through here, so a
//! `NaN` or negative quantity never reaches durable storage.

use crate::{
    ExpenseCategory, ExpenseRecord, GreenhouseNumber, HarvestRecord, IsoDate, Order, OrderStatus,
    PaymentStatus, RecordId, Task, VegetableType, WorkRecord,
};
use std::str::FromStr;
use thiserror::Error;

/// Why a form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{field} is required")]
    Missing { field: &'static str },

    /// A numeric field did not hold a finite, non-negative number.
    #[error("{field} must be a non-negative number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A date was not in `YYYY-MM-DD` form.
    #[error("{field} must be a date in YYYY-MM-DD form, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// A choice field held an unknown value.
    #[error("{field}: {message}")]
    InvalidChoice { field: &'static str, message: String },
}

/// Parses a user-typed quantity: finite, non-negative, not empty.
pub fn parse_quantity(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    let value: f64 = trimmed.parse().map_err(|_| ValidationError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    check_quantity(field, value)
}

/// Accepts an already-numeric quantity only if it is finite and non-negative.
pub fn check_quantity(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        // Normalizes -0.0.
        Ok(value.abs())
    } else {
        Err(ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    }
}

/// Parses a `YYYY-MM-DD` date field.
pub fn parse_date(field: &'static str, raw: &str) -> Result<IsoDate, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Missing { field });
    }
    IsoDate::parse(raw).map_err(|_| ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

fn parse_choice<T>(field: &'static str, raw: &str) -> Result<T, ValidationError>
where
    T: FromStr<Err = crate::Error>,
{
    if raw.trim().is_empty() {
        return Err(ValidationError::Missing { field });
    }
    raw.parse().map_err(|e: crate::Error| ValidationError::InvalidChoice {
        field,
        message: e.to_string(),
    })
}

fn parse_greenhouse(raw: &str) -> Result<GreenhouseNumber, ValidationError> {
    const FIELD: &str = "greenhouse";
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field: FIELD });
    }
    let number: u8 = trimmed.parse().map_err(|_| ValidationError::InvalidChoice {
        field: FIELD,
        message: format!("not a greenhouse number: {trimmed}"),
    })?;
    GreenhouseNumber::new(number).map_err(|e| ValidationError::InvalidChoice {
        field: FIELD,
        message: e.to_string(),
    })
}

/// Resolves the free-text override that accompanies an `Other` choice.
fn other_text(
    field: &'static str,
    is_other: bool,
    raw: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    if !is_other {
        return Ok(None);
    }
    match raw.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(Some(text.to_string())),
        _ => Err(ValidationError::Missing { field }),
    }
}

// ── Forms ───────────────────────────────────────────────────────

/// Raw input for a new harvest.
#[derive(Debug, Clone, Default)]
pub struct HarvestForm {
    pub date: String,
    pub greenhouse: String,
    pub vegetable: String,
    pub other_vegetable: Option<String>,
    pub weight: String,
}

impl HarvestForm {
    pub fn validate(&self) -> Result<HarvestRecord, ValidationError> {
        let vegetable_type: VegetableType = parse_choice("vegetable", &self.vegetable)?;
        Ok(HarvestRecord {
            id: RecordId::unassigned(),
            date: parse_date("date", &self.date)?,
            greenhouse_number: parse_greenhouse(&self.greenhouse)?,
            other_vegetable: other_text(
                "other vegetable",
                vegetable_type == VegetableType::Other,
                self.other_vegetable.as_deref(),
            )?,
            vegetable_type,
            weight: parse_quantity("weight", &self.weight)?,
        })
    }
}

/// Raw input for a new work record.
#[derive(Debug, Clone, Default)]
pub struct WorkForm {
    pub date: String,
    pub greenhouse: String,
    pub task: String,
    pub other_task: Option<String>,
    pub hours: String,
}

impl WorkForm {
    pub fn validate(&self) -> Result<WorkRecord, ValidationError> {
        let task: Task = parse_choice("task", &self.task)?;
        Ok(WorkRecord {
            id: RecordId::unassigned(),
            date: parse_date("date", &self.date)?,
            greenhouse_number: parse_greenhouse(&self.greenhouse)?,
            other_task: other_text("other task", task == Task::Other, self.other_task.as_deref())?,
            task,
            hours_worked: parse_quantity("hours worked", &self.hours)?,
        })
    }
}

/// Raw input for a new sales order.
///
/// Blank statuses default to Completed and Paid, which is how most orders
/// are logged: after the sale.
#[derive(Debug, Clone, Default)]
pub struct OrderForm {
    pub date: String,
    pub vegetable: String,
    pub other_vegetable: Option<String>,
    pub weight: String,
    pub price: String,
    pub order_status: String,
    pub payment_status: String,
}

impl OrderForm {
    pub fn validate(&self) -> Result<Order, ValidationError> {
        let vegetable_type: VegetableType = parse_choice("vegetable", &self.vegetable)?;
        let order_status = if self.order_status.trim().is_empty() {
            OrderStatus::Completed
        } else {
            parse_choice("order status", &self.order_status)?
        };
        let payment_status = if self.payment_status.trim().is_empty() {
            PaymentStatus::Paid
        } else {
            parse_choice("payment status", &self.payment_status)?
        };
        Ok(Order {
            id: RecordId::unassigned(),
            date: parse_date("date", &self.date)?,
            other_vegetable: other_text(
                "other vegetable",
                vegetable_type == VegetableType::Other,
                self.other_vegetable.as_deref(),
            )?,
            vegetable_type,
            weight: parse_quantity("weight", &self.weight)?,
            price: parse_quantity("price", &self.price)?,
            order_status,
            payment_status,
        })
    }
}

/// Raw input for a new expense.
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub date: String,
    pub category: String,
    pub other_category: Option<String>,
    pub description: String,
    pub amount: String,
}

impl ExpenseForm {
    pub fn validate(&self) -> Result<ExpenseRecord, ValidationError> {
        let category: ExpenseCategory = parse_choice("category", &self.category)?;
        Ok(ExpenseRecord {
            id: RecordId::unassigned(),
            date: parse_date("date", &self.date)?,
            other_category: other_text(
                "other category",
                category == ExpenseCategory::Other,
                self.other_category.as_deref(),
            )?,
            category,
            description: self.description.trim().to_string(),
            amount: parse_quantity("amount", &self.amount)?,
        })
    }
}
