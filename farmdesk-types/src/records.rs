//! The four record kinds kept by the farm ledger.
//!
//! Field names serialize in camelCase and enumerations as their capitalized
//! labels, which is the shape written to durable storage and posted to the
//! replication endpoint.

use crate::forms::{check_quantity, ValidationError};
use crate::{Error, IsoDate, RecordId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Common behaviour of every stored record kind.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Partial update accepted by [`Record::apply`].
    type Patch;

    /// Durable storage key of the collection; also its snapshot field name.
    const COLLECTION: &'static str;

    fn id(&self) -> &RecordId;

    fn set_id(&mut self, id: RecordId);

    fn date(&self) -> IsoDate;

    /// Greenhouse the record belongs to, for kinds that have one.
    fn greenhouse(&self) -> Option<GreenhouseNumber> {
        None
    }

    /// Merges the fields present in `patch` into this record.
    ///
    /// Setting an enumerated field to anything but `Other` drops its
    /// free-text override.
    fn apply(&mut self, patch: Self::Patch);

    /// Checks what every stored record must hold: quantities are finite
    /// and non-negative, and an `Other` choice carries its override.
    fn validate(&self) -> Result<(), ValidationError>;
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub const fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(s))
                    .ok_or_else(|| Error::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

labelled_enum!(
    /// Crop grown in the greenhouses.
    VegetableType, "vegetable type" {
        Cucumber => "Cucumber",
        Tomato => "Tomato",
        Capsicum => "Capsicum",
        Other => "Other",
    }
);

labelled_enum!(
    /// Kind of labour logged in a work record.
    Task, "task" {
        Water => "Water",
        Fertilizer => "Fertilizer",
        Pesticide => "Pesticide",
        Pruning => "Pruning",
        Planting => "Planting",
        Maintenance => "Maintenance",
        Other => "Other",
    }
);

labelled_enum!(
    /// Fulfilment state of a sales order.
    OrderStatus, "order status" {
        Pending => "Pending",
        Processing => "Processing",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
);

labelled_enum!(
    /// Payment state of a sales order.
    PaymentStatus, "payment status" {
        Unpaid => "Unpaid",
        Partial => "Partial",
        Paid => "Paid",
    }
);

labelled_enum!(
    /// Operating expense category.
    ExpenseCategory, "expense category" {
        Seeds => "Seeds",
        Fertilizer => "Fertilizer",
        Pesticide => "Pesticide",
        Labor => "Labor",
        Utilities => "Utilities",
        Equipment => "Equipment",
        Other => "Other",
    }
);

/// Greenhouse number, 1 through [`GreenhouseNumber::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GreenhouseNumber(u8);

impl GreenhouseNumber {
    pub const MAX: u8 = 4;

    pub fn new(number: u8) -> crate::Result<Self> {
        if (1..=Self::MAX).contains(&number) {
            Ok(Self(number))
        } else {
            Err(Error::InvalidGreenhouse {
                value: number,
                max: Self::MAX,
            })
        }
    }

    /// Every greenhouse on the farm.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::MAX).map(Self)
    }

    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for GreenhouseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Picks the free-text override when the enumerated value is `Other`.
fn label_or_override<'a>(label: &'a str, is_other: bool, other: Option<&'a str>) -> &'a str {
    match other.map(str::trim) {
        Some(text) if is_other && !text.is_empty() => text,
        _ => label,
    }
}

/// Override kept after a merge: the patch's text when given, otherwise
/// the current one, and nothing once the choice is no longer `Other`.
fn merge_override(
    is_other: bool,
    current: Option<String>,
    patch: Option<String>,
) -> Option<String> {
    if !is_other {
        return None;
    }
    patch.map(|text| text.trim().to_string()).or(current)
}

fn check_override(
    field: &'static str,
    is_other: bool,
    other: Option<&str>,
) -> Result<(), ValidationError> {
    if is_other && other.is_none_or(|text| text.trim().is_empty()) {
        return Err(ValidationError::Missing { field });
    }
    Ok(())
}

// ── Harvest ─────────────────────────────────────────────────────

/// A logged harvest yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRecord {
    pub id: RecordId,
    pub date: IsoDate,
    pub greenhouse_number: GreenhouseNumber,
    pub vegetable_type: VegetableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_vegetable: Option<String>,
    /// Kilograms harvested.
    pub weight: f64,
}

impl HarvestRecord {
    /// Crop name shown to the user.
    #[must_use]
    pub fn variety(&self) -> &str {
        label_or_override(
            self.vegetable_type.label(),
            self.vegetable_type == VegetableType::Other,
            self.other_vegetable.as_deref(),
        )
    }
}

/// Editable fields of a [`HarvestRecord`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestPatch {
    pub date: Option<IsoDate>,
    pub greenhouse_number: Option<GreenhouseNumber>,
    pub vegetable_type: Option<VegetableType>,
    pub other_vegetable: Option<String>,
    pub weight: Option<f64>,
}

impl Record for HarvestRecord {
    type Patch = HarvestPatch;

    const COLLECTION: &'static str = "harvests";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn date(&self) -> IsoDate {
        self.date
    }

    fn greenhouse(&self) -> Option<GreenhouseNumber> {
        Some(self.greenhouse_number)
    }

    fn apply(&mut self, patch: HarvestPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(greenhouse) = patch.greenhouse_number {
            self.greenhouse_number = greenhouse;
        }
        if let Some(vegetable) = patch.vegetable_type {
            self.vegetable_type = vegetable;
        }
        self.other_vegetable = merge_override(
            self.vegetable_type == VegetableType::Other,
            self.other_vegetable.take(),
            patch.other_vegetable,
        );
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_quantity("weight", self.weight)?;
        check_override(
            "other vegetable",
            self.vegetable_type == VegetableType::Other,
            self.other_vegetable.as_deref(),
        )
    }
}

// ── Work ────────────────────────────────────────────────────────

/// Labour hours spent on a task in a greenhouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    pub id: RecordId,
    pub date: IsoDate,
    pub greenhouse_number: GreenhouseNumber,
    pub task: Task,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_task: Option<String>,
    pub hours_worked: f64,
}

impl WorkRecord {
    /// Task name shown to the user.
    #[must_use]
    pub fn task_name(&self) -> &str {
        label_or_override(
            self.task.label(),
            self.task == Task::Other,
            self.other_task.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkPatch {
    pub date: Option<IsoDate>,
    pub greenhouse_number: Option<GreenhouseNumber>,
    pub task: Option<Task>,
    pub other_task: Option<String>,
    pub hours_worked: Option<f64>,
}

impl Record for WorkRecord {
    type Patch = WorkPatch;

    const COLLECTION: &'static str = "workRecords";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn date(&self) -> IsoDate {
        self.date
    }

    fn greenhouse(&self) -> Option<GreenhouseNumber> {
        Some(self.greenhouse_number)
    }

    fn apply(&mut self, patch: WorkPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(greenhouse) = patch.greenhouse_number {
            self.greenhouse_number = greenhouse;
        }
        if let Some(task) = patch.task {
            self.task = task;
        }
        self.other_task =
            merge_override(self.task == Task::Other, self.other_task.take(), patch.other_task);
        if let Some(hours) = patch.hours_worked {
            self.hours_worked = hours;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_quantity("hours worked", self.hours_worked)?;
        check_override("other task", self.task == Task::Other, self.other_task.as_deref())
    }
}

// ── Order ───────────────────────────────────────────────────────

/// A sales order. `price` is per kilogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: RecordId,
    pub date: IsoDate,
    pub vegetable_type: VegetableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_vegetable: Option<String>,
    pub weight: f64,
    pub price: f64,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl Order {
    /// Revenue contributed by this order: weight × price.
    #[must_use]
    pub fn revenue(&self) -> f64 {
        self.weight * self.price
    }

    #[must_use]
    pub fn variety(&self) -> &str {
        label_or_override(
            self.vegetable_type.label(),
            self.vegetable_type == VegetableType::Other,
            self.other_vegetable.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub date: Option<IsoDate>,
    pub vegetable_type: Option<VegetableType>,
    pub other_vegetable: Option<String>,
    pub weight: Option<f64>,
    pub price: Option<f64>,
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl Record for Order {
    type Patch = OrderPatch;

    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn date(&self) -> IsoDate {
        self.date
    }

    fn apply(&mut self, patch: OrderPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(vegetable) = patch.vegetable_type {
            self.vegetable_type = vegetable;
        }
        self.other_vegetable = merge_override(
            self.vegetable_type == VegetableType::Other,
            self.other_vegetable.take(),
            patch.other_vegetable,
        );
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(status) = patch.order_status {
            self.order_status = status;
        }
        if let Some(status) = patch.payment_status {
            self.payment_status = status;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_quantity("weight", self.weight)?;
        check_quantity("price", self.price)?;
        check_override(
            "other vegetable",
            self.vegetable_type == VegetableType::Other,
            self.other_vegetable.as_deref(),
        )
    }
}

// ── Expense ─────────────────────────────────────────────────────

/// An operating expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: RecordId,
    pub date: IsoDate,
    pub category: ExpenseCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_category: Option<String>,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
}

impl ExpenseRecord {
    #[must_use]
    pub fn category_name(&self) -> &str {
        label_or_override(
            self.category.label(),
            self.category == ExpenseCategory::Other,
            self.other_category.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub date: Option<IsoDate>,
    pub category: Option<ExpenseCategory>,
    pub other_category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
}

impl Record for ExpenseRecord {
    type Patch = ExpensePatch;

    const COLLECTION: &'static str = "expenses";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn date(&self) -> IsoDate {
        self.date
    }

    fn apply(&mut self, patch: ExpensePatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        self.other_category = merge_override(
            self.category == ExpenseCategory::Other,
            self.other_category.take(),
            patch.other_category,
        );
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_quantity("amount", self.amount)?;
        check_override(
            "other category",
            self.category == ExpenseCategory::Other,
            self.other_category.as_deref(),
        )
    }
}
