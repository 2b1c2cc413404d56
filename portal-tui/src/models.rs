//! Partner portal records shown in the console grids.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use portal_grid::GridRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Records the in-memory backend can filter and sort.
pub trait Queryable: GridRecord + Clone {
    /// Column keys the backend can sort by.
    const SORT_COLUMNS: &'static [&'static str];

    /// Case-insensitive match against the record's searchable fields.
    /// `needle` is already lowercased.
    fn matches(&self, needle: &str) -> bool;

    /// Order two records by a column from [`SORT_COLUMNS`](Self::SORT_COLUMNS).
    fn compare(&self, other: &Self, column: &str) -> Ordering;
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// =============================================================================
// Laboratory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laboratory {
    pub id: u32,
    pub name: String,
    pub city: String,
    pub accreditation: String,
    pub tests_offered: u32,
    pub active: bool,
}

impl GridRecord for Laboratory {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

impl Queryable for Laboratory {
    const SORT_COLUMNS: &'static [&'static str] = &["name", "city", "tests"];

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || contains(&self.city, needle)
            || contains(&self.accreditation, needle)
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "city" => self.city.cmp(&other.city),
            "tests" => self.tests_offered.cmp(&other.tests_offered),
            _ => self.name.cmp(&other.name),
        }
    }
}

// =============================================================================
// Offering
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferingKind {
    Test,
    Package,
}

impl fmt::Display for OfferingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferingKind::Test => f.write_str("Test"),
            OfferingKind::Package => f.write_str("Package"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub id: u32,
    pub name: String,
    pub kind: OfferingKind,
    pub laboratory: String,
    pub price: Decimal,
    pub turnaround_hours: u32,
}

impl GridRecord for Offering {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

impl Queryable for Offering {
    const SORT_COLUMNS: &'static [&'static str] = &["name", "price", "turnaround"];

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle)
            || contains(&self.laboratory, needle)
            || contains(&self.kind.to_string(), needle)
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "price" => self.price.cmp(&other.price),
            "turnaround" => self.turnaround_hours.cmp(&other.turnaround_hours),
            _ => self.name.cmp(&other.name),
        }
    }
}

// =============================================================================
// Booking
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    SampleCollected,
    Completed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::SampleCollected => "Sample collected",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub reference: String,
    pub patient: String,
    pub offering: String,
    pub scheduled: NaiveDate,
    pub status: BookingStatus,
    pub amount: Decimal,
}

impl GridRecord for Booking {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Queryable for Booking {
    const SORT_COLUMNS: &'static [&'static str] = &["reference", "patient", "scheduled", "status", "amount"];

    fn matches(&self, needle: &str) -> bool {
        contains(&self.reference, needle)
            || contains(&self.patient, needle)
            || contains(&self.offering, needle)
            || contains(&self.status.to_string(), needle)
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "patient" => self.patient.cmp(&other.patient),
            "scheduled" => self.scheduled.cmp(&other.scheduled),
            "status" => self.status.cmp(&other.status),
            "amount" => self.amount.cmp(&other.amount),
            _ => self.reference.cmp(&other.reference),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Due,
    Overdue,
    Paid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Due => "Due",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Paid => "Paid",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u32,
    pub number: String,
    pub issued: NaiveDate,
    pub amount: Decimal,
    pub status: InvoiceStatus,
}

impl GridRecord for Invoice {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

impl Queryable for Invoice {
    const SORT_COLUMNS: &'static [&'static str] = &["number", "issued", "amount", "status"];

    fn matches(&self, needle: &str) -> bool {
        contains(&self.number, needle) || contains(&self.status.to_string(), needle)
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        match column {
            "issued" => self.issued.cmp(&other.issued),
            "amount" => self.amount.cmp(&other.amount),
            "status" => self.status.cmp(&other.status),
            _ => self.number.cmp(&other.number),
        }
    }
}
