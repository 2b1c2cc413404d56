//! In-memory partner backend.
//!
//! Stands in for the portal's REST API: every table filters, sorts, and
//! paginates on the "server" side and answers after a configurable latency.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta};
use portal_grid::{GridQuery, RecordPage, RecordSource, SortDirection, SourceError};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Booking, BookingStatus, Invoice, InvoiceStatus, Laboratory, Offering, OfferingKind, Queryable,
};

/// One server-side collection.
pub struct MemoryTable<T> {
    name: &'static str,
    rows: RwLock<Vec<T>>,
    latency: Duration,
}

impl<T: Queryable> MemoryTable<T> {
    pub fn new(name: &'static str, rows: Vec<T>, latency: Duration) -> Self {
        Self {
            name,
            rows: RwLock::new(rows),
            latency,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl<T: Queryable> RecordSource<T> for MemoryTable<T> {
    async fn fetch(&self, query: &GridQuery) -> Result<RecordPage<T>, SourceError> {
        if query.page == 0 || query.page_size == 0 {
            return Err(SourceError::InvalidQuery(format!(
                "page {} / size {}",
                query.page, query.page_size
            )));
        }
        if let Some(sort) = &query.sort
            && !T::SORT_COLUMNS.contains(&sort.column.as_str())
        {
            return Err(SourceError::InvalidQuery(format!(
                "{} cannot be sorted by {}",
                self.name, sort.column
            )));
        }

        tokio::time::sleep(self.latency).await;

        let rows = self.rows.read().await;
        let mut matched: Vec<&T> = match query.filter_text() {
            Some(text) => {
                let needle = text.to_lowercase();
                rows.iter().filter(|r| r.matches(&needle)).collect()
            }
            None => rows.iter().collect(),
        };

        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| {
                let ord = a.compare(b, &sort.column);
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let total = matched.len();
        let records = matched
            .into_iter()
            .skip(query.offset())
            .take(query.page_size)
            .cloned()
            .collect();

        log::debug!(
            "[backend] {} {} -> {} of {}",
            self.name,
            query.to_query_string(),
            query.page_size.min(total.saturating_sub(query.offset())),
            total
        );
        Ok(RecordPage::new(records, total))
    }

    async fn delete(&self, ids: &[T::Id]) -> Result<usize, SourceError> {
        tokio::time::sleep(self.latency).await;
        let ids: HashSet<&T::Id> = ids.iter().collect();
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !ids.contains(&row.id()));
        let removed = before - rows.len();
        log::info!("[backend] {} deleted {} records", self.name, removed);
        Ok(removed)
    }
}

/// All partner collections.
#[derive(Clone)]
pub struct PartnerBackend {
    pub laboratories: Arc<MemoryTable<Laboratory>>,
    pub offerings: Arc<MemoryTable<Offering>>,
    pub bookings: Arc<MemoryTable<Booking>>,
    pub invoices: Arc<MemoryTable<Invoice>>,
}

impl PartnerBackend {
    /// A backend filled with deterministic demo data.
    pub fn seeded(latency: Duration) -> Self {
        Self {
            laboratories: Arc::new(MemoryTable::new("laboratories", seed_laboratories(), latency)),
            offerings: Arc::new(MemoryTable::new("offerings", seed_offerings(), latency)),
            bookings: Arc::new(MemoryTable::new("bookings", seed_bookings(), latency)),
            invoices: Arc::new(MemoryTable::new("invoices", seed_invoices(), latency)),
        }
    }
}

// =============================================================================
// Seed data
// =============================================================================

const CITIES: &[&str] = &["Pune", "Mumbai", "Delhi", "Bengaluru", "Chennai", "Hyderabad", "Kolkata"];
const LAB_PREFIXES: &[&str] = &["Apex", "CarePoint", "Metro", "Sunrise", "Lifeline", "Prime", "Unity"];
const ACCREDITATIONS: &[&str] = &["NABL", "CAP", "ISO 15189", "None"];
const TESTS: &[&str] = &[
    "Complete Blood Count",
    "Lipid Profile",
    "HbA1c",
    "Thyroid Panel",
    "Vitamin D",
    "Liver Function Test",
    "Kidney Function Test",
    "Urine Routine",
];
const PACKAGES: &[&str] = &["Full Body Checkup", "Diabetes Care", "Heart Health", "Senior Citizen Panel"];
const PATIENTS: &[&str] = &[
    "Asha Verma",
    "Rohan Iyer",
    "Meera Nair",
    "Kabir Singh",
    "Zoya Khan",
    "Arjun Rao",
    "Ishita Das",
    "Vikram Joshi",
    "Nisha Patel",
];

fn pick<'a>(items: &[&'a str], i: usize) -> &'a str {
    items[i % items.len()]
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn seed_laboratories() -> Vec<Laboratory> {
    (0..37)
        .map(|i| Laboratory {
            id: i as u32 + 1,
            name: format!("{} Diagnostics {}", pick(LAB_PREFIXES, i), pick(CITIES, i / 3)),
            city: pick(CITIES, i / 3).to_string(),
            accreditation: pick(ACCREDITATIONS, i).to_string(),
            tests_offered: 20 + (i as u32 * 17) % 180,
            active: i % 5 != 4,
        })
        .collect()
}

fn seed_offerings() -> Vec<Offering> {
    let tests = TESTS.iter().enumerate().map(|(i, name)| Offering {
        id: i as u32 + 1,
        name: name.to_string(),
        kind: OfferingKind::Test,
        laboratory: format!("{} Diagnostics", pick(LAB_PREFIXES, i)),
        price: Decimal::new(24_900 + (i as i64 * 15_000), 2),
        turnaround_hours: 6 + (i as u32 * 6) % 48,
    });
    let packages = PACKAGES.iter().enumerate().map(|(i, name)| Offering {
        id: (TESTS.len() + i) as u32 + 1,
        name: name.to_string(),
        kind: OfferingKind::Package,
        laboratory: format!("{} Diagnostics", pick(LAB_PREFIXES, i + 2)),
        price: Decimal::new(149_900 + (i as i64 * 50_000), 2),
        turnaround_hours: 24 + (i as u32 * 12),
    });
    tests.chain(packages).collect()
}

fn seed_bookings() -> Vec<Booking> {
    const STATUSES: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::SampleCollected,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];
    (0..143)
        .map(|i| Booking {
            id: Uuid::from_u128(0x5eed_0000 + i as u128),
            reference: format!("BK-{}", 10_001 + i),
            patient: pick(PATIENTS, i * 7).to_string(),
            offering: pick(TESTS, i).to_string(),
            scheduled: epoch() + TimeDelta::days((i as i64 * 3) % 180),
            status: STATUSES[(i * 3) % STATUSES.len()],
            amount: Decimal::new(24_900 + ((i as i64 * 7_300) % 200_000), 2),
        })
        .collect()
}

fn seed_invoices() -> Vec<Invoice> {
    const STATUSES: [InvoiceStatus; 3] = [InvoiceStatus::Paid, InvoiceStatus::Due, InvoiceStatus::Overdue];
    (0..26)
        .map(|i| Invoice {
            id: i as u32 + 1,
            number: format!("INV-2024-{:04}", i + 1),
            issued: epoch() + TimeDelta::days(i as i64 * 14),
            amount: Decimal::new(1_250_000 + (i as i64 * 83_100) % 900_000, 2),
            status: STATUSES[i % STATUSES.len()],
        })
        .collect()
}
