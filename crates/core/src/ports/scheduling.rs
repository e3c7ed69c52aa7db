//! Consultation scheduling port.

use crate::constants::{SCHEDULING_HORIZON_DAYS, SLOT_HOURS, SLOT_PROVIDERS};
use crate::{TriageError, TriageResult};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;
use triage_types::PatientId;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub id: String,
    pub date: DateTime<Utc>,
    pub provider: String,
    pub available: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub patient_id: PatientId,
    pub slot: TimeSlot,
    pub booked_at: DateTime<Utc>,
}

#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// Slots offered as of `now`.
    async fn available_slots(&self, now: DateTime<Utc>) -> TriageResult<Vec<TimeSlot>>;

    /// Book `slot_id` for a patient.
    async fn book(
        &self,
        patient_id: &PatientId,
        slot_id: &str,
        now: DateTime<Utc>,
    ) -> TriageResult<Booking>;
}

/// Weekday slots for the next few days, at fixed hours, with surgeons in rotation.
pub fn business_day_slots(now: DateTime<Utc>) -> Vec<TimeSlot> {
    let today = now.date_naive();
    let mut slots = Vec::new();

    for offset in 1..=SCHEDULING_HORIZON_DAYS {
        let day = today + Duration::days(offset);
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        for hour in SLOT_HOURS {
            let Some(start) = day.and_hms_opt(hour, 0, 0) else {
                continue;
            };
            let start = start.and_utc();
            let provider = SLOT_PROVIDERS[slots.len() % SLOT_PROVIDERS.len()];
            slots.push(TimeSlot {
                id: format!("slot-{}", start.timestamp_millis()),
                date: start,
                provider: provider.to_string(),
                available: true,
            });
        }
    }

    slots
}

/// Scheduler fake that offers [`business_day_slots`] and remembers bookings.
#[derive(Debug, Default)]
pub struct BusinessHoursScheduler {
    booked: Mutex<HashSet<String>>,
}

impl BusinessHoursScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchedulingProvider for BusinessHoursScheduler {
    async fn available_slots(&self, now: DateTime<Utc>) -> TriageResult<Vec<TimeSlot>> {
        let booked = self
            .booked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok(business_day_slots(now)
            .into_iter()
            .map(|mut slot| {
                slot.available = !booked.contains(&slot.id);
                slot
            })
            .collect())
    }

    async fn book(
        &self,
        patient_id: &PatientId,
        slot_id: &str,
        now: DateTime<Utc>,
    ) -> TriageResult<Booking> {
        let slot = business_day_slots(now)
            .into_iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| TriageError::SlotUnavailable(format!("unknown slot {slot_id}")))?;

        let mut booked = self
            .booked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !booked.insert(slot.id.clone()) {
            return Err(TriageError::SlotUnavailable(format!(
                "{slot_id} is already booked"
            )));
        }
        drop(booked);

        tracing::info!(%patient_id, slot = %slot.id, provider = %slot.provider, "booked consultation");

        Ok(Booking {
            id: Uuid::new_v4(),
            patient_id: patient_id.clone(),
            slot: TimeSlot {
                available: false,
                ..slot
            },
            booked_at: now,
        })
    }
}
