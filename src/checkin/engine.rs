use std::sync::Arc;

use tracing::{debug, info, warn};

use super::clock::Clock;
use super::decoder::decode_ticket_id;
use super::guard::EventWindowGuard;
use super::store::{RegistrationStore, StoreError};
use crate::models::{InputError, ScanOutcome, ScanRequest, WindowVerdict};

/// Resolves scans to registrations and performs the one-time check-in.
///
/// The engine owns no state of its own. Every transition goes through
/// [`RegistrationStore::try_mark_checked_in`], so concurrent scans of one
/// ticket are serialized by the store while different tickets never contend.
#[derive(Clone)]
pub struct CheckInEngine {
    store: Arc<dyn RegistrationStore>,
    guard: Arc<dyn EventWindowGuard>,
    clock: Arc<dyn Clock>,
}

impl CheckInEngine {
    pub fn new(
        store: Arc<dyn RegistrationStore>,
        guard: Arc<dyn EventWindowGuard>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            guard,
            clock,
        }
    }

    #[tracing::instrument(skip_all, fields(event_id = request.event_id))]
    pub async fn attempt_check_in(&self, request: &ScanRequest) -> Result<ScanOutcome, StoreError> {
        let event_id = request.event_id;
        if event_id <= 0 {
            return Ok(ScanOutcome::InvalidInput(InputError::MissingEventId));
        }

        let ticket_id = match decode_ticket_id(&request.raw_payload) {
            Ok(ticket_id) => ticket_id,
            Err(err) => return Ok(ScanOutcome::InvalidInput(err)),
        };

        if let WindowVerdict::Closed(reason) = self.guard.is_within_window(event_id).await? {
            info!(ticket_id = %ticket_id, ?reason, "Scan refused outside event window");
            return Ok(ScanOutcome::OutOfWindow(reason));
        }

        let Some(registration) = self.store.find(event_id, &ticket_id).await? else {
            info!(ticket_id = %ticket_id, "No registration for ticket");
            return Ok(ScanOutcome::NotFound);
        };

        if registration.is_checked_in() {
            info!(ticket_id = %ticket_id, "Duplicate scan");
            return Ok(ScanOutcome::AlreadyCheckedIn(registration));
        }

        let at = self.clock.now();
        if self.store.try_mark_checked_in(event_id, &ticket_id, at).await? {
            let mut checked_in = registration;
            checked_in.mark_checked_in(at);
            info!(ticket_id = %ticket_id, attendee = %checked_in.attendee_name, "Attendance marked");
            return Ok(ScanOutcome::Success(checked_in));
        }

        // Another scan won between our read and the transition.
        debug!(ticket_id = %ticket_id, "Lost check-in race, re-reading registration");
        match self.store.find(event_id, &ticket_id).await? {
            Some(current) if current.is_checked_in() => Ok(ScanOutcome::AlreadyCheckedIn(current)),
            Some(_) => {
                warn!(ticket_id = %ticket_id, "Store refused transition of unchecked registration");
                Err(StoreError::Unavailable("check-in transition refused".to_string()))
            }
            None => Ok(ScanOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::clock::FixedClock;
    use crate::checkin::guard::StaticGuard;
    use crate::checkin::store::MemoryRegistrationStore;
    use crate::models::{AttendanceStatus, ClosedReason, EventId, Registration};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, minute, 0).unwrap()
    }

    /// Memory store that counts every call reaching it.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryRegistrationStore,
        finds: AtomicUsize,
        marks: AtomicUsize,
    }

    impl CountingStore {
        fn calls(&self) -> (usize, usize) {
            (
                self.finds.load(Ordering::SeqCst),
                self.marks.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait]
    impl RegistrationStore for CountingStore {
        async fn find(
            &self,
            event_id: EventId,
            ticket_id: &str,
        ) -> Result<Option<Registration>, StoreError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find(event_id, ticket_id).await
        }

        async fn try_mark_checked_in(
            &self,
            event_id: EventId,
            ticket_id: &str,
            at: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            self.marks.fetch_add(1, Ordering::SeqCst);
            self.inner.try_mark_checked_in(event_id, ticket_id, at).await
        }

        async fn checked_in(&self, event_id: EventId) -> Result<Vec<Registration>, StoreError> {
            self.inner.checked_in(event_id).await
        }
    }

    /// Lets a rival device check the ticket in right before our transition.
    struct RivalStore {
        inner: MemoryRegistrationStore,
        rival_at: DateTime<Utc>,
    }

    #[async_trait]
    impl RegistrationStore for RivalStore {
        async fn find(
            &self,
            event_id: EventId,
            ticket_id: &str,
        ) -> Result<Option<Registration>, StoreError> {
            self.inner.find(event_id, ticket_id).await
        }

        async fn try_mark_checked_in(
            &self,
            event_id: EventId,
            ticket_id: &str,
            at: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            self.inner
                .try_mark_checked_in(event_id, ticket_id, self.rival_at)
                .await?;
            self.inner.try_mark_checked_in(event_id, ticket_id, at).await
        }

        async fn checked_in(&self, event_id: EventId) -> Result<Vec<Registration>, StoreError> {
            self.inner.checked_in(event_id).await
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl RegistrationStore for BrokenStore {
        async fn find(&self, _: EventId, _: &str) -> Result<Option<Registration>, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        async fn try_mark_checked_in(
            &self,
            _: EventId,
            _: &str,
            _: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        async fn checked_in(&self, _: EventId) -> Result<Vec<Registration>, StoreError> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }
    }

    fn seeded() -> Arc<CountingStore> {
        let store = CountingStore::default();
        store
            .inner
            .insert(Registration::new(7, "T-1", "Asha Verma").with_course("B.Tech"))
            .unwrap();
        Arc::new(store)
    }

    fn engine(
        store: Arc<dyn RegistrationStore>,
        verdict: WindowVerdict,
        now: DateTime<Utc>,
    ) -> CheckInEngine {
        CheckInEngine::new(
            store,
            Arc::new(StaticGuard(verdict)),
            Arc::new(FixedClock(now)),
        )
    }

    #[tokio::test]
    async fn test_first_scan_succeeds_then_duplicate() {
        let store = seeded();
        let request = ScanRequest::new(7, "T-1");

        let first = engine(store.clone(), WindowVerdict::Open, at(0))
            .attempt_check_in(&request)
            .await
            .unwrap();
        let ScanOutcome::Success(registration) = first else {
            panic!("expected success");
        };
        assert_eq!(registration.status, AttendanceStatus::CheckedIn);
        assert_eq!(registration.check_in_time, Some(at(0)));

        let second = engine(store.clone(), WindowVerdict::Open, at(10))
            .attempt_check_in(&request)
            .await
            .unwrap();
        let ScanOutcome::AlreadyCheckedIn(registration) = second else {
            panic!("expected duplicate");
        };
        assert_eq!(registration.check_in_time, Some(at(0)));

        let stored = store.find(7, "T-1").await.unwrap().unwrap();
        assert_eq!(stored.check_in_time, Some(at(0)));
    }

    #[tokio::test]
    async fn test_structured_payload_checks_in() {
        let store = seeded();
        let outcome = engine(store, WindowVerdict::Open, at(0))
            .attempt_check_in(&ScanRequest::new(7, r#"{"ticket_id":"T-1","email":null}"#))
            .await
            .unwrap();
        assert_eq!(outcome.label(), "success");
    }

    #[tokio::test]
    async fn test_unknown_ticket_is_not_found_without_mutation() {
        let store = seeded();
        let outcome = engine(store.clone(), WindowVerdict::Open, at(0))
            .attempt_check_in(&ScanRequest::new(7, "T-404"))
            .await
            .unwrap();

        assert_eq!(outcome, ScanOutcome::NotFound);
        assert_eq!(store.calls(), (1, 0));
        assert!(store.inner.checked_in(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ticket_of_other_event_is_not_found() {
        let store = seeded();
        let outcome = engine(store.clone(), WindowVerdict::Open, at(0))
            .attempt_check_in(&ScanRequest::new(8, "T-1"))
            .await
            .unwrap();

        assert_eq!(outcome, ScanOutcome::NotFound);
        let original = store.find(7, "T-1").await.unwrap().unwrap();
        assert_eq!(original.status, AttendanceStatus::NotCheckedIn);
    }

    #[tokio::test]
    async fn test_closed_window_never_touches_store() {
        let store = seeded();
        let outcome = engine(
            store.clone(),
            WindowVerdict::Closed(ClosedReason::Ended),
            at(0),
        )
        .attempt_check_in(&ScanRequest::new(3, "T-1"))
        .await
        .unwrap();

        assert_eq!(outcome, ScanOutcome::OutOfWindow(ClosedReason::Ended));
        assert_eq!(store.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_invalid_input_never_touches_store() {
        let store = seeded();
        let engine = engine(store.clone(), WindowVerdict::Open, at(0));

        let blank = engine.attempt_check_in(&ScanRequest::new(7, "   ")).await.unwrap();
        assert_eq!(blank, ScanOutcome::InvalidInput(InputError::EmptyPayload));

        let no_event = engine.attempt_check_in(&ScanRequest::new(0, "T-1")).await.unwrap();
        assert_eq!(no_event, ScanOutcome::InvalidInput(InputError::MissingEventId));

        assert_eq!(store.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_lost_race_reports_winner() {
        let inner = MemoryRegistrationStore::new();
        inner.insert(Registration::new(7, "T-1", "Asha Verma")).unwrap();
        let store = Arc::new(RivalStore {
            inner,
            rival_at: at(1),
        });

        let outcome = engine(store, WindowVerdict::Open, at(2))
            .attempt_check_in(&ScanRequest::new(7, "T-1"))
            .await
            .unwrap();

        let ScanOutcome::AlreadyCheckedIn(registration) = outcome else {
            panic!("expected duplicate after lost race");
        };
        assert_eq!(registration.check_in_time, Some(at(1)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_surfaced() {
        let result = engine(Arc::new(BrokenStore), WindowVerdict::Open, at(0))
            .attempt_check_in(&ScanRequest::new(7, "T-1"))
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scans_of_one_ticket_succeed_once() {
        const DEVICES: usize = 32;
        let store = seeded();
        let engine = engine(store.clone(), WindowVerdict::Open, at(0));
        let barrier = Arc::new(Barrier::new(DEVICES));

        let mut handles = Vec::with_capacity(DEVICES);
        for _ in 0..DEVICES {
            let engine = engine.clone();
            let barrier = barrier.clone();
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                engine.attempt_check_in(&ScanRequest::new(7, "T-1")).await
            }));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                ScanOutcome::Success(_) => successes += 1,
                ScanOutcome::AlreadyCheckedIn(_) => duplicates += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(duplicates, DEVICES - 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scans_of_different_tickets_all_succeed() {
        let store = MemoryRegistrationStore::new();
        for n in 0..16 {
            store
                .insert(Registration::new(7, format!("T-{n}"), format!("Attendee {n}")))
                .unwrap();
        }
        let engine = engine(Arc::new(store), WindowVerdict::Open, at(0));

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .attempt_check_in(&ScanRequest::new(7, format!("T-{n}")))
                        .await
                })
            })
            .collect();

        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            assert_eq!(outcome.label(), "success");
        }
    }
}
