//! Integration specifications for the claim lifecycle: registration, the
//! transition state machine with authority-gated approvals, and SLA reporting
//! over HTTP.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, NaiveDate, Utc};

    use coverdesk::catalog::{
        ApprovalAuthority, BusinessConfig, ClaimApprovalThreshold, InsuranceType, ThresholdTable,
    };
    use coverdesk::workflows::claims::{
        Claim, ClaimNumber, ClaimRepository, ClaimService, ClaimSubmission, StatusHistoryEntry,
    };
    use coverdesk::workflows::notifications::{
        Notification, NotificationError, NotificationPublisher,
    };
    use coverdesk::workflows::RepositoryError;

    pub(super) fn thresholds() -> ThresholdTable {
        ThresholdTable::new(vec![
            ClaimApprovalThreshold {
                insurance_type: InsuranceType::Health,
                min_amount: 0.0,
                max_amount: 50_000.0,
                required_authority: ApprovalAuthority::Backoffice,
                max_processing_days: 7,
                active: true,
            },
            ClaimApprovalThreshold {
                insurance_type: InsuranceType::Health,
                min_amount: 50_000.01,
                max_amount: 500_000.0,
                required_authority: ApprovalAuthority::Admin,
                max_processing_days: 15,
                active: true,
            },
        ])
    }

    pub(super) fn submission(amount: f64) -> ClaimSubmission {
        ClaimSubmission {
            policy_number: "POL-000031".to_string(),
            insurance_type: InsuranceType::Health,
            claimant_id: "cust-11".to_string(),
            description: "Planned surgery".to_string(),
            amount_requested: amount,
        }
    }

    pub(super) fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).expect("valid date")
    }

    pub(super) fn at(d: u32) -> DateTime<Utc> {
        day(d).and_hms_opt(9, 0, 0).expect("valid time").and_utc()
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        claims: Arc<Mutex<HashMap<String, Claim>>>,
        history: Arc<Mutex<Vec<StatusHistoryEntry>>>,
    }

    impl ClaimRepository for MemoryRepository {
        fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError> {
            let mut guard = self.claims.lock().expect("lock");
            if guard.contains_key(&claim.claim_number.0) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(claim.claim_number.0.clone(), claim.clone());
            Ok(claim)
        }

        fn apply(
            &self,
            claim: Claim,
            entry: StatusHistoryEntry,
        ) -> Result<Claim, RepositoryError> {
            let mut claims = self.claims.lock().expect("lock");
            let mut history = self.history.lock().expect("lock");
            if !claims.contains_key(&claim.claim_number.0) {
                return Err(RepositoryError::NotFound);
            }
            claims.insert(claim.claim_number.0.clone(), claim.clone());
            history.push(entry);
            Ok(claim)
        }

        fn fetch(&self, number: &ClaimNumber) -> Result<Option<Claim>, RepositoryError> {
            let guard = self.claims.lock().expect("lock");
            Ok(guard.get(&number.0).cloned())
        }

        fn history(
            &self,
            number: &ClaimNumber,
        ) -> Result<Vec<StatusHistoryEntry>, RepositoryError> {
            let guard = self.history.lock().expect("lock");
            Ok(guard
                .iter()
                .filter(|entry| entry.claim_number == *number)
                .cloned()
                .collect())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryNotifier {
        events: Arc<Mutex<Vec<Notification>>>,
    }

    impl MemoryNotifier {
        pub(super) fn events(&self) -> Vec<Notification> {
            self.events.lock().expect("lock").clone()
        }
    }

    impl NotificationPublisher for MemoryNotifier {
        fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
            self.events.lock().expect("lock").push(notification);
            Ok(())
        }
    }

    pub(super) fn build_service() -> (
        ClaimService<MemoryRepository, MemoryNotifier>,
        Arc<MemoryRepository>,
        Arc<MemoryNotifier>,
    ) {
        let repository = Arc::new(MemoryRepository::default());
        let notifier = Arc::new(MemoryNotifier::default());
        let config = BusinessConfig::from_entries([("CLAIM_SLA_DAYS", "15")]);
        let service = ClaimService::new(
            repository.clone(),
            notifier.clone(),
            thresholds(),
            &config,
        );
        (service, repository, notifier)
    }
}

mod lifecycle {
    use super::common::*;
    use coverdesk::catalog::Actor;
    use coverdesk::workflows::claims::{
        ClaimRepository, ClaimServiceError, ClaimStatus, SlaState, TransitionError,
        TransitionRequest,
    };

    fn step(target: ClaimStatus, actor: &Actor) -> TransitionRequest {
        TransitionRequest {
            target,
            actor: actor.clone(),
            reason: None,
            approved_amount: None,
        }
    }

    #[test]
    fn surveyor_path_settles_at_the_approved_amount() {
        let (service, repository, notifier) = build_service();
        let claim = service.submit(submission(180_000.0), day(1)).expect("claim");
        let number = claim.claim_number.clone();
        let admin = Actor::admin("adm-1", "Asha");

        for target in [
            ClaimStatus::UnderReview,
            ClaimStatus::SurveyorAssigned,
            ClaimStatus::UnderInvestigation,
            ClaimStatus::Assessed,
        ] {
            service
                .transition(&number, step(target, &admin), at(3))
                .expect("investigation step");
        }

        let mut approve = step(ClaimStatus::Approved, &admin);
        approve.approved_amount = Some(150_000.0);
        service.transition(&number, approve, at(8)).expect("approval");

        let settled = service
            .transition(&number, step(ClaimStatus::Settled, &admin), at(10))
            .expect("settlement");
        assert_eq!(settled.amount_settled, Some(150_000.0));

        let history = repository.history(&number).expect("history");
        assert_eq!(history.len(), 6);
        assert_eq!(history.last().map(|entry| entry.new_status), Some(ClaimStatus::Settled));

        let templates: Vec<String> = notifier
            .events()
            .into_iter()
            .map(|event| event.template)
            .collect();
        assert_eq!(templates, vec!["claim_approved", "claim_settled"]);
    }

    #[test]
    fn backoffice_cannot_approve_above_its_band() {
        let (service, _, _) = build_service();
        let claim = service.submit(submission(180_000.0), day(1)).expect("claim");
        let number = claim.claim_number.clone();
        let backoffice = Actor::backoffice("bo-1", "Ravi");

        service
            .transition(&number, step(ClaimStatus::UnderReview, &backoffice), at(2))
            .expect("review step");

        let mut approve = step(ClaimStatus::Approved, &backoffice);
        approve.approved_amount = Some(180_000.0);
        let result = service.transition(&number, approve, at(3));
        assert!(matches!(
            result,
            Err(ClaimServiceError::Transition(
                TransitionError::ExceedsApprovalAuthority { .. }
            ))
        ));
    }

    #[test]
    fn sla_follows_the_configured_window() {
        let (service, _, _) = build_service();
        let claim = service.submit(submission(30_000.0), day(1)).expect("claim");

        let open = service.sla_status(&claim, day(12));
        assert_eq!(open.state, SlaState::InProgress);
        assert_eq!(open.days_remaining, Some(4));

        let overdue = service.sla_status(&claim, day(20));
        assert_eq!(overdue.state, SlaState::Overdue);
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use coverdesk::catalog::Actor;
    use coverdesk::workflows::claims::{claim_router, ClaimStatus};
    use tower::ServiceExt;

    async fn submit_claim(router: &axum::Router, amount: f64) -> String {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/claims")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({
                    "policy_number": "POL-000031",
                    "insurance_type": "Health",
                    "claimant_id": "cust-11",
                    "description": "Planned surgery",
                    "amount_requested": amount,
                }))
                .expect("serialize submission"),
            ))
            .expect("request");
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        payload["claim_number"].as_str().expect("number").to_owned()
    }

    fn transition_request(claim_number: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/claims/{claim_number}/status"))
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
            .expect("request")
    }

    #[tokio::test]
    async fn invalid_transition_conflict_names_the_allowed_states() {
        let (service, _, _) = build_service();
        let router = claim_router(Arc::new(service));
        let claim_number = submit_claim(&router, 40_000.0).await;

        let response = router
            .oneshot(transition_request(
                &claim_number,
                json!({
                    "target": "SETTLED",
                    "actor": Actor::admin("adm-1", "Asha"),
                }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["current_status"], "SUBMITTED");
        assert_eq!(payload["allowed_transitions"], json!(["UNDER_REVIEW"]));
    }

    #[tokio::test]
    async fn authority_breach_is_forbidden() {
        let (service, _, _) = build_service();
        let router = claim_router(Arc::new(service));
        let claim_number = submit_claim(&router, 120_000.0).await;

        let review = router
            .clone()
            .oneshot(transition_request(
                &claim_number,
                json!({
                    "target": "UNDER_REVIEW",
                    "actor": Actor::backoffice("bo-1", "Ravi"),
                }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(review.status(), StatusCode::OK);

        let response = router
            .oneshot(transition_request(
                &claim_number,
                json!({
                    "target": "APPROVED",
                    "actor": Actor::backoffice("bo-1", "Ravi"),
                    "approved_amount": 120_000.0,
                }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["error"], "exceeds approval authority");
    }

    #[tokio::test]
    async fn get_claim_returns_record_history_and_sla() {
        let (service, _, _) = build_service();
        let router = claim_router(Arc::new(service));
        let claim_number = submit_claim(&router, 40_000.0).await;

        let review = router
            .clone()
            .oneshot(transition_request(
                &claim_number,
                json!({
                    "target": "UNDER_REVIEW",
                    "actor": Actor::backoffice("bo-1", "Ravi"),
                }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(review.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/claims/{claim_number}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload["status"],
            json!(ClaimStatus::UnderReview)
        );
        assert_eq!(payload["history"].as_array().map(Vec::len), Some(1));
        assert_eq!(payload["sla"]["state"], "in_progress");
    }
}
