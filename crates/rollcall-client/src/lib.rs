// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST adapter for the gym attendance API.
//!
//! [`RestAdapter`] implements [`ClassCatalog`], [`EnrollmentDirectory`] and
//! [`AttendanceStore`] over one pooled [`ApiClient`], translating the API's
//! wire shapes into domain types.

pub mod auth;
pub mod client;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use rollcall_config::model::ApiConfig;
use rollcall_core::{
    Adapter, AttendanceRecord, AttendanceStore, ClassCatalog, ClassId, ClassOffering, Enrollment,
    EnrollmentDirectory, HealthStatus, MarkRequest, RollcallError, SessionDate,
    SessionView,
};
use tracing::{debug, info, warn};

pub use auth::{StaticToken, TokenSource};
pub use client::{ApiClient, Target};

use types::{
    AttendanceRecordDto, ClassDetailsDto, EnrollmentDto, Envelope, LockSessionBody, SessionDto,
    UpdatePresenceBody,
};

/// Remote implementation of every attendance port.
#[derive(Debug, Clone)]
pub struct RestAdapter {
    client: ApiClient,
}

impl RestAdapter {
    /// Builds the adapter from the `[api]` section, using its static token.
    pub fn new(config: &ApiConfig) -> Result<Self, RollcallError> {
        let tokens = StaticToken::from_config(config.token.as_deref());
        if config.token.is_none() {
            warn!("no api.token configured, requests will be unauthenticated");
        }
        Self::with_token_source(config, Arc::new(tokens))
    }

    /// Builds the adapter with a caller-supplied token source.
    pub fn with_token_source(
        config: &ApiConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, RollcallError> {
        let client = ApiClient::new(config, tokens)?;
        debug!(base_url = client.base_url(), "REST adapter initialized");
        Ok(Self { client })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

fn require_id(kind: &str, value: &str) -> Result<(), RollcallError> {
    if value.trim().is_empty() || value.contains('/') {
        return Err(RollcallError::Validation(format!("invalid {kind} id `{value}`")));
    }
    Ok(())
}

#[async_trait]
impl Adapter for RestAdapter {
    fn name(&self) -> &str {
        "rest"
    }

    async fn health_check(&self) -> Result<HealthStatus, RollcallError> {
        match self.client.probe().await {
            Ok(status) if status.is_server_error() => Ok(HealthStatus::Degraded(format!(
                "{} answered HTTP {}",
                self.client.base_url(),
                status.as_u16()
            ))),
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.user_message())),
        }
    }
}

#[async_trait]
impl ClassCatalog for RestAdapter {
    async fn class_offering(&self, class_id: &ClassId) -> Result<ClassOffering, RollcallError> {
        require_id("class", class_id.as_str())?;
        let details: Envelope<ClassDetailsDto> = self
            .client
            .get(
                &format!("/classes/{class_id}/details"),
                &Target::new("class", class_id.as_str()),
            )
            .await?;
        details.into_inner().into_offering(class_id)
    }

    async fn sessions(&self, class_id: &ClassId) -> Result<Vec<SessionView>, RollcallError> {
        require_id("class", class_id.as_str())?;
        let sessions: Envelope<Vec<SessionDto>> = self
            .client
            .get(
                &format!("/attendances/class/{class_id}/sessions"),
                &Target::new("class", class_id.as_str()),
            )
            .await?;
        Ok(sessions.into_inner().into_iter().map(SessionView::from).collect())
    }
}

#[async_trait]
impl EnrollmentDirectory for RestAdapter {
    async fn roster(&self, class_id: &ClassId) -> Result<Vec<Enrollment>, RollcallError> {
        require_id("class", class_id.as_str())?;
        let roster: Envelope<Vec<EnrollmentDto>> = self
            .client
            .get(
                &format!("/classes/{class_id}/enrollments"),
                &Target::new("class", class_id.as_str()),
            )
            .await?;
        Ok(roster
            .into_inner()
            .into_iter()
            .map(|e| e.into_enrollment(class_id))
            .collect())
    }
}

#[async_trait]
impl AttendanceStore for RestAdapter {
    async fn records_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<AttendanceRecord>, RollcallError> {
        require_id("class", class_id.as_str())?;
        let records: Envelope<Vec<AttendanceRecordDto>> = self
            .client
            .get(
                &format!("/attendance/class/{class_id}"),
                &Target::new("class", class_id.as_str()),
            )
            .await?;
        Ok(records
            .into_inner()
            .into_iter()
            .map(AttendanceRecord::from)
            .collect())
    }

    async fn mark(&self, request: &MarkRequest) -> Result<AttendanceRecord, RollcallError> {
        request.validate()?;
        let target = Target::new(
            "attendance",
            format!(
                "{}/{}/{}",
                request.class_id, request.user_id, request.session_number
            ),
        )
        .on_session(&request.class_id, request.session_date);

        let record: Envelope<AttendanceRecordDto> = self
            .client
            .send(Method::POST, "/attendance/mark", request, &target)
            .await?;
        let record = AttendanceRecord::from(record.into_inner());
        debug!(
            class_id = %record.class_id,
            user_id = %record.user_id,
            session_number = record.session_number,
            is_present = record.is_present,
            "attendance marked"
        );
        Ok(record)
    }

    async fn update_presence(
        &self,
        record: &AttendanceRecord,
        is_present: bool,
    ) -> Result<AttendanceRecord, RollcallError> {
        let record_id = &record.id;
        require_id("record", record_id.as_str())?;
        let target = Target::new("attendance record", record_id.as_str())
            .on_session(&record.class_id, record.session_date);

        let updated: Envelope<AttendanceRecordDto> = self
            .client
            .send(
                Method::PUT,
                &format!("/attendance/{record_id}"),
                &UpdatePresenceBody { is_present },
                &target,
            )
            .await?;
        Ok(AttendanceRecord::from(updated.into_inner()))
    }

    async fn lock_session(
        &self,
        class_id: &ClassId,
        session_date: SessionDate,
    ) -> Result<(), RollcallError> {
        require_id("class", class_id.as_str())?;
        self.client
            .send_ack(
                Method::POST,
                "/attendance/lock-session",
                &LockSessionBody {
                    class_id,
                    session_date,
                },
                &Target::new("class", class_id.as_str()),
            )
            .await?;
        info!(class_id = %class_id, session_date = %session_date, "session locked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::{RecordId, SessionStatus};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(base_url: &str) -> RestAdapter {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            token: Some("t".into()),
            timeout_secs: 5,
            max_retries: 0,
            retry_delay_ms: 1,
        };
        RestAdapter::new(&config).unwrap()
    }

    fn record_json(id: &str, user: &str, number: u32, date: &str, present: bool) -> serde_json::Value {
        serde_json::json!({
            "_id": id,
            "classId": "c1",
            "userId": {"_id": user, "fullName": "Someone"},
            "sessionNumber": number,
            "sessionDate": date,
            "isPresent": present,
            "isLocked": false
        })
    }

    fn stored_record(id: &str, date: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: RecordId::from(id),
            class_id: ClassId::from("c1"),
            user_id: "u1".into(),
            session_number: 2,
            session_date: SessionDate::parse(date).unwrap(),
            is_present: true,
            is_locked: false,
            marked_at: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn class_offering_fills_id_from_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/classes/c1/details"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "schedule": [
                    {"dayOfWeek": 1, "startTime": "18:00", "endTime": "19:00"},
                    {"dayOfWeek": 3, "startTime": "18:00", "endTime": "19:00"}
                ],
                "startDate": "2024-01-01T00:00:00.000Z",
                "endDate": "2024-01-31",
                "totalSessions": 8,
                "instructor": {"_id": "t1", "fullName": "Coach"}
            })))
            .mount(&server)
            .await;

        let offering = adapter(&server.uri())
            .class_offering(&ClassId::from("c1"))
            .await
            .unwrap();
        assert_eq!(offering.id.as_str(), "c1");
        assert_eq!(offering.total_sessions, 8);
        assert_eq!(offering.start_date.to_string(), "2024-01-01");
        assert_eq!(offering.instructor_id.unwrap().as_str(), "t1");
    }

    #[tokio::test]
    async fn roster_maps_populated_users() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/classes/c1/enrollments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"_id": "e1", "user": {"_id": "u1", "fullName": "Ada", "email": "a@x.io"}, "paymentStatus": true},
                {"user": {"_id": "u2", "fullName": "Grace"}}
            ])))
            .mount(&server)
            .await;

        let roster = adapter(&server.uri())
            .roster(&ClassId::from("c1"))
            .await
            .unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].user_id.as_str(), "u1");
        assert!(roster[0].payment_status);
        assert_eq!(roster[1].display_name(), "Grace");
    }

    #[tokio::test]
    async fn records_for_session_filters_by_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/attendance/class/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                record_json("r1", "u1", 1, "2024-01-01", true),
                record_json("r2", "u1", 2, "2024-01-03", false)
            ])))
            .mount(&server)
            .await;

        let date = SessionDate::parse("2024-01-03").unwrap();
        let records = adapter(&server.uri())
            .records_for_session(&ClassId::from("c1"), date)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_str(), "r2");
    }

    #[tokio::test]
    async fn mark_posts_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/attendance/mark"))
            .and(body_json(serde_json::json!({
                "classId": "c1",
                "userId": "u1",
                "sessionNumber": 2,
                "sessionDate": "2024-01-03",
                "isPresent": true,
                "notes": null
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(record_json("r9", "u1", 2, "2024-01-03", true)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = MarkRequest {
            class_id: ClassId::from("c1"),
            user_id: "u1".into(),
            session_number: 2,
            session_date: SessionDate::parse("2024-01-03").unwrap(),
            is_present: true,
            notes: None,
        };
        let record = adapter(&server.uri()).mark(&request).await.unwrap();
        assert_eq!(record.id.as_str(), "r9");
        assert!(record.is_present);
    }

    #[tokio::test]
    async fn update_presence_puts_flag() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/attendance/r1"))
            .and(body_json(serde_json::json!({"isPresent": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": record_json("r1", "u1", 1, "2024-01-01", false)
            })))
            .mount(&server)
            .await;

        let record = adapter(&server.uri())
            .update_presence(&stored_record("r1", "2024-01-01"), false)
            .await
            .unwrap();
        assert!(!record.is_present);
    }

    #[tokio::test]
    async fn update_on_locked_date_maps_to_locked() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/attendance/r1"))
            .respond_with(
                ResponseTemplate::new(423)
                    .set_body_json(serde_json::json!({"message": "session is locked"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = adapter(&server.uri())
            .update_presence(&stored_record("r1", "2024-01-03"), false)
            .await
            .unwrap_err();
        assert!(err.is_locked(), "got: {err:?}");
        match err {
            RollcallError::Locked {
                class_id,
                session_date,
            } => {
                assert_eq!(class_id.as_str(), "c1");
                assert_eq!(session_date.to_string(), "2024-01-03");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn lock_session_accepts_empty_ack() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/attendance/lock-session"))
            .and(body_json(serde_json::json!({"classId": "c1", "sessionDate": "2024-01-03"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        adapter(&server.uri())
            .lock_session(&ClassId::from("c1"), SessionDate::parse("2024-01-03").unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sessions_parse_status_and_attendees() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/attendances/class/c1/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"sessionNumber": 1, "date": "2024-01-01", "status": "completed", "attendees": ["u1"]},
                {"sessionNumber": 2, "date": "2024-01-03", "status": "scheduled"}
            ])))
            .mount(&server)
            .await;

        let sessions = adapter(&server.uri())
            .sessions(&ClassId::from("c1"))
            .await
            .unwrap();
        assert_eq!(sessions[0].status, SessionStatus::Completed);
        assert_eq!(sessions[0].attendee_ids.len(), 1);
        assert_eq!(sessions[1].status, SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn blank_class_id_is_rejected_locally() {
        let err = adapter("http://127.0.0.1:9")
            .roster(&ClassId::from(" "))
            .await
            .unwrap_err();
        assert!(matches!(err, RollcallError::Validation(_)));
    }

    #[tokio::test]
    async fn health_check_reports_reachable_server() {
        let server = MockServer::start().await;
        let status = adapter(&server.uri()).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }
}
