//! Coach-facing planner operations over one session's plan.
//!
//! Every mutation recomputes the derived state before returning, so callers
//! always observe a plan whose courts, rotation schedule, and activity
//! durations are consistent with each other.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::SessionApi,
    dto::{
        attendance::AttendanceUpdateRequest,
        drill::CreateDrillRequest,
        plan::{BootstrapDto, PlanSnapshot, SessionBootstrap},
    },
    error::ServiceError,
    plan::{
        self, attendance,
        model::{
            Activity, AttendanceStatus, Court, Drill, DrillId, Phase, PhaseKind, Plan, Player,
            PlayerGroup, PlayerId,
        },
        redistribute, rotation,
    },
};

/// Where a new activity's name comes from.
#[derive(Debug, Clone)]
pub enum ActivitySource {
    /// Reference a drill from the library; the activity takes its name.
    Drill(DrillId),
    /// Free-text activity typed by the coach.
    Custom(String),
}

/// Planning state for one session: the plan, the roster, and the drill
/// library, plus the store client used to persist changes.
pub struct PlannerSession {
    api: Arc<dyn SessionApi>,
    session_id: i64,
    session_duration: u32,
    plan: Plan,
    roster: Vec<Player>,
    drills: Vec<Drill>,
    tags: Vec<String>,
}

impl PlannerSession {
    /// Build a planner from the bootstrap payload.
    ///
    /// A payload that fails validation is fatal; there is no usable partial
    /// state to fall back to.
    pub fn from_bootstrap(
        api: Arc<dyn SessionApi>,
        bootstrap: BootstrapDto,
    ) -> Result<Self, ServiceError> {
        bootstrap.validate()?;
        let bootstrap: SessionBootstrap = bootstrap.into();

        let mut session = Self {
            api,
            session_id: bootstrap.session_id,
            session_duration: bootstrap.session_duration,
            plan: bootstrap.plan,
            roster: bootstrap.roster,
            drills: bootstrap.drills,
            tags: bootstrap.tags,
        };
        // A loaded plan is restored as the coach saved it: courts, assignments,
        // and activity durations stay untouched. Only the derived rotation
        // schedules are rebuilt.
        for index in 0..session.plan.timeline.len() {
            session.rebuild_phase_schedule(index);
        }

        info!(
            session_id = session.session_id,
            players = session.roster.len(),
            drills = session.drills.len(),
            "planner session ready"
        );
        Ok(session)
    }

    /// Current plan, always fully recomputed.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Session roster with current attendance statuses.
    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    /// Drill library, coach-authored drills included.
    pub fn drills(&self) -> &[Drill] {
        &self.drills
    }

    /// Tag vocabulary for drill filtering.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Planned session length in minutes.
    pub fn session_duration(&self) -> u32 {
        self.session_duration
    }

    /// Confirmed players not yet placed in any group.
    pub fn unassigned_players(&self) -> Vec<&Player> {
        let assigned = self.plan.assigned_player_ids();
        self.roster
            .iter()
            .filter(|player| {
                player.status == AttendanceStatus::Attending && !assigned.contains(&player.id)
            })
            .collect()
    }

    /// Add an empty, auto-lettered group.
    pub fn add_group(&mut self) -> Uuid {
        let group = PlayerGroup::new(self.plan.next_group_name());
        let group_id = group.id;
        self.plan.player_groups.push(group);
        plan::recompute(&mut self.plan);
        group_id
    }

    /// Remove a group; its members return to the unassigned pool and every
    /// court assignment referencing it is dropped.
    pub fn remove_group(&mut self, group_id: Uuid) -> Result<(), ServiceError> {
        if !self.plan.remove_group(group_id) {
            return Err(ServiceError::NotFound(format!("group {group_id}")));
        }
        plan::recompute(&mut self.plan);
        Ok(())
    }

    /// Move a player into `target` (or back to the unassigned pool for
    /// `None`). Only confirmed players can be placed in a group.
    pub fn move_player(
        &mut self,
        player_id: PlayerId,
        target: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let player = self
            .roster
            .iter()
            .find(|player| player.id == player_id)
            .ok_or_else(|| ServiceError::NotFound(format!("player {player_id}")))?;

        if target.is_some() && player.status != AttendanceStatus::Attending {
            return Err(ServiceError::InvalidState(format!(
                "player {player_id} has not confirmed attendance"
            )));
        }
        if let Some(group_id) = target
            && self.plan.group(group_id).is_none()
        {
            return Err(ServiceError::NotFound(format!("group {group_id}")));
        }

        self.plan.detach_player(player_id);
        if let Some(group_id) = target
            && let Some(group) = self.plan.group_mut(group_id)
        {
            group.player_ids.push(player_id);
        }
        plan::recompute(&mut self.plan);
        Ok(())
    }

    /// Append a phase to the timeline.
    pub fn add_phase(
        &mut self,
        kind: PhaseKind,
        name: &str,
        duration_minutes: u32,
    ) -> Result<Uuid, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("phase name is empty".into()));
        }
        if duration_minutes == 0 {
            return Err(ServiceError::InvalidInput(
                "phase duration must be at least one minute".into(),
            ));
        }

        let phase = Phase::new(kind, name.trim().to_string(), duration_minutes);
        let phase_id = phase.id;
        self.plan.timeline.push(phase);
        plan::recompute(&mut self.plan);
        Ok(phase_id)
    }

    /// Remove a phase; later phases shift earlier and their wall-clock
    /// windows are rebuilt.
    pub fn remove_phase(&mut self, phase_id: Uuid) -> Result<(), ServiceError> {
        let before = self.plan.timeline.len();
        self.plan.timeline.retain(|phase| phase.id != phase_id);
        if self.plan.timeline.len() == before {
            return Err(ServiceError::NotFound(format!("phase {phase_id}")));
        }
        plan::recompute(&mut self.plan);
        Ok(())
    }

    /// Change a phase's length, rebuilding its rotation and durations.
    pub fn set_phase_duration(
        &mut self,
        phase_id: Uuid,
        duration_minutes: u32,
    ) -> Result<(), ServiceError> {
        if duration_minutes == 0 {
            return Err(ServiceError::InvalidInput(
                "phase duration must be at least one minute".into(),
            ));
        }
        let phase = self
            .plan
            .phase_mut(phase_id)
            .ok_or_else(|| ServiceError::NotFound(format!("phase {phase_id}")))?;
        phase.duration_minutes = duration_minutes;
        plan::recompute(&mut self.plan);
        Ok(())
    }

    /// Toggle a phase editor open or closed. Presentation-only, so nothing is
    /// recomputed.
    pub fn set_phase_open(&mut self, phase_id: Uuid, is_open: bool) -> Result<(), ServiceError> {
        let phase = self
            .plan
            .phase_mut(phase_id)
            .ok_or_else(|| ServiceError::NotFound(format!("phase {phase_id}")))?;
        phase.is_open = is_open;
        Ok(())
    }

    /// Manually add a numbered court to a phase.
    ///
    /// The court survives until the next group or phase mutation re-syncs the
    /// phase to its target count.
    pub fn add_court(&mut self, phase_id: Uuid) -> Result<Uuid, ServiceError> {
        let index = self.phase_index(phase_id)?;
        let phase = &mut self.plan.timeline[index];
        let court = Court::numbered(phase.courts.len());
        let court_id = court.id;
        phase.courts.push(court);
        self.refresh_phase(index);
        Ok(court_id)
    }

    /// Manually remove a court and its activities from a phase.
    pub fn remove_court(&mut self, phase_id: Uuid, court_id: Uuid) -> Result<(), ServiceError> {
        let index = self.phase_index(phase_id)?;
        let phase = &mut self.plan.timeline[index];
        let before = phase.courts.len();
        phase.courts.retain(|court| court.id != court_id);
        if phase.courts.len() == before {
            return Err(ServiceError::NotFound(format!("court {court_id}")));
        }
        self.refresh_phase(index);
        Ok(())
    }

    /// Place a group on a court, detaching it from any other court of the
    /// same phase.
    pub fn assign_group_to_court(
        &mut self,
        phase_id: Uuid,
        court_id: Uuid,
        group_id: Uuid,
    ) -> Result<(), ServiceError> {
        if self.plan.group(group_id).is_none() {
            return Err(ServiceError::NotFound(format!("group {group_id}")));
        }
        let index = self.phase_index(phase_id)?;
        let phase = &mut self.plan.timeline[index];
        if phase.court(court_id).is_none() {
            return Err(ServiceError::NotFound(format!("court {court_id}")));
        }

        for court in &mut phase.courts {
            if court.id == court_id {
                if !court.assigned_group_ids.contains(&group_id) {
                    court.assigned_group_ids.push(group_id);
                }
            } else {
                court.assigned_group_ids.retain(|id| *id != group_id);
            }
        }
        self.refresh_phase(index);
        Ok(())
    }

    /// Append an activity to a court and re-split the court's time evenly.
    pub fn add_activity(
        &mut self,
        phase_id: Uuid,
        court_id: Uuid,
        source: ActivitySource,
    ) -> Result<(), ServiceError> {
        let activity = match source {
            ActivitySource::Drill(drill_id) => {
                let drill = self
                    .drills
                    .iter()
                    .find(|drill| drill.id == drill_id)
                    .ok_or_else(|| ServiceError::NotFound(format!("drill {drill_id}")))?;
                Activity {
                    name: drill.name.clone(),
                    drill_id: Some(drill_id),
                    duration_minutes: 0,
                }
            }
            ActivitySource::Custom(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ServiceError::InvalidInput("activity name is empty".into()));
                }
                Activity {
                    name,
                    drill_id: None,
                    duration_minutes: 0,
                }
            }
        };

        let phase = self
            .plan
            .phase_mut(phase_id)
            .ok_or_else(|| ServiceError::NotFound(format!("phase {phase_id}")))?;
        let available = phase.available_court_minutes();
        let court = phase
            .court_mut(court_id)
            .ok_or_else(|| ServiceError::NotFound(format!("court {court_id}")))?;

        court.activities.push(activity);
        redistribute::redistribute_all(court, available);
        Ok(())
    }

    /// Remove the activity at `index` and give its time back to the rest.
    pub fn remove_activity(
        &mut self,
        phase_id: Uuid,
        court_id: Uuid,
        index: usize,
    ) -> Result<(), ServiceError> {
        let phase = self
            .plan
            .phase_mut(phase_id)
            .ok_or_else(|| ServiceError::NotFound(format!("phase {phase_id}")))?;
        let available = phase.available_court_minutes();
        let court = phase
            .court_mut(court_id)
            .ok_or_else(|| ServiceError::NotFound(format!("court {court_id}")))?;
        if index >= court.activities.len() {
            return Err(ServiceError::InvalidInput(format!(
                "no activity at position {index}"
            )));
        }

        redistribute::remove_activity(court, index, available);
        Ok(())
    }

    /// Manually set an activity's duration; the remainder cascades into the
    /// activities after it.
    pub fn set_activity_duration(
        &mut self,
        phase_id: Uuid,
        court_id: Uuid,
        index: usize,
        minutes: u32,
    ) -> Result<(), ServiceError> {
        let phase = self
            .plan
            .phase_mut(phase_id)
            .ok_or_else(|| ServiceError::NotFound(format!("phase {phase_id}")))?;
        let available = phase.available_court_minutes();
        let court = phase
            .court_mut(court_id)
            .ok_or_else(|| ServiceError::NotFound(format!("court {court_id}")))?;
        if index >= court.activities.len() {
            return Err(ServiceError::InvalidInput(format!(
                "no activity at position {index}"
            )));
        }

        redistribute::edit_duration(court, index, minutes, available);
        Ok(())
    }

    /// Cycle a player's attendance status and report it to the store.
    ///
    /// The change is applied locally first; a failed report rolls everything
    /// back, the group slot included.
    pub async fn cycle_attendance(
        &mut self,
        player_id: PlayerId,
    ) -> Result<AttendanceStatus, ServiceError> {
        let change = attendance::cycle_status(&mut self.plan, &mut self.roster, player_id)
            .ok_or_else(|| ServiceError::NotFound(format!("player {player_id}")))?;
        plan::recompute(&mut self.plan);

        let request = AttendanceUpdateRequest {
            player_id,
            status: change.current,
        };
        if let Err(err) = self.api.update_attendance(self.session_id, request).await {
            warn!(error = %err, player_id, "attendance report failed, rolling back");
            attendance::rollback_status(&mut self.plan, &mut self.roster, &change);
            plan::recompute(&mut self.plan);
            return Err(err.into());
        }

        debug!(player_id, status = ?change.current, "attendance updated");
        Ok(change.current)
    }

    /// Persist the current plan. One shot; a failure leaves the local plan
    /// untouched and is surfaced to the caller.
    pub async fn save(&self) -> Result<(), ServiceError> {
        let snapshot = PlanSnapshot::capture(&self.plan);
        self.api.save_plan(self.session_id, snapshot).await?;
        info!(session_id = self.session_id, "plan saved");
        Ok(())
    }

    /// Store a coach-authored drill and add it to the local library.
    pub async fn create_drill(
        &mut self,
        request: CreateDrillRequest,
    ) -> Result<DrillId, ServiceError> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("drill name is empty".into()));
        }

        let created = self.api.create_custom_drill(request).await?;
        let drill: Drill = created.into();
        let drill_id = drill.id;
        self.drills.push(drill);
        Ok(drill_id)
    }

    fn phase_index(&self, phase_id: Uuid) -> Result<usize, ServiceError> {
        self.plan
            .phase_index(phase_id)
            .ok_or_else(|| ServiceError::NotFound(format!("phase {phase_id}")))
    }

    /// Rebuild the derived state of one phase after a manual court mutation,
    /// leaving the court list itself as the coach arranged it.
    fn refresh_phase(&mut self, index: usize) {
        self.rebuild_phase_schedule(index);

        let phase = &mut self.plan.timeline[index];
        let available = phase.available_court_minutes();
        for court in &mut phase.courts {
            redistribute::redistribute_all(court, available);
        }
    }

    /// Rebuild a phase's rotation schedule from its current seed assignments,
    /// without touching courts or activity durations.
    fn rebuild_phase_schedule(&mut self, index: usize) {
        let start_time = self.plan.start_time.clone();
        let offset = self.plan.phase_offset_minutes(index);
        let phase = &mut self.plan.timeline[index];

        if phase.kind == PhaseKind::Rotation {
            rotation::rebuild_rotation(phase, &start_time, offset);
        } else {
            phase.blocks.clear();
            phase.rotation_minutes = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiResult};
    use crate::dto::{drill::DrillDto, live::LiveStateDto, plan::PlanSnapshot};
    use futures::future::BoxFuture;

    struct StubApi {
        fail_posts: bool,
    }

    impl SessionApi for StubApi {
        fn fetch_live_state(&self, _: i64) -> BoxFuture<'static, ApiResult<LiveStateDto>> {
            unreachable!("planner tests never poll");
        }

        fn update_attendance(
            &self,
            _: i64,
            _: AttendanceUpdateRequest,
        ) -> BoxFuture<'static, ApiResult<()>> {
            let fail = self.fail_posts;
            Box::pin(async move {
                if fail {
                    Err(ApiError::Session {
                        message: "roster locked".into(),
                    })
                } else {
                    Ok(())
                }
            })
        }

        fn save_plan(&self, _: i64, _: PlanSnapshot) -> BoxFuture<'static, ApiResult<()>> {
            let fail = self.fail_posts;
            Box::pin(async move {
                if fail {
                    Err(ApiError::Session {
                        message: "save rejected".into(),
                    })
                } else {
                    Ok(())
                }
            })
        }

        fn fetch_bootstrap(&self, _: i64) -> BoxFuture<'static, ApiResult<BootstrapDto>> {
            unreachable!("planner tests construct their own bootstrap");
        }

        fn create_custom_drill(
            &self,
            request: CreateDrillRequest,
        ) -> BoxFuture<'static, ApiResult<DrillDto>> {
            Box::pin(async move {
                Ok(DrillDto {
                    id: 900,
                    name: request.name,
                    category: request.category,
                    difficulty: request.difficulty,
                    description: request.description,
                    duration_minutes: request.duration,
                    video_url: request.video_url,
                })
            })
        }
    }

    fn session(fail_posts: bool) -> PlannerSession {
        let raw = r#"{
            "sessionId": 5,
            "sessionStartTime": "09:00",
            "sessionDuration": 60,
            "players": [
                {"id": 1, "name": "Asha", "status": "ATTENDING"},
                {"id": 2, "name": "Ben", "status": "PENDING"}
            ],
            "drills": [{
                "id": 42,
                "name": "Boast drill",
                "category": "Technique",
                "difficulty": "Intermediate",
                "duration_minutes": 10
            }]
        }"#;
        let bootstrap: BootstrapDto = serde_json::from_str(raw).unwrap();
        PlannerSession::from_bootstrap(Arc::new(StubApi { fail_posts }), bootstrap).unwrap()
    }

    #[test]
    fn groups_are_lettered_and_courts_follow() {
        let mut session = session(false);
        session.add_group();
        session.add_group();
        let phase_id = session
            .add_phase(PhaseKind::Rotation, "Rotation", 30)
            .unwrap();

        let phase = session.plan().phase(phase_id).unwrap();
        assert_eq!(session.plan().player_groups[1].name, "Group B");
        assert_eq!(phase.courts.len(), 2);
        assert_eq!(phase.rotation_minutes, 15);
        assert_eq!(phase.blocks.len(), 2);
    }

    #[test]
    fn only_confirmed_players_can_join_a_group() {
        let mut session = session(false);
        let group_id = session.add_group();

        session.move_player(1, Some(group_id)).unwrap();
        assert_eq!(session.plan().player_groups[0].player_ids, vec![1]);

        let rejected = session.move_player(2, Some(group_id));
        assert!(matches!(rejected, Err(ServiceError::InvalidState(_))));
        assert!(session.unassigned_players().is_empty());
    }

    #[test]
    fn activities_take_their_name_from_the_library() {
        let mut session = session(false);
        session.add_group();
        let phase_id = session.add_phase(PhaseKind::Warmup, "Warmup", 10).unwrap();
        let court_id = session.plan().phase(phase_id).unwrap().courts[0].id;

        session
            .add_activity(phase_id, court_id, ActivitySource::Drill(42))
            .unwrap();
        let court = session.plan().phase(phase_id).unwrap().court(court_id).unwrap();
        assert_eq!(court.activities[0].name, "Boast drill");
        assert_eq!(court.activities[0].duration_minutes, 10);

        let unknown = session.add_activity(phase_id, court_id, ActivitySource::Drill(999));
        assert!(matches!(unknown, Err(ServiceError::NotFound(_))));

        let blank = session.add_activity(phase_id, court_id, ActivitySource::Custom("  ".into()));
        assert!(matches!(blank, Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn shortening_a_phase_rebuilds_its_schedule() {
        let mut session = session(false);
        session.add_group();
        session.add_group();
        let phase_id = session
            .add_phase(PhaseKind::Rotation, "Rotation", 30)
            .unwrap();

        session.set_phase_duration(phase_id, 20).unwrap();
        let phase = session.plan().phase(phase_id).unwrap();
        assert_eq!(phase.rotation_minutes, 10);
        assert_eq!(phase.blocks[1].start_time, "09:10");
    }

    #[test]
    fn manual_courts_survive_until_the_next_group_change() {
        let mut session = session(false);
        session.add_group();
        let phase_id = session
            .add_phase(PhaseKind::Freeplay, "Freeplay", 20)
            .unwrap();
        assert_eq!(session.plan().phase(phase_id).unwrap().courts.len(), 1);

        session.add_court(phase_id).unwrap();
        assert_eq!(session.plan().phase(phase_id).unwrap().courts.len(), 2);

        // The next group mutation re-syncs the phase to its target count.
        session.add_group();
        assert_eq!(session.plan().phase(phase_id).unwrap().courts.len(), 2);
        session.remove_group(session.plan().player_groups[1].id).unwrap();
        assert_eq!(session.plan().phase(phase_id).unwrap().courts.len(), 1);
    }

    #[test]
    fn saved_court_arrangements_survive_a_load() {
        let raw = r#"{
            "sessionId": 5,
            "sessionStartTime": "09:00",
            "sessionDuration": 60,
            "players": [{"id": 1, "name": "Asha", "status": "ATTENDING"}],
            "drills": [],
            "plan": {
                "startTime": "09:00",
                "playerGroups": [{
                    "id": "11111111-1111-4111-8111-111111111111",
                    "name": "Group A",
                    "player_ids": [1]
                }],
                "timeline": [{
                    "id": "22222222-2222-4222-8222-222222222222",
                    "type": "freeplay",
                    "name": "Freeplay",
                    "duration": 20,
                    "courts": [
                        {
                            "id": "33333333-3333-4333-8333-333333333333",
                            "name": "Court 1",
                            "assignedGroupIds": ["11111111-1111-4111-8111-111111111111"],
                            "activities": []
                        },
                        {
                            "id": "44444444-4444-4444-8444-444444444444",
                            "name": "Court 2",
                            "assignedGroupIds": [],
                            "activities": [
                                {"name": "Ghosting", "duration": 14},
                                {"name": "Length game", "duration": 6}
                            ]
                        }
                    ]
                }]
            }
        }"#;
        let bootstrap: BootstrapDto = serde_json::from_str(raw).unwrap();
        let session =
            PlannerSession::from_bootstrap(Arc::new(StubApi { fail_posts: false }), bootstrap)
                .unwrap();

        // One group would allocate a single court; the saved second court and
        // its activities come back as the coach arranged them.
        let phase = &session.plan().timeline[0];
        assert_eq!(phase.courts.len(), 2);
        assert_eq!(phase.courts[1].name, "Court 2");
        let durations: Vec<u32> = phase.courts[1]
            .activities
            .iter()
            .map(|a| a.duration_minutes)
            .collect();
        assert_eq!(durations, vec![14, 6]);
    }

    #[tokio::test]
    async fn failed_attendance_report_rolls_back() {
        let mut session = session(true);
        let group_id = session.add_group();
        session.move_player(1, Some(group_id)).unwrap();

        let outcome = session.cycle_attendance(1).await;
        assert!(matches!(outcome, Err(ServiceError::Api(_))));
        assert_eq!(session.roster()[0].status, AttendanceStatus::Attending);
        assert_eq!(session.plan().player_groups[0].player_ids, vec![1]);
    }

    #[tokio::test]
    async fn successful_attendance_report_sticks() {
        let mut session = session(false);
        let status = session.cycle_attendance(2).await.unwrap();
        assert_eq!(status, AttendanceStatus::Attending);
        assert_eq!(session.roster()[1].status, AttendanceStatus::Attending);
    }

    #[tokio::test]
    async fn save_surfaces_store_failures() {
        let session = session(true);
        assert!(matches!(session.save().await, Err(ServiceError::Api(_))));
    }

    #[tokio::test]
    async fn created_drills_join_the_local_library() {
        let mut session = session(false);
        let drill_id = session
            .create_drill(CreateDrillRequest {
                name: "Ghosting ladder".into(),
                category: "Conditioning".into(),
                difficulty: "Advanced".into(),
                description: String::new(),
                duration: 5,
                video_url: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(drill_id, 900);
        assert!(session.drills().iter().any(|d| d.id == 900));
    }
}
