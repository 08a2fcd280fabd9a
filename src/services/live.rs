//! Lifecycle of the live display: owns the poll task, the timer engine, and
//! the display channel.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::wrappers::WatchStream;
use tracing::info;

use crate::{
    api::SessionApi,
    live::{display::DisplayState, engine::TimerEngine, poller},
};

/// Runs the live view of one session.
///
/// `start` spawns the poll loop; `shutdown` cancels it and every countdown.
/// Both are idempotent, and `start` on a running service tears the old run
/// down first. The epoch counter guards against a poll round trip that
/// resolves after its run was torn down.
pub struct LiveService {
    api: Arc<dyn SessionApi>,
    session_id: i64,
    poll_interval: Duration,
    engine: Arc<TimerEngine>,
    display: watch::Sender<DisplayState>,
    poll_task: Option<JoinHandle<()>>,
    epoch: Arc<AtomicU64>,
}

impl LiveService {
    /// Build a service for `session_id`; nothing runs until [`Self::start`].
    pub fn new(api: Arc<dyn SessionApi>, session_id: i64, poll_interval: Duration) -> Self {
        let (display, _) = watch::channel(DisplayState::Loading);
        Self {
            api,
            session_id,
            poll_interval,
            engine: Arc::new(TimerEngine::default()),
            display,
            poll_task: None,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start polling. A running service is torn down and restarted from a
    /// fresh `Loading` state.
    pub fn start(&mut self) {
        self.shutdown();
        self.display.send_replace(DisplayState::Loading);

        let epoch = self.epoch.load(Ordering::SeqCst);
        info!(session_id = self.session_id, "starting live display");
        self.poll_task = Some(tokio::spawn(poller::run_poll_loop(
            Arc::clone(&self.api),
            self.session_id,
            self.poll_interval,
            Arc::clone(&self.engine),
            self.display.clone(),
            Arc::clone(&self.epoch),
            epoch,
        )));
    }

    /// Cancel the poll loop and every countdown. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.poll_task.take() {
            task.abort();
            info!(session_id = self.session_id, "live display stopped");
        }
        self.engine.stop_all();
    }

    /// Stream of display states, starting from the current one.
    pub fn subscribe(&self) -> WatchStream<DisplayState> {
        WatchStream::new(self.display.subscribe())
    }

    /// Latest display state.
    pub fn display(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    /// Timer engine holding the countdowns of the current view.
    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }
}

impl Drop for LiveService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{ApiError, ApiResult},
        dto::{
            attendance::AttendanceUpdateRequest,
            drill::{CreateDrillRequest, DrillDto},
            live::LiveStateDto,
            plan::{BootstrapDto, PlanSnapshot},
        },
        live::display::{MASTER_TIMER, PHASE_TIMER},
    };
    use futures::future::BoxFuture;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::sleep;

    /// Serves a canned reply per poll, then errors.
    struct ScriptedApi {
        replies: Mutex<VecDeque<LiveStateDto>>,
    }

    impl ScriptedApi {
        fn new(raw_replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(
                    raw_replies
                        .iter()
                        .map(|raw| serde_json::from_str(raw).unwrap())
                        .collect(),
                ),
            })
        }
    }

    impl SessionApi for ScriptedApi {
        fn fetch_live_state(&self, _: i64) -> BoxFuture<'static, ApiResult<LiveStateDto>> {
            let next = self.replies.lock().unwrap().pop_front();
            Box::pin(async move {
                next.ok_or(ApiError::Session {
                    message: "no more scripted replies".into(),
                })
            })
        }

        fn update_attendance(
            &self,
            _: i64,
            _: AttendanceUpdateRequest,
        ) -> BoxFuture<'static, ApiResult<()>> {
            unreachable!("live tests never update attendance");
        }

        fn save_plan(&self, _: i64, _: PlanSnapshot) -> BoxFuture<'static, ApiResult<()>> {
            unreachable!("live tests never save");
        }

        fn fetch_bootstrap(&self, _: i64) -> BoxFuture<'static, ApiResult<BootstrapDto>> {
            unreachable!("live tests never bootstrap");
        }

        fn create_custom_drill(
            &self,
            _: CreateDrillRequest,
        ) -> BoxFuture<'static, ApiResult<DrillDto>> {
            unreachable!("live tests never create drills");
        }
    }

    const ACTIVE_REPLY: &str = r#"{
        "sessionStatus": "active",
        "sessionTitle": "Juniors : 09:00 - 10:00",
        "totalTimeLeft": 1800,
        "currentPhase": {"name": "Rotation", "timeLeft": 300, "duration": 600},
        "courts": []
    }"#;

    #[tokio::test(start_paused = true)]
    async fn polling_drives_the_display_and_the_timers() {
        let api = ScriptedApi::new(&[ACTIVE_REPLY]);
        let mut service = LiveService::new(api, 5, Duration::from_secs(5));
        service.start();

        sleep(Duration::from_millis(10)).await;
        assert!(matches!(&*service.display().borrow(), DisplayState::Active(_)));
        assert!(service.engine().is_running(MASTER_TIMER));
        assert!(service.engine().is_running(PHASE_TIMER));
    }

    #[tokio::test(start_paused = true)]
    async fn a_failed_poll_freezes_the_display() {
        let api = ScriptedApi::new(&[ACTIVE_REPLY]);
        let mut service = LiveService::new(api, 5, Duration::from_secs(5));
        service.start();

        sleep(Duration::from_millis(10)).await;
        assert!(matches!(&*service.display().borrow(), DisplayState::Active(_)));

        // The second poll has no scripted reply and fails.
        sleep(Duration::from_secs(6)).await;
        assert!(matches!(&*service.display().borrow(), DisplayState::Failed { .. }));
        assert!(service.engine().registered_ids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn replies_that_resolve_after_teardown_are_discarded() {
        let api = ScriptedApi::new(&[ACTIVE_REPLY]);
        let engine = Arc::new(TimerEngine::default());
        let (tx, rx) = watch::channel(DisplayState::Loading);

        // The loop was started under epoch 0; the bump invalidates its replies.
        let epoch = Arc::new(AtomicU64::new(1));
        poller::run_poll_loop(api, 5, Duration::from_secs(5), Arc::clone(&engine), tx, epoch, 0)
            .await;

        assert!(engine.registered_ids().is_empty());
        assert_eq!(*rx.borrow(), DisplayState::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_polling_and_timers() {
        let api = ScriptedApi::new(&[ACTIVE_REPLY, ACTIVE_REPLY]);
        let mut service = LiveService::new(api, 5, Duration::from_secs(5));
        service.start();

        sleep(Duration::from_millis(10)).await;
        service.shutdown();
        assert!(service.engine().registered_ids().is_empty());

        // No further polls run after shutdown.
        sleep(Duration::from_secs(12)).await;
        assert!(service.engine().registered_ids().is_empty());
        service.shutdown();
    }
}
