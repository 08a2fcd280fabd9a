//! Fixed-interval poll loop feeding the display state and the timer engine.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error};

use crate::{
    api::SessionApi,
    dto::live::LiveStateDto,
    live::{
        display::{DisplayState, MASTER_TIMER, PHASE_TIMER, WAITING_TIMER, court_timer_id},
        engine::TimerEngine,
    },
};

/// Clamp a server-reported seconds value into a countdown anchor.
fn seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

/// Apply one snapshot: re-anchor every countdown it describes, cancel the
/// ones it no longer mentions, then publish the derived view.
///
/// The whole snapshot is applied as a unit so the display never mixes two
/// polls.
pub(crate) fn apply_snapshot(
    engine: &TimerEngine,
    display: &watch::Sender<DisplayState>,
    state: &LiveStateDto,
) {
    let view = DisplayState::from_snapshot(state);

    let mut wanted: Vec<String> = Vec::new();
    match &view {
        DisplayState::Waiting(waiting) => {
            if waiting.has_countdown
                && let Some(time_to_start) = state.time_to_start
            {
                let anchor = seconds(time_to_start);
                engine.start_or_replace(WAITING_TIMER, anchor, anchor);
                wanted.push(WAITING_TIMER.to_string());
            }
        }
        DisplayState::Active(active) => {
            if let Some(total_left) = state.total_time_left {
                engine.start_or_replace(MASTER_TIMER, seconds(total_left), seconds(total_left));
                wanted.push(MASTER_TIMER.to_string());
            }
            if let Some(phase) = &state.current_phase {
                engine.start_or_replace(
                    PHASE_TIMER,
                    seconds(phase.time_left),
                    seconds(phase.duration),
                );
                wanted.push(PHASE_TIMER.to_string());
            }
            for (panel, court) in active
                .courts
                .iter()
                .zip(state.courts.as_deref().unwrap_or_default())
            {
                let id = court_timer_id(&panel.court_name);
                engine.start_or_replace(
                    &id,
                    seconds(court.current_activity.time_left),
                    seconds(court.current_activity.duration),
                );
                wanted.push(id);
            }
        }
        DisplayState::Loading
        | DisplayState::Finished { .. }
        | DisplayState::Failed { .. } => {}
    }

    // Cancel countdowns the snapshot no longer mentions.
    for id in engine.registered_ids() {
        if !wanted.contains(&id) {
            engine.stop(&id);
        }
    }

    // The channel keeps the value even while nobody is subscribed, so a late
    // subscriber still sees the latest snapshot.
    display.send_replace(view);
}

/// Poll the live-state endpoint on a fixed cadence until it fails.
///
/// Every reply is checked against `epoch` before being applied, so a round
/// trip that resolves after a teardown bumped the epoch is discarded instead
/// of resurrecting timers. The first poll fires immediately.
pub(crate) async fn run_poll_loop(
    api: Arc<dyn SessionApi>,
    session_id: i64,
    interval: Duration,
    engine: Arc<TimerEngine>,
    display: watch::Sender<DisplayState>,
    epoch: Arc<AtomicU64>,
    started_at: u64,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;

        let outcome = api.fetch_live_state(session_id).await;
        if epoch.load(Ordering::SeqCst) != started_at {
            debug!(session_id, "discarding live state that resolved after teardown");
            return;
        }

        match outcome {
            Ok(state) => apply_snapshot(&engine, &display, &state),
            Err(err) => {
                error!(error = %err, session_id, "live state poll failed, freezing display");
                engine.stop_all();
                display.send_replace(DisplayState::Failed {
                    message: err.to_string(),
                });
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TimerEngine, watch::Sender<DisplayState>, watch::Receiver<DisplayState>) {
        let engine = TimerEngine::default();
        let (tx, rx) = watch::channel(DisplayState::Loading);
        (engine, tx, rx)
    }

    fn snapshot(raw: &str) -> LiveStateDto {
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn active_snapshot_starts_every_described_timer() {
        let (engine, tx, rx) = setup();
        let state = snapshot(
            r#"{
                "sessionStatus": "active",
                "totalTimeLeft": 1800,
                "currentPhase": {"name": "Rotation", "timeLeft": 300, "duration": 600},
                "courts": [{
                    "courtName": "Court 1",
                    "playerGroup": "Group A",
                    "players": [],
                    "currentActivity": {"name": "Boast drill", "timeLeft": 120, "duration": 300}
                }]
            }"#,
        );

        apply_snapshot(&engine, &tx, &state);

        assert_eq!(engine.frame(MASTER_TIMER).unwrap().remaining, 1800);
        assert_eq!(engine.frame(PHASE_TIMER).unwrap().remaining, 300);
        assert_eq!(engine.frame("activity-Court 1").unwrap().remaining, 120);
        assert!(matches!(&*rx.borrow(), DisplayState::Active(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_cancels_timers_it_no_longer_mentions() {
        let (engine, tx, _rx) = setup();
        engine.start_or_replace("activity-Court 9", 500, 500);

        let state = snapshot(
            r#"{
                "sessionStatus": "active",
                "totalTimeLeft": 900,
                "currentPhase": {"name": "Freeplay", "timeLeft": 900, "duration": 900},
                "courts": []
            }"#,
        );
        apply_snapshot(&engine, &tx, &state);

        assert!(engine.frame("activity-Court 9").is_none());
        assert!(engine.frame(MASTER_TIMER).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn snapshots_applied_without_a_subscriber_are_kept() {
        let engine = TimerEngine::default();
        let (tx, rx) = watch::channel(DisplayState::Loading);
        drop(rx);

        let state = snapshot(
            r#"{
                "sessionStatus": "active",
                "totalTimeLeft": 900,
                "currentPhase": {"name": "Freeplay", "timeLeft": 900, "duration": 900},
                "courts": []
            }"#,
        );
        apply_snapshot(&engine, &tx, &state);

        // A subscriber attaching after the apply still sees the snapshot.
        assert!(matches!(&*tx.subscribe().borrow(), DisplayState::Active(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_snapshot_tears_every_timer_down() {
        let (engine, tx, rx) = setup();
        engine.start_or_replace(MASTER_TIMER, 100, 100);
        engine.start_or_replace(PHASE_TIMER, 50, 60);

        apply_snapshot(&engine, &tx, &snapshot(r#"{"sessionStatus": "finished"}"#));

        assert!(engine.registered_ids().is_empty());
        assert_eq!(*rx.borrow(), DisplayState::Finished { title: None });
    }

    #[tokio::test(start_paused = true)]
    async fn waiting_snapshot_runs_only_the_start_countdown() {
        let (engine, tx, _rx) = setup();
        let state = snapshot(
            r#"{
                "sessionStatus": "not_yet_started",
                "timeToStart": 420,
                "coaches": [],
                "attendees": []
            }"#,
        );

        apply_snapshot(&engine, &tx, &state);

        assert_eq!(engine.registered_ids(), vec![WAITING_TIMER.to_string()]);
        assert_eq!(engine.frame(WAITING_TIMER).unwrap().remaining, 420);
    }
}
