//! Headless live display: polls a session's live state and logs what a venue
//! screen would render, countdowns included.

use std::{env, sync::Arc};

use anyhow::Context;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courtsync::{
    api::{SessionApi, http::HttpSessionApi},
    config::AppConfig,
    live::display::{DisplayState, MASTER_TIMER, PHASE_TIMER, WAITING_TIMER, court_timer_id},
    plan::time::{format_countdown, format_duration},
    services::{LiveService, PlannerSession},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let session_id = env::var("SESSION_ID")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(1);

    let api: Arc<dyn SessionApi> = Arc::new(
        HttpSessionApi::new(config.base_url(), config.csrf_token())
            .context("building session store client")?,
    );

    // The plan summary is informational; the live view works without it.
    match api.fetch_bootstrap(session_id).await {
        Ok(bootstrap) => match PlannerSession::from_bootstrap(Arc::clone(&api), bootstrap) {
            Ok(planner) => info!(
                session_id,
                duration_minutes = planner.session_duration(),
                players = planner.roster().len(),
                phases = planner.plan().timeline.len(),
                "session plan loaded"
            ),
            Err(err) => warn!(error = %err, "bootstrap payload rejected; showing the live view only"),
        },
        Err(err) => warn!(error = %err, "could not load the session plan; showing the live view only"),
    }

    let mut live = LiveService::new(api, session_id, config.poll_interval());
    live.start();
    let mut updates = live.subscribe();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            state = updates.next() => match state {
                Some(state) => {
                    let failed = matches!(state, DisplayState::Failed { .. });
                    render(&live, &state);
                    if failed {
                        break;
                    }
                }
                None => break,
            },
            _ = &mut shutdown => break,
        }
    }

    live.shutdown();
    info!("live display stopped");
    Ok(())
}

/// Log one display state the way a venue screen would lay it out.
fn render(live: &LiveService, state: &DisplayState) {
    let remaining = |id: &str| live.engine().frame(id).map(|frame| frame.remaining as f64);

    match state {
        DisplayState::Loading => info!("waiting for the first live snapshot"),
        DisplayState::Waiting(view) => info!(
            title = view.title.as_deref(),
            coaches = view.coaches.len(),
            attendees = view.attendees.len(),
            starts_in = remaining(WAITING_TIMER).map(format_countdown),
            "waiting for the session to start"
        ),
        DisplayState::Active(view) => {
            info!(
                title = view.title.as_deref(),
                phase = %view.phase_name,
                session_left = remaining(MASTER_TIMER).map(format_countdown),
                phase_left = remaining(PHASE_TIMER).map(format_duration),
                "session running"
            );
            for court in &view.courts {
                info!(
                    court = %court.court_name,
                    group = %court.player_group,
                    players = court.players.len(),
                    activity = %court.activity_name,
                    next = court.next_activity.as_deref(),
                    time_left = remaining(&court_timer_id(&court.court_name)).map(format_duration),
                    "court activity"
                );
            }
        }
        DisplayState::Finished { title } => info!(title = title.as_deref(), "session finished"),
        DisplayState::Failed { message } => warn!(%message, "live display frozen"),
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the display down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
