use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

use crate::application::services::{AuthEvent, DashboardFeed, DashboardView, NewJobNotice};
use crate::presentation::error::ApiError;
use crate::presentation::extractors::CurrentUser;
use crate::presentation::state::AppState;

use super::dto::{JobResponse, job_list};

#[derive(Deserialize)]
pub struct StreamQuery {
    pub view: String,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Serialize)]
struct SnapshotPayload<'a> {
    view: &'a str,
    revision: u64,
    jobs: Vec<JobResponse>,
}

#[derive(Serialize)]
struct NoticePayload {
    job_id: String,
    service_type: String,
    address: String,
    message: String,
}

impl From<NewJobNotice> for NoticePayload {
    fn from(notice: NewJobNotice) -> Self {
        Self {
            message: format!("New job posted: {} at {}", notice.service_type, notice.address),
            job_id: notice.job_id.to_string(),
            service_type: notice.service_type,
            address: notice.address,
        }
    }
}

fn parse_view(query: StreamQuery) -> Result<DashboardView, ApiError> {
    match query.view.as_str() {
        "client" => Ok(DashboardView::ClientJobs),
        "market" => Ok(DashboardView::MarketFeed {
            filter: query.filter,
        }),
        "schedule" => Ok(DashboardView::ProviderSchedule),
        other => Err(ApiError::bad_request(format!(
            "unknown view: {} (expected client, market or schedule)",
            other
        ))),
    }
}

fn snapshot_event(feed: &DashboardFeed) -> Event {
    let payload = SnapshotPayload {
        view: feed.view().name(),
        revision: feed.state().revision(),
        jobs: job_list(feed.state().jobs()),
    };
    Event::default()
        .event("snapshot")
        .data(serde_json::to_string(&payload).unwrap_or_default())
}

fn notice_event(notice: NewJobNotice) -> Event {
    Event::default()
        .event("notice")
        .data(serde_json::to_string(&NoticePayload::from(notice)).unwrap_or_default())
}

/// Live dashboard list. Sends a full `snapshot` on connect and after every
/// change to the jobs table, plus a `notice` when a new job hits the market.
/// Ends when the viewer signs out.
#[tracing::instrument(skip(state, user, query), fields(user_id = %user.id, view = %query.view))]
pub async fn dashboard_stream_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<StreamQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let view = parse_view(query)?;
    let viewer_id = user.id;

    // Subscribe before the first read so no change can slip in between.
    let mut changes = state.job_changes.subscribe();
    let mut auth_events = state.auth.subscribe();

    let mut feed = DashboardFeed::new(state.lifecycle.clone(), user, view);
    feed.refresh().await?;

    let keep_alive_seconds = state.settings.server.sse_keep_alive_seconds;

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(snapshot_event(&feed));

        loop {
            tokio::select! {
                change = changes.recv() => {
                    let notice = match change {
                        Ok(change) => feed.notice_for(&change),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Dashboard stream lagged, resyncing");
                            None
                        }
                        Err(RecvError::Closed) => break,
                    };

                    match feed.refresh().await {
                        Ok(true) => {
                            yield Ok(snapshot_event(&feed));
                        }
                        Ok(false) => {}
                        Err(e) => tracing::warn!(error = %e, "Dashboard refresh failed"),
                    }
                    if let Some(notice) = notice {
                        yield Ok(notice_event(notice));
                    }
                }
                auth = auth_events.recv() => {
                    match auth {
                        Ok(AuthEvent::SignedOut(id)) if id == viewer_id => {
                            tracing::info!("Viewer signed out, closing dashboard stream");
                            break;
                        }
                        Ok(_) | Err(RecvError::Lagged(_)) => {}
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(keep_alive_seconds))
            .text("keep-alive"),
    ))
}
