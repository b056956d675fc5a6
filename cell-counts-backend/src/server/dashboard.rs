use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::{Query, QueryRejection};
use cell_counts_core::dashboard::{DashboardState, Event, RenderModel, Selection, compute_view};
use serde::Deserialize;

use super::{
    AppState,
    render::{Notice, Page},
};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show))
        .route("/demo", post(create_demo))
}

/// The query string submitted by the filter form. Each filter key may repeat.
///
/// `applied` is set by the form itself, so that a form submitted with every
/// option of a control deselected can be told apart from a first visit.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FilterParams {
    applied: bool,
    created: Option<usize>,
    condition: Vec<String>,
    treatment: Vec<String>,
    sample_type: Vec<String>,
    timepoint: Vec<i32>,
}

impl FilterParams {
    fn into_event(self) -> Event {
        let Self {
            applied,
            condition,
            treatment,
            sample_type,
            timepoint,
            ..
        } = self;

        if !applied {
            return Event::Entered;
        }

        Event::FiltersChanged(Selection {
            conditions: condition.into_iter().collect(),
            treatments: treatment.into_iter().collect(),
            sample_types: sample_type.into_iter().collect(),
            timepoints: timepoint.into_iter().collect(),
        })
    }
}

async fn render(app_state: &AppState, event: Event, notice: Option<Notice>) -> String {
    let outcome = app_state.load().await;
    let (_, model): (_, RenderModel) = compute_view(DashboardState::enter(outcome), event);

    Page::new(&model, app_state.store.path())
        .with_notice(notice.as_ref())
        .render()
}

async fn show(
    State(app_state): State<AppState>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Html<String> {
    let params = params.map_or_else(
        |err| {
            tracing::warn!(error = %err, "ignoring malformed filter parameters");
            FilterParams::default()
        },
        |Query(params)| params,
    );

    let notice = params.created.map(Notice::Created);

    Html(render(&app_state, params.into_event(), notice).await)
}

async fn create_demo(State(app_state): State<AppState>) -> Response {
    match app_state.create_demo().await {
        Ok(Some(inserted)) => Redirect::to(&format!("/?created={inserted}")).into_response(),
        Ok(None) => Redirect::to("/").into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to create demo store");
            let notice = Notice::Failed(err.to_string());

            Html(render(&app_state, Event::Entered, Some(notice)).await).into_response()
        }
    }
}
