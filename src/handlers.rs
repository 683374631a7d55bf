use crate::aggregate::user_stats;
use crate::errors::AppError;
use crate::models::{
    AddWorkoutRequest, DeleteQuery, FilterRequest, ListPageResponse, RenderRequest,
    SearchRequest, SelectUserRequest, User, UserStats,
};
use crate::state::AppState;
use crate::theme::ThemeResponse;
use crate::ui::render_index;
use crate::view::{Chart, RenderToken, ViewSnapshot, ViewState};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html,
    },
    Json,
};
use futures::{stream, Stream};
use std::sync::Arc;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let theme = state.theme.lock().await.current();
    Html(render_index(theme, state.config.weekly_target_minutes))
}

pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.registry.lock().await.users().to_vec())
}

/// Streams the user list: the current snapshot first, then one event per change.
pub async fn user_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let mut receiver = state.registry.lock().await.subscribe();
    receiver.mark_changed();

    let events = stream::unfold(receiver, |mut receiver| async move {
        receiver.changed().await.ok()?;
        let users = receiver.borrow_and_update().clone();
        Some((Event::default().event("users").json_data(&users), receiver))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn add_workout(
    State(state): State<AppState>,
    payload: Result<Json<AddWorkoutRequest>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(payload) =
        payload.map_err(|rejection| AppError::validation(vec![rejection.body_text()]))?;
    let fields = payload.into_fields().map_err(AppError::validation)?;
    let user = state
        .add_workout(&fields.name, &fields.kind, fields.minutes)
        .await?;
    info!(user_id = user.id, workouts = user.workouts.len(), "workout added");
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, AppError> {
    if !query.confirm {
        return Err(AppError::bad_request("deletion must be confirmed"));
    }
    state.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<UserStats>, AppError> {
    let registry = state.registry.lock().await;
    let user = registry
        .get(id)
        .ok_or_else(|| AppError::not_found(format!("no user with id {id}")))?;
    Ok(Json(user_stats(user, state.config.weekly_target_minutes)))
}

pub async fn get_list(State(state): State<AppState>) -> Json<ListPageResponse> {
    Json(state.list_page().await)
}

pub async fn search_list(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Json<ListPageResponse> {
    Json(state.update_list(|view, _| view.set_search(&payload.term)).await)
}

pub async fn filter_list(
    State(state): State<AppState>,
    Json(payload): Json<FilterRequest>,
) -> Json<ListPageResponse> {
    Json(state.update_list(|view, _| view.set_filter_type(&payload.kind)).await)
}

pub async fn next_page(State(state): State<AppState>) -> Json<ListPageResponse> {
    Json(state.update_list(|view, count| view.next_page(count)).await)
}

pub async fn previous_page(State(state): State<AppState>) -> Json<ListPageResponse> {
    Json(state.update_list(|view, _| view.previous_page()).await)
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.view.lock().await.snapshot())
}

pub async fn show_home(State(state): State<AppState>) -> Json<ViewSnapshot> {
    update_view(&state, ViewState::show_home).await
}

pub async fn show_workouts(State(state): State<AppState>) -> Json<ViewSnapshot> {
    update_view(&state, ViewState::show_workouts).await
}

pub async fn toggle_stats(State(state): State<AppState>) -> Json<ViewSnapshot> {
    let mut view = state.view.lock().await;
    if let Some(token) = view.toggle_stats() {
        let shared = Arc::clone(&state.view);
        let delay = state.config.tooltip_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.lock().await.reveal_tooltip(token);
        });
    }
    Json(view.snapshot())
}

pub async fn toggle_stats_mode(State(state): State<AppState>) -> Json<ViewSnapshot> {
    update_view(&state, ViewState::toggle_stats_mode).await
}

pub async fn hide_tooltip(State(state): State<AppState>) -> Json<ViewSnapshot> {
    update_view(&state, ViewState::hide_tooltip).await
}

pub async fn select_user(
    State(state): State<AppState>,
    Json(payload): Json<SelectUserRequest>,
) -> Result<Json<ViewSnapshot>, AppError> {
    let registry = state.registry.lock().await;
    if registry.get(payload.user_id).is_none() {
        return Err(AppError::not_found(format!("no user with id {}", payload.user_id)));
    }
    let mut view = state.view.lock().await;
    view.select_user(payload.user_id);
    Ok(Json(view.snapshot()))
}

pub async fn render_chart(
    State(state): State<AppState>,
    Json(payload): Json<RenderRequest>,
) -> Result<Json<Option<Chart>>, AppError> {
    let chart = state
        .render_chart(RenderToken::new(payload.token))
        .await
        .map_err(|err| AppError::conflict(err.to_string()))?;
    Ok(Json(chart))
}

pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeResponse> {
    Json(state.theme.lock().await.current().into())
}

pub async fn toggle_theme(State(state): State<AppState>) -> Result<Json<ThemeResponse>, AppError> {
    let theme = state.toggle_theme().await?;
    Ok(Json(theme.into()))
}

async fn update_view(state: &AppState, change: fn(&mut ViewState)) -> Json<ViewSnapshot> {
    let mut view = state.view.lock().await;
    change(&mut view);
    Json(view.snapshot())
}

#[cfg(test)]
mod tests {
    use crate::{router, AppState, Config};
    use crate::storage::Store;
    use reqwest::Client;
    use serde_json::Value;
    use std::time::Duration;

    async fn serve(tooltip_delay: Duration) -> String {
        let config = Config {
            tooltip_delay,
            ..Config::default()
        };
        let state = AppState::with_store(config, Store::in_memory()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn tooltip_visible(request: reqwest::RequestBuilder) -> bool {
        let view: Value = request.send().await.unwrap().json().await.unwrap();
        view["tooltip_visible"].as_bool().unwrap()
    }

    #[tokio::test]
    async fn stats_tooltip_appears_after_delay() {
        let base_url = serve(Duration::from_millis(50)).await;
        let client = Client::new();

        let opened = client.post(format!("{base_url}/api/view/stats"));
        assert!(!tooltip_visible(opened).await);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let view = client.get(format!("{base_url}/api/view"));
        assert!(tooltip_visible(view).await);
    }

    #[tokio::test]
    async fn hidden_tooltip_stays_hidden_after_delay() {
        let base_url = serve(Duration::from_millis(50)).await;
        let client = Client::new();

        client
            .post(format!("{base_url}/api/view/stats"))
            .send()
            .await
            .unwrap();
        let hidden = client.post(format!("{base_url}/api/view/tooltip/hide"));
        assert!(!tooltip_visible(hidden).await);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let view = client.get(format!("{base_url}/api/view"));
        assert!(!tooltip_visible(view).await);
    }
}
