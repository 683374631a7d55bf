use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/events", get(handlers::user_events))
        .route("/api/users/:id", delete(handlers::delete_user))
        .route("/api/users/:id/stats", get(handlers::get_user_stats))
        .route("/api/workouts", post(handlers::add_workout))
        .route("/api/list", get(handlers::get_list))
        .route("/api/list/search", post(handlers::search_list))
        .route("/api/list/filter", post(handlers::filter_list))
        .route("/api/list/next", post(handlers::next_page))
        .route("/api/list/prev", post(handlers::previous_page))
        .route("/api/view", get(handlers::get_view))
        .route("/api/view/home", post(handlers::show_home))
        .route("/api/view/workouts", post(handlers::show_workouts))
        .route("/api/view/stats", post(handlers::toggle_stats))
        .route("/api/view/stats-mode", post(handlers::toggle_stats_mode))
        .route("/api/view/select", post(handlers::select_user))
        .route("/api/view/tooltip/hide", post(handlers::hide_tooltip))
        .route("/api/chart/render", post(handlers::render_chart))
        .route("/api/theme", get(handlers::get_theme))
        .route("/api/theme/toggle", post(handlers::toggle_theme))
        .with_state(state)
}
