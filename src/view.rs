//! UI-only state: active view, selection, pagination and the live chart.
//!
//! Chart creation is deferred until the page has mounted its drawing
//! surface. Every change that needs a chart issues a fresh [`RenderToken`];
//! the page fires the token once mounted and only the latest token renders.

use crate::aggregate::{grouped_series, total_minutes, workout_type_summary};
use crate::models::{ChartData, ListPageResponse, User, UserRow};
use crate::theme::ChartStyle;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: usize = 5;
const CHART_LABEL: &str = "Minutes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Home,
    Workouts,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsMode {
    Circular,
    #[default]
    Chart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderToken(u64);

impl RenderToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("render token {0:?} was superseded")]
pub struct StaleRender(pub RenderToken);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: u64,
    pub user_id: u64,
    pub label: &'static str,
    pub data: ChartData,
    pub style: ChartStyle,
    pub revision: u32,
}

impl Chart {
    fn update(&mut self, style: ChartStyle) {
        self.style = style;
        self.revision += 1;
    }
}

#[derive(Debug, Serialize)]
pub struct ViewSnapshot {
    pub mode: ViewMode,
    pub stats_mode: StatsMode,
    pub selected_user: Option<u64>,
    pub page: usize,
    pub page_size: usize,
    pub search: String,
    pub filter_type: String,
    pub pending_render: Option<RenderToken>,
    pub chart: Option<Chart>,
    pub tooltip_visible: bool,
}

#[derive(Debug)]
pub struct ViewState {
    mode: ViewMode,
    stats_mode: StatsMode,
    selected_user: Option<u64>,
    page: usize,
    page_size: usize,
    search: String,
    filter_type: String,
    render_generation: u64,
    pending_render: Option<RenderToken>,
    chart: Option<Chart>,
    next_chart_id: u64,
    tooltip_generation: u64,
    tooltip_visible: bool,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            mode: ViewMode::default(),
            stats_mode: StatsMode::default(),
            selected_user: None,
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            filter_type: String::new(),
            render_generation: 0,
            pending_render: None,
            chart: None,
            next_chart_id: 1,
            tooltip_generation: 0,
            tooltip_visible: false,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn stats_mode(&self) -> StatsMode {
        self.stats_mode
    }

    pub fn selected_user(&self) -> Option<u64> {
        self.selected_user
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter_type(&self) -> &str {
        &self.filter_type
    }

    pub fn pending_render(&self) -> Option<RenderToken> {
        self.pending_render
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn tooltip_visible(&self) -> bool {
        self.tooltip_visible
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            mode: self.mode,
            stats_mode: self.stats_mode,
            selected_user: self.selected_user,
            page: self.page,
            page_size: self.page_size,
            search: self.search.clone(),
            filter_type: self.filter_type.clone(),
            pending_render: self.pending_render,
            chart: self.chart.clone(),
            tooltip_visible: self.tooltip_visible,
        }
    }

    pub fn show_home(&mut self) {
        self.leave_stats();
        self.mode = ViewMode::Home;
    }

    pub fn show_workouts(&mut self) {
        self.leave_stats();
        self.mode = ViewMode::Workouts;
    }

    /// Enters or leaves the stats view. Entering returns the tooltip token
    /// to reveal once the help delay has passed.
    pub fn toggle_stats(&mut self) -> Option<u64> {
        if self.mode == ViewMode::Stats {
            self.show_workouts();
            return None;
        }

        self.mode = ViewMode::Stats;
        if self.stats_mode == StatsMode::Chart && self.selected_user.is_some() {
            self.schedule_render();
        }

        self.tooltip_visible = false;
        self.tooltip_generation += 1;
        Some(self.tooltip_generation)
    }

    pub fn toggle_stats_mode(&mut self) {
        match self.stats_mode {
            StatsMode::Chart => {
                self.stats_mode = StatsMode::Circular;
                self.cancel_render();
                self.dispose_chart();
            }
            StatsMode::Circular => {
                self.stats_mode = StatsMode::Chart;
                if self.selected_user.is_some() {
                    self.schedule_render();
                }
            }
        }
    }

    pub fn select_user(&mut self, id: u64) {
        self.selected_user = Some(id);
        if self.stats_mode == StatsMode::Chart {
            self.schedule_render();
        }
    }

    /// Reconciles selection and chart with the latest user list.
    pub fn sync_users(&mut self, users: &[User]) {
        if let Some(id) = self.selected_user {
            match users.iter().find(|user| user.id == id) {
                Some(user) => {
                    let stale_chart = self
                        .chart
                        .as_ref()
                        .is_some_and(|chart| chart.user_id == id && chart.data != grouped_series(user));
                    if stale_chart {
                        self.schedule_render();
                    }
                }
                None => {
                    debug!(id, "selected user removed");
                    self.selected_user = None;
                    self.cancel_render();
                    self.dispose_chart();
                }
            }
        }

        if self.selected_user.is_none() {
            if let Some(first) = users.first() {
                self.select_user(first.id);
            }
        }
    }

    /// Creates the chart for `token` if it is still the latest request.
    ///
    /// Returns `Ok(None)` when the drawing surface is not mounted or nothing
    /// is selected; the request is dropped in that case.
    pub fn fire_render(
        &mut self,
        token: RenderToken,
        user: Option<&User>,
        style: ChartStyle,
    ) -> Result<Option<&Chart>, StaleRender> {
        if self.pending_render != Some(token) {
            debug!(?token, "ignoring stale render token");
            return Err(StaleRender(token));
        }
        self.pending_render = None;

        if self.mode != ViewMode::Stats || self.stats_mode != StatsMode::Chart {
            warn!(?token, "chart surface not mounted, skipping render");
            return Ok(None);
        }
        let Some(user) = user.filter(|user| Some(user.id) == self.selected_user) else {
            warn!(?token, "no selected user to chart");
            return Ok(None);
        };

        self.dispose_chart();
        let id = self.next_chart_id;
        self.next_chart_id += 1;
        debug!(id, user_id = user.id, "created chart");

        let chart = self.chart.insert(Chart {
            id,
            user_id: user.id,
            label: CHART_LABEL,
            data: grouped_series(user),
            style,
            revision: 0,
        });
        Ok(Some(&*chart))
    }

    pub fn restyle_chart(&mut self, style: ChartStyle) {
        if let Some(chart) = self.chart.as_mut() {
            chart.update(style);
        }
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip_visible = false;
        self.tooltip_generation += 1;
    }

    /// Shows the help tooltip unless the view changed since `token` was issued.
    pub fn reveal_tooltip(&mut self, token: u64) -> bool {
        if token != self.tooltip_generation || self.mode != ViewMode::Stats {
            return false;
        }
        self.tooltip_visible = true;
        true
    }

    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn next_page(&mut self, filtered_count: usize) {
        if self.page * self.page_size < filtered_count {
            self.page += 1;
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.trim().to_string();
    }

    pub fn set_filter_type(&mut self, kind: &str) {
        self.filter_type = kind.trim().to_string();
    }

    /// Pulls the cursor back to the last non-empty page.
    pub fn clamp_page(&mut self, filtered_count: usize) {
        let last = filtered_count.div_ceil(self.page_size).max(1);
        self.page = self.page.min(last);
    }

    pub fn list_page(&self, filtered: &[User]) -> ListPageResponse {
        let start = (self.page - 1) * self.page_size;
        let users = filtered
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|user| UserRow {
                id: user.id,
                name: user.name.clone(),
                workout_types: workout_type_summary(user),
                total_minutes: total_minutes(user),
            })
            .collect();

        ListPageResponse {
            page: self.page,
            page_size: self.page_size,
            total: filtered.len(),
            search: self.search.clone(),
            filter_type: self.filter_type.clone(),
            has_previous: self.page > 1,
            has_next: self.page * self.page_size < filtered.len(),
            users,
        }
    }

    fn leave_stats(&mut self) {
        if self.mode == ViewMode::Stats {
            self.cancel_render();
            self.dispose_chart();
            self.hide_tooltip();
        }
    }

    fn schedule_render(&mut self) {
        self.render_generation += 1;
        self.pending_render = Some(RenderToken(self.render_generation));
    }

    fn cancel_render(&mut self) {
        self.pending_render = None;
    }

    fn dispose_chart(&mut self) {
        if let Some(chart) = self.chart.take() {
            debug!(id = chart.id, user_id = chart.user_id, "disposed chart");
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Workout, WorkoutType};
    use crate::theme::Theme;

    fn user(id: u64, name: &str, workouts: &[(WorkoutType, u32)]) -> User {
        User {
            id,
            name: name.to_string(),
            workouts: workouts
                .iter()
                .map(|&(kind, minutes)| Workout { kind, minutes })
                .collect(),
        }
    }

    fn style() -> ChartStyle {
        ChartStyle::for_theme(Theme::Light)
    }

    fn stats_view_with(users: &[User]) -> ViewState {
        let mut view = ViewState::default();
        view.sync_users(users);
        view.toggle_stats();
        view
    }

    #[test]
    fn first_user_is_selected_when_none_is() {
        let users = vec![user(1, "Ann", &[(WorkoutType::Yoga, 20)]), user(2, "Bob", &[])];
        let mut view = ViewState::default();
        view.sync_users(&users);
        assert_eq!(view.selected_user(), Some(1));
    }

    #[test]
    fn only_latest_token_renders() {
        let users = vec![
            user(1, "Ann", &[(WorkoutType::Yoga, 20)]),
            user(2, "Bob", &[(WorkoutType::Running, 30)]),
        ];
        let mut view = stats_view_with(&users);
        let first = view.pending_render().unwrap();

        view.select_user(2);
        let second = view.pending_render().unwrap();
        assert_ne!(first, second);

        assert_eq!(
            view.fire_render(first, Some(&users[1]), style()),
            Err(StaleRender(first))
        );
        let chart = view.fire_render(second, Some(&users[1]), style()).unwrap().unwrap();
        assert_eq!(chart.user_id, 2);
        assert_eq!(chart.data.labels, vec!["Running"]);
        assert!(view.pending_render().is_none());
    }

    #[test]
    fn new_chart_replaces_previous_one() {
        let users = vec![user(1, "Ann", &[(WorkoutType::Yoga, 20)])];
        let mut view = stats_view_with(&users);
        let token = view.pending_render().unwrap();
        let first_id = view.fire_render(token, Some(&users[0]), style()).unwrap().unwrap().id;

        view.select_user(1);
        let token = view.pending_render().unwrap();
        let second_id = view.fire_render(token, Some(&users[0]), style()).unwrap().unwrap().id;

        assert_ne!(first_id, second_id);
        assert_eq!(view.chart().map(|chart| chart.id), Some(second_id));
    }

    #[test]
    fn render_without_surface_is_dropped() {
        let users = vec![user(1, "Ann", &[(WorkoutType::Yoga, 20)])];
        let mut view = ViewState::default();
        view.sync_users(&users);
        let token = view.pending_render().unwrap();

        assert_eq!(view.fire_render(token, Some(&users[0]), style()), Ok(None));
        assert!(view.chart().is_none());
    }

    #[test]
    fn deleting_selected_user_tears_down_chart_immediately() {
        let users = vec![
            user(1, "Ann", &[(WorkoutType::Yoga, 20)]),
            user(2, "Bob", &[(WorkoutType::Running, 30)]),
        ];
        let mut view = stats_view_with(&users);
        let token = view.pending_render().unwrap();
        view.fire_render(token, Some(&users[0]), style()).unwrap();
        assert!(view.chart().is_some());

        view.sync_users(&users[1..]);
        assert!(view.chart().is_none());
        assert_eq!(view.selected_user(), Some(2));
    }

    #[test]
    fn circular_mode_disposes_chart_and_back_schedules_render() {
        let users = vec![user(1, "Ann", &[(WorkoutType::Yoga, 20)])];
        let mut view = stats_view_with(&users);
        let token = view.pending_render().unwrap();
        view.fire_render(token, Some(&users[0]), style()).unwrap();

        view.toggle_stats_mode();
        assert_eq!(view.stats_mode(), StatsMode::Circular);
        assert!(view.chart().is_none());
        assert!(view.pending_render().is_none());

        view.toggle_stats_mode();
        assert!(view.pending_render().is_some());
    }

    #[test]
    fn new_workout_for_charted_user_schedules_refresh() {
        let mut users = vec![user(1, "Ann", &[(WorkoutType::Yoga, 20)])];
        let mut view = stats_view_with(&users);
        let token = view.pending_render().unwrap();
        view.fire_render(token, Some(&users[0]), style()).unwrap();

        users[0].workouts.push(Workout {
            kind: WorkoutType::Running,
            minutes: 10,
        });
        view.sync_users(&users);
        assert!(view.pending_render().is_some());
    }

    #[test]
    fn restyle_updates_live_chart_in_place() {
        let users = vec![user(1, "Ann", &[(WorkoutType::Yoga, 20)])];
        let mut view = stats_view_with(&users);
        let token = view.pending_render().unwrap();
        view.fire_render(token, Some(&users[0]), style()).unwrap();

        view.restyle_chart(ChartStyle::for_theme(Theme::Dark));
        let chart = view.chart().unwrap();
        assert_eq!(chart.revision, 1);
        assert_eq!(chart.style, ChartStyle::for_theme(Theme::Dark));
    }

    #[test]
    fn tooltip_reveals_only_for_current_visit() {
        let mut view = ViewState::default();
        let token = view.toggle_stats().unwrap();
        assert!(view.reveal_tooltip(token));
        assert!(view.tooltip_visible());

        view.hide_tooltip();
        assert!(!view.reveal_tooltip(token));

        view.toggle_stats();
        let again = view.toggle_stats().unwrap();
        view.show_home();
        assert!(!view.reveal_tooltip(again));
    }

    #[test]
    fn pagination_is_bounded() {
        let mut view = ViewState::new(5);
        view.previous_page();
        assert_eq!(view.page(), 1);

        view.next_page(5);
        assert_eq!(view.page(), 1);

        view.next_page(6);
        assert_eq!(view.page(), 2);
        view.next_page(6);
        assert_eq!(view.page(), 2);

        view.previous_page();
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn narrowing_filter_clamps_page() {
        let mut view = ViewState::new(1);
        view.next_page(3);
        view.next_page(3);
        assert_eq!(view.page(), 3);

        view.clamp_page(1);
        assert_eq!(view.page(), 1);

        view.clamp_page(0);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn list_page_slices_filtered_users() {
        let users: Vec<User> = (1..=7)
            .map(|id| user(id, &format!("User {id}"), &[(WorkoutType::Running, 10)]))
            .collect();
        let mut view = ViewState::new(5);
        view.next_page(users.len());

        let page = view.list_page(&users);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 7);
        assert_eq!(page.users.len(), 2);
        assert_eq!(page.users[0].id, 6);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }
}
