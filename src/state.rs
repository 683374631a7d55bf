use crate::config::Config;
use crate::models::{ListPageResponse, User};
use crate::registry::{Registry, RegistryError};
use crate::storage::{Store, StoreError};
use crate::theme::{ChartStyle, Theme, ThemeState};
use crate::view::{Chart, RenderToken, StaleRender, ViewState};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared by all handlers.
///
/// Locks are always taken in the order registry, theme, view.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<Mutex<Registry>>,
    pub theme: Arc<Mutex<ThemeState>>,
    pub view: Arc<Mutex<ViewState>>,
}

impl AppState {
    pub async fn load(config: Config) -> Self {
        let store = Store::open(&config.data_path).await;
        Self::with_store(config, store).await
    }

    pub async fn with_store(config: Config, store: Store) -> Self {
        let registry = Registry::load(store.clone()).await;
        let theme = ThemeState::load(store).await;
        let mut view = ViewState::new(config.page_size);
        view.sync_users(registry.users());

        Self {
            config: Arc::new(config),
            registry: Arc::new(Mutex::new(registry)),
            theme: Arc::new(Mutex::new(theme)),
            view: Arc::new(Mutex::new(view)),
        }
    }

    pub async fn add_workout(&self, name: &str, kind: &str, minutes: i64) -> Result<User, RegistryError> {
        let mut registry = self.registry.lock().await;
        let user = registry.add_workout(name, kind, minutes).await?;
        self.sync_view(&registry).await;
        Ok(user)
    }

    pub async fn delete_user(&self, id: u64) -> Result<bool, RegistryError> {
        let mut registry = self.registry.lock().await;
        let removed = registry.delete_user(id).await?;
        if removed {
            self.sync_view(&registry).await;
        }
        Ok(removed)
    }

    pub async fn list_page(&self) -> ListPageResponse {
        let registry = self.registry.lock().await;
        let view = self.view.lock().await;
        let filtered = filtered_for(&registry, &view);
        view.list_page(&filtered)
    }

    pub async fn update_list(&self, change: impl FnOnce(&mut ViewState, usize)) -> ListPageResponse {
        let registry = self.registry.lock().await;
        let mut view = self.view.lock().await;
        let count = filtered_for(&registry, &view).len();
        change(&mut view, count);

        let filtered = filtered_for(&registry, &view);
        view.clamp_page(filtered.len());
        view.list_page(&filtered)
    }

    pub async fn render_chart(&self, token: RenderToken) -> Result<Option<Chart>, StaleRender> {
        let registry = self.registry.lock().await;
        let theme = self.theme.lock().await;
        let mut view = self.view.lock().await;
        let user = view.selected_user().and_then(|id| registry.get(id));
        let style = ChartStyle::for_theme(theme.current());
        view.fire_render(token, user, style).map(|chart| chart.cloned())
    }

    pub async fn toggle_theme(&self) -> Result<Theme, StoreError> {
        let mut theme = self.theme.lock().await;
        let current = theme.toggle().await?;
        self.view.lock().await.restyle_chart(ChartStyle::for_theme(current));
        Ok(current)
    }

    async fn sync_view(&self, registry: &Registry) {
        let mut view = self.view.lock().await;
        view.sync_users(registry.users());
        let count = filtered_for(registry, &view).len();
        view.clamp_page(count);
    }
}

fn filtered_for(registry: &Registry, view: &ViewState) -> Vec<User> {
    registry.filtered_users(Some(view.search()), Some(view.filter_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewMode;

    async fn state() -> AppState {
        AppState::with_store(Config::default(), Store::in_memory()).await
    }

    #[tokio::test]
    async fn deleting_selected_user_clears_chart() {
        let state = state().await;
        let ann = state.add_workout("Ann", "Yoga", 20).await.unwrap();
        state.view.lock().await.toggle_stats();

        let token = state.view.lock().await.pending_render().unwrap();
        let chart = state.render_chart(token).await.unwrap().unwrap();
        assert_eq!(chart.user_id, ann.id);

        assert!(state.delete_user(ann.id).await.unwrap());
        let view = state.view.lock().await;
        assert!(view.chart().is_none());
        assert_eq!(view.selected_user(), None);
        assert_eq!(view.mode(), ViewMode::Stats);
    }

    #[tokio::test]
    async fn theme_toggle_restyles_live_chart() {
        let state = state().await;
        state.add_workout("Ann", "Yoga", 20).await.unwrap();
        state.view.lock().await.toggle_stats();
        let token = state.view.lock().await.pending_render().unwrap();
        state.render_chart(token).await.unwrap();

        assert_eq!(state.toggle_theme().await.unwrap(), Theme::Dark);
        let view = state.view.lock().await;
        let chart = view.chart().unwrap();
        assert_eq!(chart.style, ChartStyle::for_theme(Theme::Dark));
    }

    #[tokio::test]
    async fn search_change_clamps_page() {
        let state = state().await;
        for name in ["Ann", "Bob", "Cid", "Dee", "Eve", "Fay", "Gus"] {
            state.add_workout(name, "Running", 10).await.unwrap();
        }

        let page = state.update_list(|view, count| view.next_page(count)).await;
        assert_eq!(page.page, 2);
        assert_eq!(page.users.len(), 2);

        let page = state.update_list(|view, _| view.set_search("ann")).await;
        assert_eq!(page.page, 1);
        assert_eq!(page.total, 1);
        assert_eq!(page.users[0].name, "Ann");
    }
}
