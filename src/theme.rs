use crate::storage::{Store, StoreError, THEME_KEY};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(self) -> ThemePalette {
        match self {
            Theme::Light => ThemePalette {
                background: "#FFFFFF",
                text: "#111827",
                chart_text: "#111827",
                subtext: "#6B7280",
                border: "#E5E7EB",
                accent: "#3B82F6",
                success: "#10B981",
                progress_background: "#E5E7EB",
            },
            Theme::Dark => ThemePalette {
                background: "#1F2937",
                text: "#FFFFFF",
                chart_text: "#111827",
                subtext: "#9CA3AF",
                border: "#374151",
                accent: "#60A5FA",
                success: "#34D399",
                progress_background: "#374151",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    pub background: &'static str,
    pub text: &'static str,
    pub chart_text: &'static str,
    pub subtext: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub success: &'static str,
    pub progress_background: &'static str,
}

/// Colors handed to the chart renderer alongside the data series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartStyle {
    pub bar_color: &'static str,
    pub text_color: &'static str,
    pub grid_color: &'static str,
}

impl ChartStyle {
    pub fn for_theme(theme: Theme) -> Self {
        let palette = theme.palette();
        Self {
            bar_color: palette.accent,
            // Chart text stays dark in both themes; the chart sits on a light card.
            text_color: palette.chart_text,
            grid_color: "rgba(0, 0, 0, 0.1)",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
    pub colors: ThemePalette,
}

impl From<Theme> for ThemeResponse {
    fn from(theme: Theme) -> Self {
        Self {
            theme,
            colors: theme.palette(),
        }
    }
}

pub struct ThemeState {
    store: Store,
    current: Theme,
}

impl ThemeState {
    pub async fn load(store: Store) -> Self {
        let current = match store.load(THEME_KEY).await.as_deref() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        };
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub async fn toggle(&mut self) -> Result<Theme, StoreError> {
        let next = self.current.toggled();
        self.store.save(THEME_KEY, next.as_str()).await?;
        self.current = next;
        info!(theme = self.current.as_str(), "theme changed");
        Ok(self.current)
    }
}
