use crate::app_shell::MainLayout;
use crate::layout::global_context::AppGlobalContext;
use crate::layout::tabs::tab_label;
use crate::layout::tabs::tab_labels::ARTIFACT_TAB;
use crate::shared::config::load_client_config;
use crate::shared::notifications::{NotificationContext, NotificationHost};
use crate::shared::theme::ThemeProvider;
use crate::usecases::u501_artifact_generation::has_artifact_config;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let config = load_client_config();
    provide_context(NotificationContext::new(config.ui.notification_duration_ms));
    provide_context(config);

    let ctx = AppGlobalContext::new();
    // pages that embed an artifact configuration start on the chat
    if has_artifact_config() {
        ctx.open_tab(ARTIFACT_TAB, tab_label(ARTIFACT_TAB));
    }
    provide_context(ctx);

    view! {
        <ThemeProvider>
            <MainLayout />
            <NotificationHost />
        </ThemeProvider>
    }
}
