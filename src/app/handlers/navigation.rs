//! Page switching, notices and theme selection

use crate::api::fallback_applications;
use crate::app::forms::RuleCatalog;
use crate::app::handlers::translated;
use crate::app::{Banner, Message, Page, State};
use crate::core::error::ErrorTranslation;
use crate::theme::ThemeChoice;
use iced::Task;
use tracing::warn;

/// Switches page and loads whatever the page needs on first visit
pub(crate) fn handle_page_selected(state: &mut State, page: Page) -> Task<Message> {
    state.page = page;

    match page {
        Page::SecurityRule if !state.rule.catalog_loaded && !state.rule.loading => {
            state.rule.loading = true;
            load_rule_catalog(state)
        }
        Page::ServiceGroups if state.service_group.items.is_empty() => {
            Task::done(Message::ServiceGroupBrowserRequested)
        }
        _ => Task::none(),
    }
}

/// Firewalls are required; the other pickers degrade to defaults
fn load_rule_catalog(state: &State) -> Task<Message> {
    let client = state.client.clone();
    Task::perform(
        async move {
            let (firewalls, applications, services, profiles) = tokio::join!(
                client.firewall_hierarchy(),
                client.list_applications(),
                client.list_service_objects(),
                client.list_security_profiles(),
            );

            Ok::<_, ErrorTranslation>(RuleCatalog {
                firewalls: translated(firewalls)?,
                applications: applications.unwrap_or_else(|e| {
                    warn!("Falling back to built-in applications: {e}");
                    fallback_applications()
                }),
                services: services.unwrap_or_else(|e| {
                    warn!("Service objects unavailable for rule form: {e}");
                    Vec::new()
                }),
                profiles: profiles.unwrap_or_else(|e| {
                    warn!("Security profiles unavailable for rule form: {e}");
                    crate::api::ProfileCatalog::default()
                }),
            })
        },
        Message::RuleCatalogLoaded,
    )
}

pub(crate) fn handle_rule_catalog_loaded(
    state: &mut State,
    result: Result<RuleCatalog, ErrorTranslation>,
) {
    match result {
        Ok(catalog) => {
            tracing::info!("Loaded {} firewalls", catalog.firewalls.len());
            state.rule.load_catalog(catalog);
        }
        Err(e) => {
            state.rule.loading = false;
            super::show_error(state, e);
        }
    }
}

pub(crate) fn handle_success_expired(state: &mut State, page: Page) {
    match page {
        Page::AddressGroups => state.address_group.success = None,
        Page::ServiceGroups => state.service_group.success = None,
        Page::SecurityRule => state.rule.success = None,
        Page::AddressObjects | Page::ServiceObjects => {}
    }
    if matches!(state.banner, Some(Banner::Success(_))) {
        state.banner = None;
    }
}

pub(crate) fn handle_theme_changed(state: &mut State, choice: ThemeChoice) -> Task<Message> {
    state.config.theme_choice = choice;
    state.theme = choice.to_theme();

    let config = state.config.clone();
    Task::perform(
        async move {
            crate::config::save_config(&config)
                .await
                .map_err(|e| e.to_string())
        },
        Message::ConfigSaved,
    )
}
