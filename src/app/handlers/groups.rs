//! Address and service group handlers
//!
//! Handles:
//! - Group search
//! - Loading the member browsers
//! - Detours to the object pages to create a missing member
//! - Name check then create

use crate::app::forms::{Lookup, ReturnTo};
use crate::app::handlers::{expire_success, name_conflict, show_error, translated};
use crate::app::{Message, Page, State};
use crate::audit::{self, EventType};
use crate::core::error::ErrorTranslation;
use crate::core::objects::combine_service_items;
use iced::Task;
use tracing::{info, warn};

/// A failed name check is logged and treated as available
fn name_taken(result: Result<bool, ErrorTranslation>, kind: &str) -> bool {
    result.unwrap_or_else(|e| {
        warn!("{kind} name check failed: {}", e.user_message);
        false
    })
}

// ── Address groups ─────────────────────────────────────────────────────────

pub(crate) fn handle_address_group_search(state: &mut State) -> Task<Message> {
    let form = &mut state.address_group;
    let term = form.search_term.trim().to_string();
    if term.is_empty() || form.search.is_pending() {
        return Task::none();
    }

    form.search = Lookup::Pending;
    form.success = None;
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.search_address_group(&term).await) },
        Message::AddressGroupSearchCompleted,
    )
}

pub(crate) fn handle_address_group_search_completed(
    state: &mut State,
    result: Result<crate::api::SearchResults<crate::core::objects::AddressObject>, ErrorTranslation>,
) {
    match result {
        Ok(results) if results.is_empty() => state.address_group.search = Lookup::Missing,
        Ok(results) => state.address_group.search = Lookup::Found(results),
        Err(e) => {
            state.address_group.search = Lookup::Idle;
            show_error(state, e);
        }
    }
}

pub(crate) fn handle_address_group_browser(state: &mut State) -> Task<Message> {
    let form = &mut state.address_group;
    if form.loading {
        return Task::none();
    }
    form.loading = true;
    form.browser_open = true;

    let client = state.client.clone();
    Task::perform(
        async move {
            let (objects, groups) =
                tokio::join!(client.list_address_objects(), client.list_address_groups());
            Ok::<_, ErrorTranslation>((translated(objects)?, translated(groups)?))
        },
        Message::AddressGroupBrowserLoaded,
    )
}

pub(crate) fn handle_address_group_browser_loaded(
    state: &mut State,
    result: Result<
        (
            Vec<crate::core::objects::AddressObject>,
            Vec<crate::core::objects::AddressGroup>,
        ),
        ErrorTranslation,
    >,
) {
    state.address_group.loading = false;
    match result {
        Ok((objects, groups)) => {
            info!("Loaded {} address objects, {} groups", objects.len(), groups.len());
            state.address_group.objects = objects;
            state.address_group.groups = groups;
        }
        Err(e) => show_error(state, e),
    }
}

/// Sends the user to the object checker; the created object comes back selected
pub(crate) fn handle_address_group_new_object(state: &mut State) {
    let target = &mut state.address_object;
    target.cancel_create();
    target.lookup = Lookup::Idle;
    target.return_to = Some(ReturnTo::AddressGroup);
    state.page = Page::AddressObjects;
}

/// Checks syntax, then members, then whether the name is free
pub(crate) fn handle_address_group_submit(state: &mut State) -> Task<Message> {
    let form = &mut state.address_group;
    if form.submitting {
        return Task::none();
    }
    if let Some(errors) = form.validate() {
        form.errors = Some(errors);
        return Task::none();
    }

    form.submitting = true;
    form.errors = None;
    let name = form.name.trim().to_string();
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.check_address_group_name(&name).await) },
        Message::AddressGroupNameChecked,
    )
}

pub(crate) fn handle_address_group_name_checked(
    state: &mut State,
    result: Result<bool, ErrorTranslation>,
) -> Task<Message> {
    let form = &mut state.address_group;
    if name_taken(result, "Address group") {
        form.submitting = false;
        form.errors = Some(name_conflict("Address group", &form.name));
        return Task::none();
    }

    let request = form.to_request();
    let client = state.client.clone();
    let audit_enabled = state.config.enable_audit_log;
    Task::perform(
        async move {
            let outcome = client.create_address_group(&request).await;
            audit::log_create(
                audit_enabled,
                EventType::CreateAddressGroup,
                client.base_url(),
                serde_json::json!({
                    "name": request.name,
                    "device_group": request.device_group,
                    "type": request.group_type,
                    "members": request.members,
                }),
                &outcome,
            )
            .await;
            translated(outcome)
        },
        Message::AddressGroupCreated,
    )
}

pub(crate) fn handle_address_group_created(
    state: &mut State,
    result: Result<String, ErrorTranslation>,
) -> Task<Message> {
    state.address_group.submitting = false;
    match result {
        Ok(name) => {
            info!("Created address group '{name}'");
            state.address_group.finish_create(name);
            expire_success(Page::AddressGroups)
        }
        Err(e) => {
            show_error(state, e);
            Task::none()
        }
    }
}

// ── Service groups ─────────────────────────────────────────────────────────

pub(crate) fn handle_service_group_search(state: &mut State) -> Task<Message> {
    let form = &mut state.service_group;
    let term = form.search_term.trim().to_string();
    if term.is_empty() || form.search.is_pending() {
        return Task::none();
    }

    form.search = Lookup::Pending;
    form.success = None;
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.search_service_group(&term).await) },
        Message::ServiceGroupSearchCompleted,
    )
}

pub(crate) fn handle_service_group_search_completed(
    state: &mut State,
    result: Result<crate::api::SearchResults<crate::core::objects::ServiceObject>, ErrorTranslation>,
) {
    match result {
        Ok(results) if results.is_empty() => state.service_group.search = Lookup::Missing,
        Ok(results) => state.service_group.search = Lookup::Found(results),
        Err(e) => {
            state.service_group.search = Lookup::Idle;
            show_error(state, e);
        }
    }
}

pub(crate) fn handle_service_group_browser(state: &mut State) -> Task<Message> {
    let form = &mut state.service_group;
    if form.loading {
        return Task::none();
    }
    form.loading = true;

    let client = state.client.clone();
    Task::perform(
        async move {
            let (objects, groups) =
                tokio::join!(client.list_service_objects(), client.list_service_groups());
            Ok::<_, ErrorTranslation>(combine_service_items(translated(objects)?, translated(groups)?))
        },
        Message::ServiceGroupItemsLoaded,
    )
}

pub(crate) fn handle_service_group_items_loaded(
    state: &mut State,
    result: Result<Vec<crate::core::objects::ServiceItem>, ErrorTranslation>,
) {
    state.service_group.loading = false;
    match result {
        Ok(items) => {
            info!("Loaded {} service items", items.len());
            state.service_group.items = items;
        }
        Err(e) => show_error(state, e),
    }
}

pub(crate) fn handle_service_group_new_object(state: &mut State) {
    let target = &mut state.service_object;
    target.cancel_create();
    target.lookup = Lookup::Idle;
    target.return_to = Some(ReturnTo::ServiceGroup);
    state.page = Page::ServiceObjects;
}

pub(crate) fn handle_service_group_submit(state: &mut State) -> Task<Message> {
    let form = &mut state.service_group;
    if form.submitting {
        return Task::none();
    }
    if let Some(errors) = form.validate() {
        form.errors = Some(errors);
        return Task::none();
    }

    form.submitting = true;
    form.errors = None;
    let name = form.name.trim().to_string();
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.check_service_group_name(&name).await) },
        Message::ServiceGroupNameChecked,
    )
}

pub(crate) fn handle_service_group_name_checked(
    state: &mut State,
    result: Result<bool, ErrorTranslation>,
) -> Task<Message> {
    let form = &mut state.service_group;
    if name_taken(result, "Service group") {
        form.submitting = false;
        form.errors = Some(name_conflict("Service group", &form.name));
        return Task::none();
    }

    let request = form.to_request();
    let client = state.client.clone();
    let audit_enabled = state.config.enable_audit_log;
    Task::perform(
        async move {
            let outcome = client.create_service_group(&request).await;
            audit::log_create(
                audit_enabled,
                EventType::CreateServiceGroup,
                client.base_url(),
                serde_json::json!({
                    "name": request.name,
                    "device_group": request.device_group,
                    "members": request.members,
                }),
                &outcome,
            )
            .await;
            translated(outcome)
        },
        Message::ServiceGroupCreated,
    )
}

pub(crate) fn handle_service_group_created(
    state: &mut State,
    result: Result<String, ErrorTranslation>,
) -> Task<Message> {
    state.service_group.submitting = false;
    match result {
        Ok(name) => {
            info!("Created service group '{name}'");
            state.service_group.finish_create(name);
            expire_success(Page::ServiceGroups)
        }
        Err(e) => {
            show_error(state, e);
            Task::none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GroupMatch, SearchResults};
    use crate::app::forms::{AddressGroupEdit, ServiceGroupEdit};
    use crate::app::handlers::return_created;
    use crate::app::handlers::test_utils::create_test_state;
    use crate::core::error::Error;
    use crate::core::objects::{ServiceItem, ServiceObject};

    #[test]
    fn test_blank_search_does_nothing() {
        let mut state = create_test_state();
        state.address_group.search_term = "   ".into();
        let _ = handle_address_group_search(&mut state);
        assert_eq!(state.address_group.search, Lookup::Idle);
    }

    #[test]
    fn test_empty_search_is_missing() {
        let mut state = create_test_state();
        handle_address_group_search_completed(&mut state, Ok(SearchResults::default()));
        assert_eq!(state.address_group.search, Lookup::Missing);

        let results = SearchResults {
            groups: vec![GroupMatch {
                name: "web-servers".into(),
                details: None,
            }],
            objects: Vec::new(),
        };
        handle_address_group_search_completed(&mut state, Ok(results.clone()));
        assert_eq!(state.address_group.search, Lookup::Found(results));
    }

    #[test]
    fn test_submit_checks_members_before_name() {
        let mut state = create_test_state();
        state.address_group.apply(AddressGroupEdit::Name("web".into()));
        let _ = handle_address_group_submit(&mut state);
        assert!(!state.address_group.submitting);
        let errors = state.address_group.errors.as_ref().unwrap();
        assert!(errors.members.is_some());
        assert!(errors.name.is_none());
    }

    #[test]
    fn test_taken_group_name() {
        let mut state = create_test_state();
        state.service_group.name = "web-svcs ".into();
        state.service_group.submitting = true;
        let _ = handle_service_group_name_checked(&mut state, Ok(true));
        assert!(!state.service_group.submitting);
        assert_eq!(
            state.service_group.errors.as_ref().unwrap().name.as_deref(),
            Some("Service group name 'web-svcs' is already in use")
        );
    }

    #[test]
    fn test_taken_address_group_name_reads_as_conflict() {
        let mut state = create_test_state();
        state.address_group.name = "dmz-hosts".into();
        state.address_group.submitting = true;
        let _ = handle_address_group_name_checked(&mut state, Ok(true));

        let expected = Error::conflict("Address group", "dmz-hosts").translate().user_message;
        assert_eq!(
            state.address_group.errors.as_ref().unwrap().name.as_deref(),
            Some(expected.as_str())
        );
    }

    #[test]
    fn test_group_created_resets_form() {
        let mut state = create_test_state();
        state.service_group.apply(ServiceGroupEdit::OpenCreate);
        state.service_group.apply(ServiceGroupEdit::Name("web".into()));
        state.service_group.apply(ServiceGroupEdit::ToggleItem("http".into()));
        state.service_group.submitting = true;

        let _ = handle_service_group_created(&mut state, Ok("web".into()));
        let form = &state.service_group;
        assert!(!form.submitting);
        assert!(!form.create_open);
        assert!(form.selected.is_empty());
        assert_eq!(form.success.as_deref(), Some("Service group \"web\" created successfully!"));
    }

    #[test]
    fn test_new_object_detour_round_trip() {
        let mut state = create_test_state();
        state.page = Page::AddressGroups;
        handle_address_group_new_object(&mut state);
        assert_eq!(state.page, Page::AddressObjects);
        assert_eq!(state.address_object.return_to, Some(ReturnTo::AddressGroup));

        let _ = return_created(&mut state, ReturnTo::AddressGroup, "web-03".into());
        assert_eq!(state.page, Page::AddressGroups);
        assert_eq!(state.address_group.selected_objects, vec!["web-03"]);
        assert!(state.address_group.create_open);
    }

    #[test]
    fn test_items_loaded() {
        let mut state = create_test_state();
        state.service_group.loading = true;
        let items = vec![ServiceItem::Object(ServiceObject {
            name: "http".into(),
            ..ServiceObject::default()
        })];
        handle_service_group_items_loaded(&mut state, Ok(items));
        assert!(!state.service_group.loading);
        assert_eq!(state.service_group.items.len(), 1);
    }

    #[test]
    fn test_browser_failure_clears_loading() {
        let mut state = create_test_state();
        state.address_group.loading = true;
        handle_address_group_browser_loaded(
            &mut state,
            Err(ErrorTranslation::new("Cannot reach the policy backend")),
        );
        assert!(!state.address_group.loading);
        assert!(state.banner.is_some());
    }
}
