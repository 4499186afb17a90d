//! Address and service object handlers
//!
//! Handles:
//! - Address lookups and object creation
//! - Service lookups, name checks and object creation
//! - Returning a created object to the form that asked for it

use crate::api::{SERVICE_OBJECT_TYPE, ServiceQuery};
use crate::app::forms::Lookup;
use crate::app::handlers::{name_conflict, return_cancelled, return_created, show_error, translated};
use crate::app::{Banner, Message, State};
use crate::audit::{self, EventType};
use crate::core::error::ErrorTranslation;
use iced::Task;
use tracing::{info, warn};

// ── Address objects ────────────────────────────────────────────────────────

pub(crate) fn handle_address_lookup(state: &mut State) -> Task<Message> {
    let form = &mut state.address_object;
    if form.lookup.is_pending() {
        return Task::none();
    }
    let value = match form.lookup_query() {
        Ok(value) => value,
        Err(reason) => {
            form.lookup_hint = Some(reason);
            return Task::none();
        }
    };

    form.lookup = Lookup::Pending;
    form.create = None;
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.check_object(&value).await) },
        Message::AddressLookupCompleted,
    )
}

pub(crate) fn handle_address_lookup_completed(
    state: &mut State,
    result: Result<Vec<crate::api::MatchedObject>, ErrorTranslation>,
) {
    match result {
        Ok(objects) if objects.is_empty() => state.address_object.lookup = Lookup::Missing,
        Ok(objects) => {
            info!("Found {} address object(s)", objects.len());
            state.address_object.lookup = Lookup::Found(objects);
        }
        Err(e) => {
            state.address_object.lookup = Lookup::Idle;
            show_error(state, e);
        }
    }
}

pub(crate) fn handle_address_create_cancelled(state: &mut State) -> Task<Message> {
    let return_to = state.address_object.return_to;
    state.address_object.cancel_create();
    return_cancelled(state, return_to);
    Task::none()
}

pub(crate) fn handle_address_create(state: &mut State) -> Task<Message> {
    let form = &mut state.address_object;
    if form.submitting {
        return Task::none();
    }
    if let Some(errors) = form.validate() {
        form.errors = Some(errors);
        return Task::none();
    }
    let Some(request) = form.to_request() else {
        return Task::none();
    };

    form.submitting = true;
    let client = state.client.clone();
    let audit_enabled = state.config.enable_audit_log;
    Task::perform(
        async move {
            let outcome = client.create_object(&request).await;
            audit::log_create(
                audit_enabled,
                EventType::CreateAddressObject,
                client.base_url(),
                serde_json::json!({
                    "name": request.object_name,
                    "value": request.value,
                    "type": request.address_type,
                }),
                &outcome,
            )
            .await;
            translated(outcome)
        },
        Message::AddressCreateCompleted,
    )
}

pub(crate) fn handle_address_create_completed(
    state: &mut State,
    result: Result<String, ErrorTranslation>,
) -> Task<Message> {
    let form = &mut state.address_object;
    form.submitting = false;

    match result {
        Ok(name) => {
            info!("Created address object '{name}'");
            let return_to = form.return_to;
            form.cancel_create();
            form.lookup = Lookup::Idle;
            match return_to {
                Some(target) => return_created(state, target, name),
                None => {
                    state.banner = Some(Banner::Success(format!(
                        "Address object \"{name}\" created successfully!"
                    )));
                    super::expire_success(state.page)
                }
            }
        }
        Err(e) => {
            show_error(state, e);
            Task::none()
        }
    }
}

// ── Service objects ────────────────────────────────────────────────────────

pub(crate) fn handle_service_lookup(state: &mut State) -> Task<Message> {
    let form = &mut state.service_object;
    if form.lookup.is_pending() {
        return Task::none();
    }
    let port = match form.lookup_query() {
        Ok(port) => port,
        Err(reason) => {
            form.port_error = Some(reason);
            return Task::none();
        }
    };

    form.lookup = Lookup::Pending;
    form.create = None;
    let query = ServiceQuery::by_port(form.protocol.to_string(), port);
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.check_service(&query).await) },
        Message::ServiceLookupCompleted,
    )
}

/// A miss opens the create form straight away
pub(crate) fn handle_service_lookup_completed(
    state: &mut State,
    result: Result<Option<Vec<crate::api::MatchedObject>>, ErrorTranslation>,
) {
    let form = &mut state.service_object;
    match result {
        Ok(Some(objects)) => form.lookup = Lookup::Found(objects),
        Ok(None) => {
            form.lookup = Lookup::Missing;
            let port = form.port.clone();
            form.open_create(form.protocol, &port, form.return_to);
        }
        Err(e) => {
            form.lookup = Lookup::Idle;
            show_error(state, e);
        }
    }
}

pub(crate) fn handle_service_create_cancelled(state: &mut State) -> Task<Message> {
    let return_to = state.service_object.return_to;
    state.service_object.cancel_create();
    return_cancelled(state, return_to);
    Task::none()
}

/// Validates locally, then checks the name before creating
pub(crate) fn handle_service_create(state: &mut State) -> Task<Message> {
    let form = &mut state.service_object;
    if form.submitting {
        return Task::none();
    }
    if let Some(errors) = form.validate() {
        form.errors = Some(errors);
        return Task::none();
    }
    let Some(name) = form.create.as_ref().map(|d| d.name.trim().to_string()) else {
        return Task::none();
    };

    form.submitting = true;
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.check_object_name(&name, SERVICE_OBJECT_TYPE).await) },
        Message::ServiceNameChecked,
    )
}

pub(crate) fn handle_service_name_checked(
    state: &mut State,
    result: Result<bool, ErrorTranslation>,
) -> Task<Message> {
    let form = &mut state.service_object;
    let taken = result.unwrap_or_else(|e| {
        warn!("Service name check failed: {}", e.user_message);
        false
    });
    if taken {
        form.submitting = false;
        let name = form.create.as_ref().map(|d| d.name.clone()).unwrap_or_default();
        form.errors = Some(name_conflict("Service object", &name));
        return Task::none();
    }

    let Some(request) = form.to_request(&state.config.default_device_group) else {
        form.submitting = false;
        return Task::none();
    };
    let client = state.client.clone();
    let audit_enabled = state.config.enable_audit_log;
    Task::perform(
        async move {
            let outcome = client.create_service(&request).await;
            audit::log_create(
                audit_enabled,
                EventType::CreateServiceObject,
                client.base_url(),
                serde_json::json!({
                    "name": request.object_name,
                    "protocol": request.protocol,
                    "port": request.port,
                }),
                &outcome,
            )
            .await;
            translated(outcome)
        },
        Message::ServiceCreateCompleted,
    )
}

pub(crate) fn handle_service_create_completed(
    state: &mut State,
    result: Result<String, ErrorTranslation>,
) -> Task<Message> {
    let form = &mut state.service_object;
    form.submitting = false;

    match result {
        Ok(name) => {
            info!("Created service object '{name}'");
            let return_to = form.return_to;
            form.cancel_create();
            form.lookup = Lookup::Idle;
            match return_to {
                Some(target) => return_created(state, target, name),
                None => {
                    state.banner = Some(Banner::Success(format!(
                        "Service object \"{name}\" created successfully!"
                    )));
                    super::expire_success(state.page)
                }
            }
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
    use crate::api::MatchedObject;
    use crate::app::Page;
    use crate::app::forms::ReturnTo;
    use crate::app::handlers::test_utils::create_test_state;
    use crate::core::objects::ServiceProtocol;
    use crate::core::rules::RuleField;

    #[test]
    fn test_invalid_lookup_stays_local() {
        let mut state = create_test_state();
        state.address_object.lookup_value = "300.1.1.1".into();
        let _ = handle_address_lookup(&mut state);
        assert_eq!(state.address_object.lookup, Lookup::Idle);
        assert!(state.address_object.lookup_hint.is_some());
    }

    #[test]
    fn test_empty_lookup_result_is_missing() {
        let mut state = create_test_state();
        state.address_object.lookup = Lookup::Pending;
        handle_address_lookup_completed(&mut state, Ok(Vec::new()));
        assert_eq!(state.address_object.lookup, Lookup::Missing);

        let found = vec![MatchedObject {
            object_name: "web-01".into(),
            ..MatchedObject::default()
        }];
        handle_address_lookup_completed(&mut state, Ok(found.clone()));
        assert_eq!(state.address_object.lookup, Lookup::Found(found));
    }

    #[test]
    fn test_address_create_blocks_invalid_form() {
        let mut state = create_test_state();
        state.address_object.open_create("10.0.0.1", None);
        let _ = handle_address_create(&mut state);
        assert!(!state.address_object.submitting);
        assert!(state.address_object.errors.as_ref().unwrap().name.is_some());
    }

    #[test]
    fn test_created_address_returns_to_rule() {
        let mut state = create_test_state();
        state.page = Page::AddressObjects;
        state
            .address_object
            .open_create("10.9.9.9", Some(ReturnTo::Rule(RuleField::SourceIp)));
        state.address_object.submitting = true;

        let _ = handle_address_create_completed(&mut state, Ok("srv-10_9_9_9".into()));
        assert_eq!(state.page, Page::SecurityRule);
        assert_eq!(state.rule.draft.source_ip, "srv-10_9_9_9");
        assert!(state.address_object.create.is_none());
        assert!(!state.address_object.submitting);
    }

    #[test]
    fn test_cancel_returns_to_caller() {
        let mut state = create_test_state();
        state.page = Page::ServiceObjects;
        state
            .service_object
            .open_create_for_service("tcp/8443", Some(ReturnTo::ServiceGroup));
        let _ = handle_service_create_cancelled(&mut state);
        assert_eq!(state.page, Page::ServiceGroups);
        assert!(state.service_object.create.is_none());
    }

    #[test]
    fn test_service_miss_opens_create() {
        let mut state = create_test_state();
        state.service_object.protocol = ServiceProtocol::Udp;
        state.service_object.port = "5353".into();
        handle_service_lookup_completed(&mut state, Ok(None));

        assert_eq!(state.service_object.lookup, Lookup::Missing);
        let draft = state.service_object.create.as_ref().unwrap();
        assert_eq!(draft.name, "UDP_5353");
    }

    #[test]
    fn test_taken_service_name_blocks_create() {
        let mut state = create_test_state();
        state
            .service_object
            .open_create(ServiceProtocol::Tcp, "8080", None);
        state.service_object.submitting = true;

        let _ = handle_service_name_checked(&mut state, Ok(true));
        assert!(!state.service_object.submitting);
        assert_eq!(
            state.service_object.errors.as_ref().unwrap().name.as_deref(),
            Some("Service object name 'TCP_8080' is already in use")
        );
    }

    #[test]
    fn test_failed_name_check_proceeds() {
        let mut state = create_test_state();
        state
            .service_object
            .open_create(ServiceProtocol::Tcp, "8080", None);
        state.service_object.submitting = true;

        let _ = handle_service_name_checked(
            &mut state,
            Err(ErrorTranslation::new("Cannot reach the policy backend")),
        );
        assert!(state.service_object.submitting);
        assert!(state.service_object.errors.is_none());
    }

    #[test]
    fn test_create_failure_keeps_form() {
        let mut state = create_test_state();
        state
            .service_object
            .open_create(ServiceProtocol::Tcp, "8080", None);
        state.service_object.submitting = true;

        let _ = handle_service_create_completed(
            &mut state,
            Err(ErrorTranslation::new("Failed to create service object")),
        );
        assert!(state.service_object.create.is_some());
        assert!(matches!(state.banner, Some(Banner::Error(_))));
    }
}
