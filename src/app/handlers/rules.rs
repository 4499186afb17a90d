//! Security rule submission
//!
//! Handles:
//! - Resolving the draft into a request and showing the preview
//! - Sending the previewed request
//! - Detours to create a missing address or service object

use crate::api::CreateRuleRequest;
use crate::app::forms::ReturnTo;
use crate::app::handlers::{expire_success, show_error, translated};
use crate::app::{Message, Page, State};
use crate::audit::{self, EventType};
use crate::core::error::ErrorTranslation;
use crate::core::objects::FirewallPath;
use crate::core::rules::{self, IssueKind, RuleField, RuleIssue};
use iced::Task;
use tracing::{error, info, warn};

/// Selects from the cached list right away, then re-reads the hierarchy
/// so a firewall moved on the backend shows its current chain
pub(crate) fn handle_firewall_selected(state: &mut State, hostname: String) -> Task<Message> {
    state.rule.select_firewall(hostname);
    let client = state.client.clone();
    Task::perform(
        async move { translated(client.firewall_hierarchy().await) },
        Message::FirewallsRefreshed,
    )
}

pub(crate) fn handle_firewalls_refreshed(
    state: &mut State,
    result: Result<Vec<FirewallPath>, ErrorTranslation>,
) {
    match result {
        Ok(firewalls) => state.rule.refresh_firewalls(firewalls),
        Err(e) => warn!("Keeping cached firewall hierarchy: {}", e.user_message),
    }
}

pub(crate) fn handle_rule_preview(state: &mut State) -> Task<Message> {
    let form = &mut state.rule;
    if form.resolving || form.submitting {
        return Task::none();
    }
    form.resolving = true;
    form.success = None;

    let draft = form.draft.clone();
    let client = state.client.clone();
    Task::perform(
        async move { rules::resolve(&client, &draft).await },
        Message::RuleResolved,
    )
}

pub(crate) fn handle_rule_resolved(
    state: &mut State,
    result: Result<CreateRuleRequest, Vec<RuleIssue>>,
) {
    let form = &mut state.rule;
    form.resolving = false;
    match result {
        Ok(request) => {
            form.issues.clear();
            form.preview = Some(request);
        }
        Err(issues) => {
            info!("Rule draft has {} issue(s)", issues.len());
            form.issues = issues;
            form.preview = None;
        }
    }
}

/// Sends exactly what the preview showed
pub(crate) fn handle_rule_submit(state: &mut State) -> Task<Message> {
    let form = &mut state.rule;
    if form.submitting {
        return Task::none();
    }
    let Some(request) = form.preview.clone() else {
        return Task::none();
    };
    form.submitting = true;

    let client = state.client.clone();
    let audit_enabled = state.config.enable_audit_log;
    Task::perform(
        async move {
            let outcome = client.create_rule(&request).await;
            audit::log_create(
                audit_enabled,
                EventType::CreateRule,
                client.base_url(),
                serde_json::json!({
                    "name": request.name,
                    "location": request.location,
                    "rule_type": request.rule_type,
                    "action": request.action,
                }),
                &outcome,
            )
            .await;
            translated(outcome)
        },
        Message::RuleCreated,
    )
}

pub(crate) fn handle_rule_created(
    state: &mut State,
    result: Result<String, ErrorTranslation>,
) -> Task<Message> {
    let form = &mut state.rule;
    form.submitting = false;
    form.preview = None;
    match result {
        Ok(name) => {
            info!("Created rule '{name}'");
            form.finish_create(&name);
            expire_success(Page::SecurityRule)
        }
        Err(e) => {
            show_error(state, e);
            Task::none()
        }
    }
}

/// Opens the matching create form for a reference the backend didn't know
pub(crate) fn handle_rule_missing_create(state: &mut State, field: RuleField) {
    let Some(issue) = state.rule.issue(field).cloned() else {
        error!("No missing reference recorded for {}", field.label());
        return;
    };
    let return_to = Some(ReturnTo::Rule(field));

    match issue.kind {
        IssueKind::MissingAddressObject(value) => {
            state.address_object.cancel_create();
            state.address_object.open_create(&value, return_to);
            state.page = Page::AddressObjects;
        }
        IssueKind::MissingService(value) => {
            state.service_object.cancel_create();
            state.service_object.open_create_for_service(&value, return_to);
            state.page = Page::ServiceObjects;
        }
        IssueKind::Invalid(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Banner;
    use crate::app::forms::{RuleCatalog, RuleEdit};
    use crate::app::handlers::test_utils::create_test_state;
    use crate::core::objects::ServiceProtocol;

    fn issue(field: RuleField, kind: IssueKind) -> RuleIssue {
        RuleIssue { field, kind }
    }

    fn fw(path: &[&str]) -> FirewallPath {
        FirewallPath {
            hostname: "fw-01".into(),
            path: path.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_firewall_selection_uses_refreshed_chain() {
        let mut state = create_test_state();
        state.rule.load_catalog(RuleCatalog {
            firewalls: vec![fw(&["Global", "EU", "fw-01"])],
            ..RuleCatalog::default()
        });

        let _ = handle_firewall_selected(&mut state, "fw-01".into());
        assert!(state.rule.view.is_expanded("Global/EU"));

        handle_firewalls_refreshed(&mut state, Ok(vec![fw(&["Global", "US", "fw-01"])]));
        assert!(state.rule.view.is_expanded("Global/US"));
        assert!(!state.rule.view.is_expanded("Global/EU"));
    }

    #[test]
    fn test_failed_refresh_keeps_cached_hierarchy() {
        let mut state = create_test_state();
        state.rule.load_catalog(RuleCatalog {
            firewalls: vec![fw(&["Global", "EU", "fw-01"])],
            ..RuleCatalog::default()
        });
        let _ = handle_firewall_selected(&mut state, "fw-01".into());

        handle_firewalls_refreshed(&mut state, Err(ErrorTranslation::new("Backend down")));
        assert_eq!(state.rule.firewalls, vec![fw(&["Global", "EU", "fw-01"])]);
        assert!(state.rule.view.is_expanded("Global/EU"));
        assert!(state.banner.is_none());
    }

    #[test]
    fn test_resolved_issues_block_preview() {
        let mut state = create_test_state();
        state.rule.resolving = true;
        handle_rule_resolved(
            &mut state,
            Err(vec![issue(RuleField::Name, IssueKind::Invalid("Rule name is required".into()))]),
        );
        assert!(!state.rule.resolving);
        assert!(state.rule.preview.is_none());
        assert!(state.rule.issue(RuleField::Name).is_some());
    }

    #[test]
    fn test_submit_needs_preview() {
        let mut state = create_test_state();
        let _ = handle_rule_submit(&mut state);
        assert!(!state.rule.submitting);
    }

    #[test]
    fn test_missing_address_opens_object_form() {
        let mut state = create_test_state();
        state.page = Page::SecurityRule;
        state.rule.issues = vec![issue(
            RuleField::DestinationIp,
            IssueKind::MissingAddressObject("10.9.9.9".into()),
        )];

        handle_rule_missing_create(&mut state, RuleField::DestinationIp);
        assert_eq!(state.page, Page::AddressObjects);
        let form = &state.address_object;
        assert_eq!(form.create.as_ref().unwrap().value, "10.9.9.9");
        assert_eq!(form.return_to, Some(ReturnTo::Rule(RuleField::DestinationIp)));
    }

    #[test]
    fn test_missing_service_opens_service_form() {
        let mut state = create_test_state();
        state.rule.issues = vec![issue(
            RuleField::Service,
            IssueKind::MissingService("tcp/8443".into()),
        )];

        handle_rule_missing_create(&mut state, RuleField::Service);
        assert_eq!(state.page, Page::ServiceObjects);
        let draft = state.service_object.create.as_ref().unwrap();
        assert_eq!(draft.protocol, ServiceProtocol::Tcp);
        assert_eq!(draft.port, "8443");
    }

    #[test]
    fn test_rule_created_keeps_firewall() {
        let mut state = create_test_state();
        state.rule.load_catalog(RuleCatalog {
            firewalls: vec![FirewallPath {
                hostname: "fw-01".into(),
                path: vec!["Global".into()],
            }],
            ..RuleCatalog::default()
        });
        state.rule.select_firewall("fw-01".into());
        state.rule.apply(RuleEdit::Name("allow-web".into()));
        state.rule.submitting = true;

        let _ = handle_rule_created(&mut state, Ok("allow-web".into()));
        assert!(!state.rule.submitting);
        assert_eq!(state.rule.draft.firewall.as_deref(), Some("fw-01"));
        assert_eq!(
            state.rule.success.as_deref(),
            Some("Rule \"allow-web\" created successfully!")
        );
    }

    #[test]
    fn test_rule_failure_keeps_draft() {
        let mut state = create_test_state();
        state.rule.apply(RuleEdit::Name("allow-web".into()));
        state.rule.submitting = true;

        let _ = handle_rule_created(
            &mut state,
            Err(ErrorTranslation::new("Failed to create rule: duplicate")),
        );
        assert_eq!(state.rule.draft.name, "allow-web");
        assert!(matches!(state.banner, Some(Banner::Error(_))));
    }
}
