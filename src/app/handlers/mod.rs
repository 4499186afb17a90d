//! Message handlers organized by page
//!
//! Every backend call follows the same pattern: set the form's in-flight
//! flag, clone the client into a `Task::perform`, and fold the result back
//! in a `*_completed` handler.

pub mod groups;
pub mod navigation;
pub mod objects;
pub mod rules;

#[cfg(test)]
pub mod test_utils;

pub(crate) use groups::*;
pub(crate) use navigation::*;
pub(crate) use objects::*;
pub(crate) use rules::*;

use crate::app::forms::{FormErrors, ReturnTo};
use crate::app::{Banner, Message, Page, State};
use crate::core::error::{Error, ErrorTranslation, Result};
use iced::Task;
use std::time::Duration;

/// How long success notices stay up
const SUCCESS_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn translated<T>(result: Result<T>) -> std::result::Result<T, ErrorTranslation> {
    result.map_err(|e| e.translate())
}

/// Field error for a name the backend already holds
pub(crate) fn name_conflict(entity: &str, name: &str) -> FormErrors {
    FormErrors {
        name: Some(Error::conflict(entity, name.trim()).translate().user_message),
        ..FormErrors::default()
    }
}

pub(crate) fn show_error(state: &mut State, error: ErrorTranslation) {
    tracing::warn!("{}", error.user_message);
    state.banner = Some(Banner::Error(error));
}

pub(crate) fn expire_success(page: Page) -> Task<Message> {
    Task::perform(
        async move { tokio::time::sleep(SUCCESS_TIMEOUT).await },
        move |()| Message::SuccessExpired(page),
    )
}

/// Hands a freshly created object back to the form that asked for it
pub(crate) fn return_created(state: &mut State, return_to: ReturnTo, name: String) -> Task<Message> {
    match return_to {
        ReturnTo::Rule(field) => {
            state.rule.fill_created(field, name);
            state.page = Page::SecurityRule;
            Task::none()
        }
        ReturnTo::AddressGroup => {
            let form = &mut state.address_group;
            if !form.selected_objects.contains(&name) {
                form.selected_objects.push(name);
            }
            form.create_open = true;
            state.page = Page::AddressGroups;
            Task::done(Message::AddressGroupBrowserRequested)
        }
        ReturnTo::ServiceGroup => {
            let form = &mut state.service_group;
            if !form.selected.contains(&name) {
                form.selected.push(name);
            }
            form.create_open = true;
            state.page = Page::ServiceGroups;
            Task::done(Message::ServiceGroupBrowserRequested)
        }
    }
}

/// Leaves a create form that was opened on another form's behalf
pub(crate) fn return_cancelled(state: &mut State, return_to: Option<ReturnTo>) {
    state.page = match return_to {
        Some(ReturnTo::Rule(_)) => Page::SecurityRule,
        Some(ReturnTo::AddressGroup) => Page::AddressGroups,
        Some(ReturnTo::ServiceGroup) => Page::ServiceGroups,
        None => return,
    };
}
