//! Address and service object pages: lookup, results and create form

use super::{labeled_input, placeholder, section_label, with_error};
use crate::api::MatchedObject;
use crate::app::Message;
use crate::app::forms::{
    AddressObjectDraft, AddressObjectEdit, AddressObjectForm, FormErrors, Lookup, ReturnTo,
    ServiceObjectDraft, ServiceObjectEdit, ServiceObjectForm,
};
use crate::app::ui_components::{
    card_container, invalid_text_input, primary_button, secondary_button, themed_pick_list,
    themed_pick_list_menu, themed_text_input,
};
use crate::core::objects::{AddressType, ServiceProtocol};
use crate::theme::AppTheme;
use iced::widget::{Space, button, column, container, pick_list, row, text, text_input};
use iced::{Alignment, Element, Length};

fn card<'a>(content: impl Into<Element<'a, Message>>, theme: &'a AppTheme) -> Element<'a, Message> {
    container(content)
        .padding(16)
        .width(Length::Fill)
        .style(move |_| card_container(theme))
        .into()
}

fn error_of(errors: Option<&FormErrors>, pick: impl Fn(&FormErrors) -> &Option<String>) -> Option<&str> {
    errors.and_then(|e| pick(e).as_deref())
}

fn return_note(return_to: Option<ReturnTo>) -> Option<&'static str> {
    Some(match return_to? {
        ReturnTo::Rule(_) => "The new object will be filled into the security rule.",
        ReturnTo::AddressGroup => "The new object will be added to the address group members.",
        ReturnTo::ServiceGroup => "The new service will be added to the service group members.",
    })
}

fn form_actions<'a>(
    submit_label: &'a str,
    submitting: bool,
    on_cancel: Message,
    on_submit: Message,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    row![
        Space::new().width(Length::Fill),
        button(text("Cancel").size(13))
            .on_press(on_cancel)
            .padding([8, 16])
            .style(move |_, status| secondary_button(theme, status)),
        button(text(if submitting { "Creating..." } else { submit_label }).size(13))
            .on_press_maybe((!submitting).then_some(on_submit))
            .padding([8, 16])
            .style(move |_, status| primary_button(theme, status)),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}

fn matched_row<'a>(object: &'a MatchedObject, detail: String, theme: &'a AppTheme) -> Element<'a, Message> {
    let mut col = column![
        row![
            text(&object.object_name).size(14).color(theme.fg_primary),
            text(detail).size(12).color(theme.fg_muted),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
    ]
    .spacing(2);

    if let Some(description) = object.description() {
        col = col.push(text(description).size(12).color(theme.fg_secondary));
    }
    let tags = object.tags();
    if !tags.is_empty() {
        col = col.push(text(format!("Tags: {}", tags.join(", "))).size(11).color(theme.fg_muted));
    }
    col.into()
}

// ── Address objects ────────────────────────────────────────────────────────

pub fn view_address_objects<'a>(form: &'a AddressObjectForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let pending = form.lookup.is_pending();
    let lookup = column![
        section_label("IP ADDRESS / RANGE / FQDN", theme),
        row![
            text_input("e.g. 10.0.0.5, 10.0.0.0/24 or app.example.com", &form.lookup_value)
                .on_input(|v| Message::AddressObject(AddressObjectEdit::LookupValue(v)))
                .on_submit(Message::AddressLookupSubmitted)
                .padding(8)
                .style(move |_, status| themed_text_input(theme, status)),
            button(text(if pending { "Checking..." } else { "Check" }).size(13))
                .on_press_maybe((!pending).then_some(Message::AddressLookupSubmitted))
                .padding([8, 16])
                .style(move |_, status| primary_button(theme, status)),
        ]
        .spacing(8),
    ]
    .spacing(4);
    let lookup = match &form.lookup_hint {
        Some(hint) => lookup.push(text(hint).size(12).color(theme.warning)),
        None => lookup,
    };

    let mut page = column![card(lookup, theme)].spacing(16);

    let results: Option<Element<'a, Message>> = match &form.lookup {
        Lookup::Idle => None,
        Lookup::Pending => Some(placeholder("Checking existing objects...", theme)),
        Lookup::Found(objects) => Some(
            objects
                .iter()
                .fold(
                    column![text("Existing address objects").size(14).color(theme.success)].spacing(10),
                    |col, object| {
                        let detail = object.value().unwrap_or_default();
                        col.push(matched_row(object, detail, theme))
                    },
                )
                .into(),
        ),
        Lookup::Missing if form.create.is_none() => Some(
            row![
                text("No address object holds this value.").size(14).color(theme.fg_secondary),
                Space::new().width(Length::Fill),
                button(text("Create Object").size(13))
                    .on_press(Message::AddressCreateOpened)
                    .padding([8, 16])
                    .style(move |_, status| primary_button(theme, status)),
            ]
            .align_y(Alignment::Center)
            .into(),
        ),
        Lookup::Missing => None,
    };
    if let Some(results) = results {
        page = page.push(card(results, theme));
    }

    if let Some(draft) = &form.create {
        page = page.push(card(view_address_create(form, draft, theme), theme));
    }

    page.into()
}

fn view_address_create<'a>(
    form: &'a AddressObjectForm,
    draft: &'a AddressObjectDraft,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    let errors = form.errors.as_ref();

    let type_field = with_error(
        column![
            section_label("TYPE", theme),
            pick_list(AddressType::CREATABLE, Some(draft.address_type), |t| {
                Message::AddressObject(AddressObjectEdit::Type(t))
            })
            .width(Length::Fill)
            .padding(8)
            .style(move |_, status| themed_pick_list(theme, status))
            .menu_style(move |_| themed_pick_list_menu(theme)),
        ]
        .spacing(4),
        error_of(errors, |e| &e.value),
        theme,
    );

    let mut col = column![
        text("Create Address Object").size(18).color(theme.info),
        row![
            labeled_input(
                "OBJECT NAME",
                "e.g. web-server-01",
                &draft.name,
                error_of(errors, |e| &e.name),
                |v| Message::AddressObject(AddressObjectEdit::Name(v)),
                theme,
            ),
            type_field.width(Length::Fill),
        ]
        .spacing(12),
        column![
            section_label("VALUE", theme),
            text(&draft.value).size(14).color(theme.fg_primary),
            text(draft.address_type.display_name()).size(11).color(theme.fg_muted),
        ]
        .spacing(4),
        labeled_input(
            "DESCRIPTION",
            "Optional",
            &draft.description,
            error_of(errors, |e| &e.description),
            |v| Message::AddressObject(AddressObjectEdit::Description(v)),
            theme,
        ),
    ]
    .spacing(12);

    if let Some(note) = return_note(form.return_to) {
        col = col.push(text(note).size(12).color(theme.fg_muted));
    }
    col.push(form_actions(
        "Create Object",
        form.submitting,
        Message::AddressCreateCancelled,
        Message::AddressCreateSubmitted,
        theme,
    ))
    .into()
}

// ── Service objects ────────────────────────────────────────────────────────

pub fn view_service_objects<'a>(form: &'a ServiceObjectForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let pending = form.lookup.is_pending();
    let port_invalid = form.port_error.is_some();

    let lookup = row![
        column![
            section_label("PROTOCOL", theme),
            pick_list(ServiceProtocol::CHECKABLE, Some(form.protocol), |p| {
                Message::ServiceObject(ServiceObjectEdit::Protocol(p))
            })
            .padding(8)
            .style(move |_, status| themed_pick_list(theme, status))
            .menu_style(move |_| themed_pick_list_menu(theme)),
        ]
        .spacing(4)
        .width(Length::Fixed(120.0)),
        with_error(
            column![
                section_label("PORT", theme),
                row![
                    text_input("e.g. 443, 8000-8080 or 80,443", &form.port)
                        .on_input(|v| Message::ServiceObject(ServiceObjectEdit::Port(v)))
                        .on_submit(Message::ServiceLookupSubmitted)
                        .padding(8)
                        .style(move |_, status| if port_invalid {
                            invalid_text_input(theme, status)
                        } else {
                            themed_text_input(theme, status)
                        }),
                    button(text(if pending { "Checking..." } else { "Check" }).size(13))
                        .on_press_maybe((!pending).then_some(Message::ServiceLookupSubmitted))
                        .padding([8, 16])
                        .style(move |_, status| primary_button(theme, status)),
                ]
                .spacing(8),
            ]
            .spacing(4),
            form.port_error.as_deref(),
            theme,
        )
        .width(Length::Fill),
    ]
    .spacing(12);

    let mut page = column![card(lookup, theme)].spacing(16);

    let results: Option<Element<'a, Message>> = match &form.lookup {
        Lookup::Idle => None,
        Lookup::Pending => Some(placeholder("Checking existing services...", theme)),
        Lookup::Found(objects) if objects.is_empty() => Some(
            text("A matching service exists.").size(14).color(theme.success).into(),
        ),
        Lookup::Found(objects) => Some(
            objects
                .iter()
                .fold(
                    column![text("Existing service objects").size(14).color(theme.success)].spacing(10),
                    |col, object| {
                        let detail = format!(
                            "{}/{}",
                            object.protocol().unwrap_or_else(|| "any".into()),
                            object.port().unwrap_or_else(|| "any".into())
                        );
                        col.push(matched_row(object, detail, theme))
                    },
                )
                .into(),
        ),
        Lookup::Missing => Some(
            text("No service matches this protocol and port.")
                .size(14)
                .color(theme.fg_secondary)
                .into(),
        ),
    };
    if let Some(results) = results {
        page = page.push(card(results, theme));
    }

    let page = match &form.create {
        Some(draft) => page.push(card(view_service_create(form, draft, theme), theme)),
        None if matches!(form.lookup, Lookup::Idle) => page.push(
            row![
                Space::new().width(Length::Fill),
                button(text("New Service").size(13))
                    .on_press(Message::ServiceCreateOpened)
                    .padding([8, 16])
                    .style(move |_, status| secondary_button(theme, status)),
            ],
        ),
        None => page,
    };
    page.into()
}

fn view_service_create<'a>(
    form: &'a ServiceObjectForm,
    draft: &'a ServiceObjectDraft,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    let errors = form.errors.as_ref();

    let mut col = column![
        text("Create Service Object").size(18).color(theme.info),
        labeled_input(
            "SERVICE NAME",
            "e.g. TCP_8080",
            &draft.name,
            error_of(errors, |e| &e.name),
            |v| Message::ServiceObject(ServiceObjectEdit::Name(v)),
            theme,
        ),
        row![
            column![
                section_label("PROTOCOL", theme),
                pick_list(ServiceProtocol::CHECKABLE, Some(draft.protocol), |p| {
                    Message::ServiceObject(ServiceObjectEdit::CreateProtocol(p))
                })
                .padding(8)
                .style(move |_, status| themed_pick_list(theme, status))
                .menu_style(move |_| themed_pick_list_menu(theme)),
            ]
            .spacing(4)
            .width(Length::Fixed(120.0)),
            labeled_input(
                "PORT",
                "e.g. 8080",
                &draft.port,
                error_of(errors, |e| &e.port),
                |v| Message::ServiceObject(ServiceObjectEdit::CreatePort(v)),
                theme,
            ),
        ]
        .spacing(12),
        labeled_input(
            "DESCRIPTION",
            "Optional",
            &draft.description,
            error_of(errors, |e| &e.description),
            |v| Message::ServiceObject(ServiceObjectEdit::Description(v)),
            theme,
        ),
        labeled_input(
            "TAGS",
            "Comma separated, optional",
            &draft.tags,
            None,
            |v| Message::ServiceObject(ServiceObjectEdit::Tags(v)),
            theme,
        ),
    ]
    .spacing(12);

    if let Some(note) = return_note(form.return_to) {
        col = col.push(text(note).size(12).color(theme.fg_muted));
    }
    col.push(form_actions(
        "Create Service",
        form.submitting,
        Message::ServiceCreateCancelled,
        Message::ServiceCreateSubmitted,
        theme,
    ))
    .into()
}
