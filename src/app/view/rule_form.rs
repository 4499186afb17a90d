//! Security rule form
//!
//! Firewall and location come first since the location picker depends on the
//! selected firewall. Backend-resolved issues render under their field, with
//! a create button when the missing reference can be created in place.

use super::{hierarchy, placeholder, section_label};
use crate::app::Message;
use crate::app::forms::{RuleEdit, RuleForm};
use crate::app::ui_components::{
    card_container, invalid_text_input, primary_button, secondary_button, themed_checkbox,
    themed_pick_list, themed_pick_list_menu, themed_text_input,
};
use crate::core::objects::{ProfileCategory, RuleAction, RuleType, ServiceOption};
use crate::core::rules::RuleField;
use crate::theme::AppTheme;
use iced::widget::{Column, Space, button, checkbox, column, container, pick_list, row, text, text_input};
use iced::{Alignment, Element, Length};
use strum::IntoEnumIterator;

fn section<'a>(title: &'a str, body: impl Into<Element<'a, Message>>, theme: &'a AppTheme) -> Element<'a, Message> {
    container(column![text(title).size(15).color(theme.info), body.into()].spacing(10))
        .padding(16)
        .width(Length::Fill)
        .style(move |_| card_container(theme))
        .into()
}

/// Appends the field's issue and, for missing references, a create button
fn with_issue<'a>(
    field_col: Column<'a, Message>,
    form: &'a RuleForm,
    field: RuleField,
    theme: &'a AppTheme,
) -> Column<'a, Message> {
    let Some(issue) = form.issue(field) else {
        return field_col;
    };
    let message = text(issue.message()).size(12).color(theme.danger);
    if issue.offers_creation() {
        field_col.push(
            row![
                message,
                Space::new().width(Length::Fill),
                button(text("Create").size(12))
                    .on_press(Message::RuleMissingCreateRequested(field))
                    .padding([4, 10])
                    .style(move |_, status| secondary_button(theme, status)),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
    } else {
        field_col.push(message)
    }
}

fn rule_input<'a>(
    form: &'a RuleForm,
    field: RuleField,
    placeholder_text: &'a str,
    value: &'a str,
    on_input: impl Fn(String) -> Message + 'a,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    let invalid = form.issue(field).is_some();
    let input = text_input(placeholder_text, value)
        .on_input(on_input)
        .padding(8)
        .style(move |_, status| {
            if invalid {
                invalid_text_input(theme, status)
            } else {
                themed_text_input(theme, status)
            }
        });

    with_issue(
        column![section_label(field.label(), theme), input].spacing(4),
        form,
        field,
        theme,
    )
    .width(Length::Fill)
    .into()
}

fn flag<'a>(label: &'a str, checked: bool, edit: fn(bool) -> RuleEdit, theme: &'a AppTheme) -> Element<'a, Message> {
    checkbox(checked)
        .label(label)
        .on_toggle(move |v| Message::Rule(edit(v)))
        .size(16)
        .text_size(13)
        .spacing(6)
        .style(move |_, status| themed_checkbox(theme, status))
        .into()
}

pub fn view_rule_form<'a>(form: &'a RuleForm, theme: &'a AppTheme) -> Element<'a, Message> {
    if form.loading {
        return placeholder("Loading firewalls, applications and profiles...", theme);
    }
    if !form.catalog_loaded {
        return column![
            placeholder("The firewall list could not be loaded.", theme),
            button(text("Retry").size(13))
                .on_press(Message::PageSelected(crate::app::Page::SecurityRule))
                .padding([8, 16])
                .style(move |_, status| primary_button(theme, status)),
        ]
        .spacing(8)
        .align_x(Alignment::Center)
        .into();
    }

    let mut page = column![
        view_location(form, theme),
        view_general(form, theme),
        view_traffic(form, theme),
        view_options(form, theme),
        view_profiles(form, theme),
    ]
    .spacing(16);

    if let Some(success) = &form.success {
        page = page.push(text(success).size(14).color(theme.success));
    }

    page.push(
        row![
            Space::new().width(Length::Fill),
            button(text(if form.resolving { "Checking references..." } else { "Preview Rule" }).size(13))
                .on_press_maybe((!form.resolving).then_some(Message::RulePreviewRequested))
                .padding([8, 16])
                .style(move |_, status| primary_button(theme, status)),
        ]
        .align_y(Alignment::Center),
    )
    .into()
}

fn view_location<'a>(form: &'a RuleForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let hostnames: Vec<String> = form.firewalls.iter().map(|f| f.hostname.clone()).collect();

    let firewall = with_issue(
        column![
            section_label(RuleField::Firewall.label(), theme),
            pick_list(hostnames, form.draft.firewall.clone(), Message::FirewallSelected)
                .placeholder("Select a firewall")
                .width(Length::Fill)
                .padding(8)
                .style(move |_, status| themed_pick_list(theme, status))
                .menu_style(move |_| themed_pick_list_menu(theme)),
        ]
        .spacing(4),
        form,
        RuleField::Firewall,
        theme,
    );

    let location = column![
        hierarchy::view_tree(form.tree.as_ref(), &form.view, theme),
        rule_input(
            form,
            RuleField::Location,
            "Pick from the tree or type a device group (or shared)",
            &form.draft.manual_location,
            |v| Message::Rule(RuleEdit::ManualLocation(v)),
            theme,
        ),
    ]
    .spacing(8);

    section("Firewall & Location", column![firewall, location].spacing(12), theme)
}

fn view_general<'a>(form: &'a RuleForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let draft = &form.draft;
    section(
        "General",
        column![
            rule_input(
                form,
                RuleField::Name,
                "e.g. allow-web-inbound",
                &draft.name,
                |v| Message::Rule(RuleEdit::Name(v)),
                theme,
            ),
            rule_input(
                form,
                RuleField::Description,
                "Optional",
                &draft.description,
                |v| Message::Rule(RuleEdit::Description(v)),
                theme,
            ),
        ]
        .spacing(12),
        theme,
    )
}

fn view_traffic<'a>(form: &'a RuleForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let draft = &form.draft;

    let selected_service = form.services.iter().find(|o| o.name == draft.service).cloned();
    let service = with_issue(
        column![
            section_label(RuleField::Service.label(), theme),
            row![
                text_input("any, a service name or tcp/8443", &draft.service)
                    .on_input(|v| Message::Rule(RuleEdit::Service(v)))
                    .padding(8)
                    .style(move |_, status| themed_text_input(theme, status)),
                pick_list(form.services.as_slice(), selected_service, |o: ServiceOption| {
                    Message::Rule(RuleEdit::Service(o.name))
                })
                .placeholder("Known services")
                .width(Length::Fixed(220.0))
                .padding(8)
                .style(move |_, status| themed_pick_list(theme, status))
                .menu_style(move |_| themed_pick_list_menu(theme)),
            ]
            .spacing(8),
        ]
        .spacing(4),
        form,
        RuleField::Service,
        theme,
    );

    let selected_app = form
        .applications
        .iter()
        .find(|a| **a == draft.application)
        .cloned();
    let application = with_issue(
        column![
            section_label(RuleField::Application.label(), theme),
            pick_list(form.applications.as_slice(), selected_app, |a| {
                Message::Rule(RuleEdit::Application(a))
            })
            .placeholder("any")
            .width(Length::Fill)
            .padding(8)
            .style(move |_, status| themed_pick_list(theme, status))
            .menu_style(move |_| themed_pick_list_menu(theme)),
        ]
        .spacing(4),
        form,
        RuleField::Application,
        theme,
    );

    section(
        "Traffic",
        column![
            row![
                rule_input(
                    form,
                    RuleField::SourceZone,
                    "e.g. trust",
                    &draft.source_zone,
                    |v| Message::Rule(RuleEdit::SourceZone(v)),
                    theme,
                ),
                rule_input(
                    form,
                    RuleField::DestinationZone,
                    "e.g. untrust",
                    &draft.destination_zone,
                    |v| Message::Rule(RuleEdit::DestinationZone(v)),
                    theme,
                ),
            ]
            .spacing(12),
            row![
                rule_input(
                    form,
                    RuleField::SourceIp,
                    "any, 10.0.0.5 or 10.0.0.0/24",
                    &draft.source_ip,
                    |v| Message::Rule(RuleEdit::SourceIp(v)),
                    theme,
                ),
                rule_input(
                    form,
                    RuleField::DestinationIp,
                    "any, 10.0.0.5 or 10.0.0.0/24",
                    &draft.destination_ip,
                    |v| Message::Rule(RuleEdit::DestinationIp(v)),
                    theme,
                ),
            ]
            .spacing(12),
            service,
            application,
        ]
        .spacing(12),
        theme,
    )
}

fn view_options<'a>(form: &'a RuleForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let draft = &form.draft;

    let pickers = row![
        column![
            section_label("ACTION", theme),
            pick_list(RuleAction::iter().collect::<Vec<_>>(), Some(draft.action), |a| {
                Message::Rule(RuleEdit::Action(a))
            })
            .width(Length::Fill)
            .padding(8)
            .style(move |_, status| themed_pick_list(theme, status))
            .menu_style(move |_| themed_pick_list_menu(theme)),
        ]
        .spacing(4)
        .width(Length::Fill),
        column![
            section_label("RULE TYPE", theme),
            pick_list(RuleType::iter().collect::<Vec<_>>(), Some(draft.rule_type), |t| {
                Message::Rule(RuleEdit::RuleType(t))
            })
            .width(Length::Fill)
            .padding(8)
            .style(move |_, status| themed_pick_list(theme, status))
            .menu_style(move |_| themed_pick_list_menu(theme)),
        ]
        .spacing(4)
        .width(Length::Fill),
        column![
            section_label("LOG FORWARDING", theme),
            text_input("Optional profile name", &draft.log_setting)
                .on_input(|v| Message::Rule(RuleEdit::LogSetting(v)))
                .padding(8)
                .style(move |_, status| themed_text_input(theme, status)),
        ]
        .spacing(4)
        .width(Length::Fill),
    ]
    .spacing(12);

    let flags = row![
        flag("Disabled", draft.disabled, RuleEdit::Disabled, theme),
        flag("Log at start", draft.log_start, RuleEdit::LogStart, theme),
        flag("Log at end", draft.log_end, RuleEdit::LogEnd, theme),
        flag("Negate source", draft.negate_source, RuleEdit::NegateSource, theme),
        flag("Negate destination", draft.negate_destination, RuleEdit::NegateDestination, theme),
    ]
    .spacing(16)
    .wrap();

    section("Options", column![pickers, flags].spacing(12), theme)
}

fn view_profiles<'a>(form: &'a RuleForm, theme: &'a AppTheme) -> Element<'a, Message> {
    if form.profiles.is_empty() {
        return section(
            "Security Profiles",
            text("No security profiles available").size(12).color(theme.fg_muted),
            theme,
        );
    }

    let rows = ProfileCategory::iter().fold(column![].spacing(8), |col, category| {
        let names = form.profiles.names(category);
        if names.is_empty() {
            return col;
        }
        let current = form.draft.security_profiles.get(category);
        let selected = (!current.is_empty()).then(|| current.to_string());

        col.push(
            row![
                text(category.label())
                    .size(13)
                    .color(theme.fg_secondary)
                    .width(Length::Fixed(160.0)),
                pick_list(names, selected, move |v| Message::Rule(RuleEdit::Profile(category, v)))
                    .placeholder("None")
                    .width(Length::Fill)
                    .padding(6)
                    .style(move |_, status| themed_pick_list(theme, status))
                    .menu_style(move |_| themed_pick_list_menu(theme)),
                button(text("×").size(12))
                    .on_press_maybe(
                        (!current.is_empty())
                            .then(|| Message::Rule(RuleEdit::Profile(category, String::new())))
                    )
                    .padding([4, 8])
                    .style(move |_, status| secondary_button(theme, status)),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
    });

    section("Security Profiles", rows, theme)
}
