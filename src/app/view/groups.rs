//! Address and service group pages: search, member browser and create form

use super::{labeled_input, placeholder, section_label, with_error};
use crate::api::{GroupMatch, SearchResults};
use crate::app::Message;
use crate::app::forms::{
    AddressGroupEdit, AddressGroupForm, BrowserKind, Lookup, ServiceGroupEdit, ServiceGroupForm,
};
use crate::app::ui_components::{
    card_container, nav_button, primary_button, row_button, secondary_button,
    themed_checkbox, themed_pick_list, themed_pick_list_menu, themed_scrollable, themed_text_input,
};
use crate::core::objects::{GroupType, ServiceItem};
use crate::theme::AppTheme;
use iced::widget::{
    Column, Space, button, checkbox, column, container, pick_list, row, scrollable, text,
    text_input,
};
use iced::{Alignment, Element, Length};
use strum::IntoEnumIterator;

const BROWSER_HEIGHT: f32 = 280.0;

fn card<'a>(content: impl Into<Element<'a, Message>>, theme: &'a AppTheme) -> Element<'a, Message> {
    container(content)
        .padding(16)
        .width(Length::Fill)
        .style(move |_| card_container(theme))
        .into()
}

fn search_bar<'a>(
    placeholder_text: &'a str,
    term: &'a str,
    pending: bool,
    on_input: impl Fn(String) -> Message + 'a,
    on_submit: Message,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    row![
        text_input(placeholder_text, term)
            .on_input(on_input)
            .on_submit(on_submit.clone())
            .padding(8)
            .style(move |_, status| themed_text_input(theme, status)),
        button(text(if pending { "Searching..." } else { "Search" }).size(13))
            .on_press_maybe((!pending).then_some(on_submit))
            .padding([8, 16])
            .style(move |_, status| primary_button(theme, status)),
    ]
    .spacing(8)
    .into()
}

fn view_group_match<'a>(group: &'a GroupMatch, theme: &'a AppTheme) -> Element<'a, Message> {
    let mut col = column![text(&group.name).size(15).color(theme.fg_primary)].spacing(4);
    if let Some(details) = &group.details {
        let mut meta = Vec::new();
        if let Some(group_type) = &details.group_type {
            meta.push(format!("Type: {group_type}"));
        }
        if let Some(location) = &details.location {
            meta.push(format!("Location: {location}"));
        }
        if !meta.is_empty() {
            col = col.push(text(meta.join("  ·  ")).size(12).color(theme.fg_muted));
        }
        if let Some(description) = details.description.as_deref().filter(|d| !d.is_empty()) {
            col = col.push(text(description).size(12).color(theme.fg_secondary));
        }
        col = col.push(
            text(format!("Members: {}", details.members.join(", ")))
                .size(12)
                .color(theme.fg_secondary),
        );
        if !details.tags.is_empty() {
            col = col.push(
                text(format!("Tags: {}", details.tags.join(", ")))
                    .size(11)
                    .color(theme.fg_muted),
            );
        }
    }
    col.into()
}

/// Group matches, or the objects the backend returned when no group matched
fn view_search_results<'a, T>(
    results: &'a SearchResults<T>,
    object_line: impl Fn(&'a T) -> String,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    if results.groups.is_empty() {
        return results
            .objects
            .iter()
            .fold(
                column![text("Matching objects (not in a group)").size(14).color(theme.fg_secondary)]
                    .spacing(6),
                |col, object| col.push(text(object_line(object)).size(13).color(theme.fg_primary)),
            )
            .into();
    }
    results
        .groups
        .iter()
        .fold(column![].spacing(14), |col, group| col.push(view_group_match(group, theme)))
        .into()
}

fn view_success<'a>(success: Option<&'a str>, theme: &'a AppTheme) -> Option<Element<'a, Message>> {
    success.map(|message| text(message).size(14).color(theme.success).into())
}

fn member_checkbox<'a>(
    label: String,
    checked: bool,
    on_toggle: Message,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    checkbox(checked)
        .label(label)
        .on_toggle(move |_| on_toggle.clone())
        .size(16)
        .text_size(13)
        .spacing(8)
        .style(move |_, status| themed_checkbox(theme, status))
        .into()
}

fn expand_button<'a>(expanded: bool, on_press: Message, theme: &'a AppTheme) -> Element<'a, Message> {
    button(text(if expanded { "▾" } else { "▸" }).size(12))
        .on_press(on_press)
        .padding([2, 6])
        .style(move |_, status| row_button(theme, false, status))
        .into()
}

fn browser_list<'a>(rows: Column<'a, Message>, theme: &'a AppTheme) -> Element<'a, Message> {
    container(
        scrollable(rows.padding([0, 8]))
            .height(Length::Fixed(BROWSER_HEIGHT))
            .style(move |_, status| themed_scrollable(theme, status)),
    )
    .padding(8)
    .style(move |_| card_container(theme))
    .into()
}

fn selection_summary<'a>(selected: &[String], theme: &'a AppTheme) -> Element<'a, Message> {
    let summary = if selected.is_empty() {
        "Nothing selected".to_string()
    } else {
        format!("Selected ({}): {}", selected.len(), selected.join(", "))
    };
    text(summary).size(12).color(theme.fg_secondary).into()
}

fn create_actions<'a>(
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
        button(text(if submitting { "Creating..." } else { "Create Group" }).size(13))
            .on_press_maybe((!submitting).then_some(on_submit))
            .padding([8, 16])
            .style(move |_, status| primary_button(theme, status)),
    ]
    .spacing(8)
    .align_y(Alignment::Center)
    .into()
}

// ── Address groups ─────────────────────────────────────────────────────────

pub fn view_address_groups<'a>(form: &'a AddressGroupForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let mut page = column![card(
        column![
            section_label("SEARCH ADDRESS GROUPS", theme),
            search_bar(
                "Group name, object name or IP",
                &form.search_term,
                form.search.is_pending(),
                |v| Message::AddressGroup(AddressGroupEdit::SearchTerm(v)),
                Message::AddressGroupSearchSubmitted,
                theme,
            ),
        ]
        .spacing(4),
        theme
    )]
    .spacing(16);

    if let Some(success) = view_success(form.success.as_deref(), theme) {
        page = page.push(success);
    }

    let results: Option<Element<'a, Message>> = match &form.search {
        Lookup::Idle => None,
        Lookup::Pending => Some(placeholder("Searching...", theme)),
        Lookup::Found(results) => Some(view_search_results(
            results,
            |o| format!("{} ({})", o.name, o.value),
            theme,
        )),
        Lookup::Missing => Some(placeholder("No address group matches this search", theme)),
    };
    if let Some(results) = results {
        page = page.push(card(results, theme));
    }

    let page = if form.create_open {
        page.push(card(view_address_group_create(form, theme), theme))
    } else {
        page.push(row![
            Space::new().width(Length::Fill),
            button(text("Create Address Group").size(13))
                .on_press(Message::AddressGroup(AddressGroupEdit::OpenCreate))
                .padding([8, 16])
                .style(move |_, status| primary_button(theme, status)),
        ])
    };
    page.into()
}

fn view_address_group_create<'a>(form: &'a AddressGroupForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let errors = form.errors.as_ref();
    let name_error = errors.and_then(|e| e.name.as_deref());
    let description_error = errors.and_then(|e| e.description.as_deref());
    let members_error = errors.and_then(|e| e.members.as_deref());

    let kind_tabs = [BrowserKind::Objects, BrowserKind::Groups]
        .into_iter()
        .fold(row![].spacing(4), |tabs, kind| {
            let active = form.browser_kind == kind;
            tabs.push(
                button(text(kind.to_string()).size(12))
                    .on_press(Message::AddressGroup(AddressGroupEdit::BrowserKind(kind)))
                    .padding([6, 12])
                    .style(move |_, status| nav_button(theme, active, status)),
            )
        });

    let browser_rows: Element<'a, Message> = if form.loading {
        placeholder("Loading...", theme)
    } else {
        match form.browser_kind {
            BrowserKind::Objects => browser_list(
                form.filtered_objects().fold(column![].spacing(6), |col, object| {
                    col.push(member_checkbox(
                        format!("{} ({})", object.name, object.value),
                        form.selected_objects.contains(&object.name),
                        Message::AddressGroup(AddressGroupEdit::ToggleObject(object.name.clone())),
                        theme,
                    ))
                }),
                theme,
            ),
            BrowserKind::Groups => browser_list(
                form.filtered_groups().fold(column![].spacing(6), |col, group| {
                    let expanded = form.expanded_groups.contains(&group.name);
                    let mut entry = column![
                        row![
                            expand_button(
                                expanded,
                                Message::AddressGroup(AddressGroupEdit::ToggleExpanded(
                                    group.name.clone()
                                )),
                                theme,
                            ),
                            member_checkbox(
                                format!("{} ({}, {} members)", group.name, group.group_type, group.members.len()),
                                form.selected_groups.contains(&group.name),
                                Message::AddressGroup(AddressGroupEdit::ToggleGroup(group.name.clone())),
                                theme,
                            ),
                        ]
                        .spacing(4)
                        .align_y(Alignment::Center)
                    ];
                    if expanded {
                        entry = entry.push(
                            container(text(group.members.join(", ")).size(12).color(theme.fg_muted))
                                .padding([0, 32]),
                        );
                    }
                    col.push(entry)
                }),
                theme,
            ),
        }
    };

    let members = with_error(
        column![
            section_label("MEMBERS", theme),
            row![
                kind_tabs,
                Space::new().width(Length::Fill),
                button(text("Create New Object").size(12))
                    .on_press(Message::AddressGroupNewObjectRequested)
                    .padding([6, 12])
                    .style(move |_, status| secondary_button(theme, status)),
            ]
            .align_y(Alignment::Center),
            text_input("Filter by name or value", &form.browser_filter)
                .on_input(|v| Message::AddressGroup(AddressGroupEdit::BrowserFilter(v)))
                .padding(8)
                .style(move |_, status| themed_text_input(theme, status)),
            browser_rows,
            selection_summary(&form.members(), theme),
        ]
        .spacing(8),
        members_error,
        theme,
    );

    column![
        text("Create Address Group").size(18).color(theme.info),
        row![
            labeled_input(
                "GROUP NAME",
                "e.g. web-servers",
                &form.name,
                name_error,
                |v| Message::AddressGroup(AddressGroupEdit::Name(v)),
                theme,
            ),
            column![
                section_label("TYPE", theme),
                pick_list(GroupType::iter().collect::<Vec<_>>(), Some(form.group_type), |t| {
                    Message::AddressGroup(AddressGroupEdit::Type(t))
                })
                .width(Length::Fill)
                .padding(8)
                .style(move |_, status| themed_pick_list(theme, status))
                .menu_style(move |_| themed_pick_list_menu(theme)),
            ]
            .spacing(4)
            .width(Length::Fixed(140.0)),
        ]
        .spacing(12),
        row![
            labeled_input(
                "DESCRIPTION",
                "Optional",
                &form.description,
                description_error,
                |v| Message::AddressGroup(AddressGroupEdit::Description(v)),
                theme,
            ),
            labeled_input(
                "DEVICE GROUP",
                "shared",
                &form.device_group,
                None,
                |v| Message::AddressGroup(AddressGroupEdit::DeviceGroup(v)),
                theme,
            ),
        ]
        .spacing(12),
        members,
        create_actions(
            form.submitting,
            Message::AddressGroup(AddressGroupEdit::CloseCreate),
            Message::AddressGroupSubmitted,
            theme,
        ),
    ]
    .spacing(12)
    .into()
}

// ── Service groups ─────────────────────────────────────────────────────────

pub fn view_service_groups<'a>(form: &'a ServiceGroupForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let mut page = column![card(
        column![
            section_label("SEARCH SERVICE GROUPS", theme),
            search_bar(
                "Group name, service name or port",
                &form.search_term,
                form.search.is_pending(),
                |v| Message::ServiceGroup(ServiceGroupEdit::SearchTerm(v)),
                Message::ServiceGroupSearchSubmitted,
                theme,
            ),
        ]
        .spacing(4),
        theme
    )]
    .spacing(16);

    if let Some(success) = view_success(form.success.as_deref(), theme) {
        page = page.push(success);
    }

    let results: Option<Element<'a, Message>> = match &form.search {
        Lookup::Idle => None,
        Lookup::Pending => Some(placeholder("Searching...", theme)),
        Lookup::Found(results) => Some(view_search_results(results, |o| o.display(), theme)),
        Lookup::Missing => Some(placeholder("No service group matches this search", theme)),
    };
    if let Some(results) = results {
        page = page.push(card(results, theme));
    }

    let page = if form.create_open {
        page.push(card(view_service_group_create(form, theme), theme))
    } else {
        page.push(row![
            Space::new().width(Length::Fill),
            button(text("Create Service Group").size(13))
                .on_press(Message::ServiceGroup(ServiceGroupEdit::OpenCreate))
                .padding([8, 16])
                .style(move |_, status| primary_button(theme, status)),
        ])
    };
    page.into()
}

fn view_service_item<'a>(form: &'a ServiceGroupForm, item: &'a ServiceItem, theme: &'a AppTheme) -> Element<'a, Message> {
    let name = item.name();
    let toggle = member_checkbox(
        item.display(),
        form.selected.iter().any(|s| s == name),
        Message::ServiceGroup(ServiceGroupEdit::ToggleItem(name.to_string())),
        theme,
    );

    match item {
        ServiceItem::Object(_) => toggle,
        ServiceItem::Group { member_details, .. } => {
            let expanded = form.expanded_groups.contains(name);
            let mut entry = column![
                row![
                    expand_button(
                        expanded,
                        Message::ServiceGroup(ServiceGroupEdit::ToggleExpanded(name.to_string())),
                        theme,
                    ),
                    toggle,
                ]
                .spacing(4)
                .align_y(Alignment::Center)
            ];
            if expanded {
                entry = member_details.iter().fold(entry, |entry, member| {
                    entry.push(
                        container(text(member).size(12).color(theme.fg_muted)).padding([0, 32]),
                    )
                });
            }
            entry.into()
        }
    }
}

fn view_service_group_create<'a>(form: &'a ServiceGroupForm, theme: &'a AppTheme) -> Element<'a, Message> {
    let errors = form.errors.as_ref();

    let browser_rows: Element<'a, Message> = if form.loading {
        placeholder("Loading...", theme)
    } else {
        browser_list(
            form.filtered_items()
                .fold(column![].spacing(6), |col, item| col.push(view_service_item(form, item, theme))),
            theme,
        )
    };

    let members = with_error(
        column![
            section_label("MEMBERS", theme),
            row![
                text_input("Filter services and groups", &form.browser_filter)
                    .on_input(|v| Message::ServiceGroup(ServiceGroupEdit::BrowserFilter(v)))
                    .padding(8)
                    .style(move |_, status| themed_text_input(theme, status)),
                button(text("Create New Service").size(12))
                    .on_press(Message::ServiceGroupNewObjectRequested)
                    .padding([8, 12])
                    .style(move |_, status| secondary_button(theme, status)),
            ]
            .spacing(8),
            browser_rows,
            selection_summary(&form.selected, theme),
        ]
        .spacing(8),
        errors.and_then(|e| e.members.as_deref()),
        theme,
    );

    column![
        text("Create Service Group").size(18).color(theme.info),
        labeled_input(
            "GROUP NAME",
            "e.g. web-services",
            &form.name,
            errors.and_then(|e| e.name.as_deref()),
            |v| Message::ServiceGroup(ServiceGroupEdit::Name(v)),
            theme,
        ),
        row![
            labeled_input(
                "DESCRIPTION",
                "Optional",
                &form.description,
                errors.and_then(|e| e.description.as_deref()),
                |v| Message::ServiceGroup(ServiceGroupEdit::Description(v)),
                theme,
            ),
            labeled_input(
                "TAGS",
                "Comma separated, optional",
                &form.tags,
                None,
                |v| Message::ServiceGroup(ServiceGroupEdit::Tags(v)),
                theme,
            ),
        ]
        .spacing(12),
        members,
        create_actions(
            form.submitting,
            Message::ServiceGroup(ServiceGroupEdit::CloseCreate),
            Message::ServiceGroupSubmitted,
            theme,
        ),
    ]
    .spacing(12)
    .into()
}
