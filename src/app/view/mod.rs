//! UI rendering for the console
//!
//! Split into one submodule per page plus the sidebar, the hierarchy tree
//! and the rule preview modal.

mod groups;
mod hierarchy;
mod objects;
mod preview;
mod rule_form;
mod sidebar;

use crate::app::ui_components::{
    banner_container, invalid_text_input, main_container, modal_backdrop, secondary_button,
    section_header_container, themed_scrollable, themed_text_input,
};
use crate::app::{Banner, Message, Page, State};
use crate::theme::AppTheme;
use iced::widget::{
    Column, Space, button, center, column, container, opaque, row, scrollable, stack, text,
    text_input,
};
use iced::{Alignment, Element, Length, alignment};

/// Main view entry point
pub fn view(state: &State) -> Element<'_, Message> {
    let theme = &state.theme;

    let page: Element<'_, Message> = match state.page {
        Page::AddressObjects => objects::view_address_objects(&state.address_object, theme),
        Page::ServiceObjects => objects::view_service_objects(&state.service_object, theme),
        Page::AddressGroups => groups::view_address_groups(&state.address_group, theme),
        Page::ServiceGroups => groups::view_service_groups(&state.service_group, theme),
        Page::SecurityRule => rule_form::view_rule_form(&state.rule, theme),
    };

    let mut workspace = column![].spacing(16).padding(24).width(Length::Fill);
    if let Some(banner) = &state.banner {
        workspace = workspace.push(view_banner(banner, theme));
    }
    workspace = workspace.push(
        column![
            text(state.page.to_string()).size(22).color(theme.info),
            text(page_subtitle(state.page)).size(12).color(theme.fg_muted),
        ]
        .spacing(4),
    );
    workspace = workspace.push(page);

    let content = row![
        sidebar::view_sidebar(state),
        scrollable(workspace)
            .height(Length::Fill)
            .style(move |_, status| themed_scrollable(theme, status)),
    ];

    let base = container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_| main_container(theme));

    // Same tree shape with or without the modal
    if let Some(request) = &state.rule.preview {
        stack![
            base,
            opaque(
                center(preview::view_rule_preview(
                    request,
                    state.rule.submitting,
                    theme
                ))
                .style(move |_| modal_backdrop(theme))
            )
        ]
        .into()
    } else {
        stack![base, Space::new()].into()
    }
}

fn page_subtitle(page: Page) -> &'static str {
    match page {
        Page::AddressObjects => "Look up an address and create the object if it doesn't exist.",
        Page::ServiceObjects => "Look up a protocol and port and create the service if needed.",
        Page::AddressGroups => "Search address groups or build a new one from existing members.",
        Page::ServiceGroups => "Search service groups or build a new one from existing services.",
        Page::SecurityRule => "Pick a firewall and location, then describe the traffic to match.",
    }
}

fn view_banner<'a>(banner: &'a Banner, theme: &'a AppTheme) -> Element<'a, Message> {
    let (is_error, body): (bool, Element<'a, Message>) = match banner {
        Banner::Error(translation) => {
            let mut body = column![text(&translation.user_message).size(14).color(theme.fg_primary)]
                .spacing(4);
            for suggestion in &translation.suggestions {
                body = body.push(text(format!("• {suggestion}")).size(12).color(theme.fg_secondary));
            }
            (true, body.into())
        }
        Banner::Success(message) => (false, text(message).size(14).color(theme.fg_primary).into()),
    };

    container(
        row![
            container(body).width(Length::Fill),
            button(text("×").size(14))
                .on_press(Message::BannerDismissed)
                .padding([2, 8])
                .style(move |_, status| secondary_button(theme, status)),
        ]
        .spacing(12)
        .align_y(Alignment::Start),
    )
    .padding(12)
    .width(Length::Fill)
    .style(move |_| banner_container(theme, is_error))
    .into()
}

/// Small uppercase caption above a field
pub(super) fn section_label<'a>(label: &'a str, theme: &'a AppTheme) -> Element<'a, Message> {
    container(text(label).size(11).color(theme.fg_muted))
        .padding([2, 6])
        .style(move |_| section_header_container(theme))
        .into()
}

/// Appends the inline error under a field, if there is one
pub(super) fn with_error<'a>(
    field: Column<'a, Message>,
    error: Option<&'a str>,
    theme: &'a AppTheme,
) -> Column<'a, Message> {
    match error {
        Some(err) => field.push(text(err).size(12).color(theme.danger)),
        None => field,
    }
}

/// Captioned text input that turns red while `error` is set
pub(super) fn labeled_input<'a>(
    label: &'a str,
    placeholder: &'a str,
    value: &'a str,
    error: Option<&'a str>,
    on_input: impl Fn(String) -> Message + 'a,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    let invalid = error.is_some();
    let input = text_input(placeholder, value)
        .on_input(on_input)
        .padding(8)
        .style(move |_, status| {
            if invalid {
                invalid_text_input(theme, status)
            } else {
                themed_text_input(theme, status)
            }
        });

    with_error(column![section_label(label, theme), input].spacing(4), error, theme)
        .width(Length::Fill)
        .into()
}

/// Muted placeholder for empty lists and pending loads
pub(super) fn placeholder<'a>(message: &'a str, theme: &'a AppTheme) -> Element<'a, Message> {
    container(text(message).size(13).color(theme.fg_muted))
        .padding(12)
        .width(Length::Fill)
        .align_x(alignment::Horizontal::Center)
        .into()
}
