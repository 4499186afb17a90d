//! Sidebar: page navigation, theme picker and backend origin

use super::section_label;
use crate::app::ui_components::{
    nav_button, sidebar_container, themed_horizontal_rule, themed_pick_list, themed_pick_list_menu,
};
use crate::app::{Message, Page, State};
use crate::theme::ThemeChoice;
use iced::widget::{Space, button, column, container, pick_list, rule, text};
use iced::{Element, Length};
use strum::IntoEnumIterator;

pub fn view_sidebar(state: &State) -> Element<'_, Message> {
    let theme = &state.theme;

    let nav = Page::iter().fold(column![].spacing(4), |col, page| {
        let active = state.page == page;
        col.push(
            button(text(page.to_string()).size(14))
                .on_press(Message::PageSelected(page))
                .width(Length::Fill)
                .padding([8, 12])
                .style(move |_, status| nav_button(theme, active, status)),
        )
    });

    let settings = column![
        section_label("THEME", theme),
        pick_list(
            ThemeChoice::all(),
            Some(state.config.theme_choice),
            Message::ThemeChanged
        )
        .width(Length::Fill)
        .padding(6)
        .style(move |_, status| themed_pick_list(theme, status))
        .menu_style(move |_| themed_pick_list_menu(theme)),
        section_label("BACKEND", theme),
        text(crate::utils::truncate_string(state.client.base_url(), 28))
            .size(12)
            .color(theme.fg_muted),
    ]
    .spacing(6);

    container(
        column![
            text("panctl").size(20).color(theme.accent),
            text("Policy object console").size(11).color(theme.fg_muted),
            rule::horizontal(1).style(move |_| themed_horizontal_rule(theme)),
            nav,
            Space::new().height(Length::Fill),
            settings,
        ]
        .spacing(12),
    )
    .padding(16)
    .width(Length::Fixed(220.0))
    .height(Length::Fill)
    .style(move |_| sidebar_container(theme))
    .into()
}
