//! Rule preview modal shown before anything is sent

use crate::api::CreateRuleRequest;
use crate::app::Message;
use crate::app::ui_components::{card_container, primary_button, secondary_button};
use crate::core::rules;
use crate::theme::AppTheme;
use iced::widget::{Space, button, column, container, row, text};
use iced::{Alignment, Element, Length};

pub fn view_rule_preview<'a>(
    request: &'a CreateRuleRequest,
    submitting: bool,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    let fields = rules::preview(request)
        .into_iter()
        .fold(column![].spacing(6), |col, (label, value)| {
            col.push(
                row![
                    text(label)
                        .size(12)
                        .color(theme.fg_muted)
                        .width(Length::Fixed(160.0)),
                    text(value).size(13).color(theme.fg_primary),
                ]
                .spacing(12),
            )
        });

    let actions = row![
        Space::new().width(Length::Fill),
        button(text("Back to Edit").size(13))
            .on_press(Message::RulePreviewClosed)
            .padding([8, 16])
            .style(move |_, status| secondary_button(theme, status)),
        button(text(if submitting { "Creating..." } else { "Create Rule" }).size(13))
            .on_press_maybe((!submitting).then_some(Message::RuleSubmitted))
            .padding([8, 16])
            .style(move |_, status| primary_button(theme, status)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    container(
        column![
            text("Review Rule").size(20).color(theme.info),
            text("The backend receives exactly these values.")
                .size(12)
                .color(theme.fg_muted),
            fields,
            actions,
        ]
        .spacing(16),
    )
    .padding(24)
    .width(Length::Fixed(560.0))
    .style(move |_| card_container(theme))
    .into()
}
