//! Device-group tree for the rule location picker

use super::placeholder;
use crate::app::Message;
use crate::app::ui_components::{card_container, row_button};
use crate::core::hierarchy::{self, HierarchyNode, HierarchyView};
use crate::theme::AppTheme;
use iced::widget::{Space, button, column, container, row, text};
use iced::{Alignment, Element, Length};

const INDENT_PX: f32 = 18.0;

pub fn view_tree<'a>(
    tree: Option<&'a HierarchyNode>,
    view: &'a HierarchyView,
    theme: &'a AppTheme,
) -> Element<'a, Message> {
    let Some(tree) = tree else {
        return placeholder("Select a firewall to see its device groups", theme);
    };

    let rows = hierarchy::rows(tree, view).fold(column![].spacing(2), |col, row_data| {
        let indicator = button(text(row_data.glyph()).size(12))
            .on_press_maybe(row_data.on_indicator().map(Message::Hierarchy))
            .padding([2, 6])
            .style(move |_, status| row_button(theme, false, status));

        let selected = row_data.selected;
        let label = button(text(row_data.name).size(13))
            .on_press(Message::Hierarchy(row_data.on_label()))
            .padding([4, 8])
            .style(move |_, status| row_button(theme, selected, status));

        #[allow(clippy::cast_precision_loss)]
        let indent = row_data.depth as f32 * INDENT_PX;
        col.push(
            row![Space::new().width(Length::Fixed(indent)), indicator, label]
                .spacing(4)
                .align_y(Alignment::Center),
        )
    });

    container(rows)
        .padding(8)
        .width(Length::Fill)
        .style(move |_| card_container(theme))
        .into()
}
