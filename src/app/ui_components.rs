use crate::theme::AppTheme;
use iced::widget::{button, checkbox, container, pick_list, rule, scrollable, text_input};
use iced::{Border, Color, Shadow, Vector};

fn scale(color: Color, factor: f32) -> Color {
    Color {
        r: (color.r * factor).min(1.0),
        g: (color.g * factor).min(1.0),
        b: (color.b * factor).min(1.0),
        ..color
    }
}

fn fade(color: Color, alpha: f32) -> Color {
    Color { a: alpha, ..color }
}

fn soft_shadow(theme: &AppTheme, y: f32, blur: f32) -> Shadow {
    Shadow {
        color: theme.shadow_color,
        offset: Vector::new(0.0, y),
        blur_radius: blur,
    }
}

fn rounded(color: Color, width: f32, radius: f32) -> Border {
    Border {
        color,
        width,
        radius: radius.into(),
    }
}

pub fn main_container(theme: &AppTheme) -> container::Style {
    container::Style {
        background: Some(theme.bg_base.into()),
        text_color: Some(theme.fg_primary),
        ..Default::default()
    }
}

pub fn sidebar_container(theme: &AppTheme) -> container::Style {
    container::Style {
        background: Some(theme.bg_sidebar.into()),
        border: rounded(theme.border, 1.0, 0.0),
        ..Default::default()
    }
}

pub fn card_container(theme: &AppTheme) -> container::Style {
    container::Style {
        background: Some(theme.bg_surface.into()),
        border: rounded(theme.border, 1.0, 8.0),
        shadow: soft_shadow(theme, 2.0, 3.0),
        ..Default::default()
    }
}

/// Card for the currently selected tree row or member
pub fn section_header_container(theme: &AppTheme) -> container::Style {
    container::Style {
        background: Some(fade(theme.fg_primary, 0.02).into()),
        border: rounded(Color::TRANSPARENT, 0.0, 4.0),
        ..Default::default()
    }
}

/// Dismissible banner for backend failures and successes
pub fn banner_container(theme: &AppTheme, is_error: bool) -> container::Style {
    let tone = if is_error { theme.danger } else { theme.success };
    container::Style {
        background: Some(fade(tone, 0.12).into()),
        text_color: Some(theme.fg_primary),
        border: rounded(tone, 1.0, 6.0),
        shadow: soft_shadow(theme, 2.0, 4.0),
        ..Default::default()
    }
}

/// Solid button in `fill`
fn filled_button(theme: &AppTheme, fill: Color, status: button::Status) -> button::Style {
    let base = button::Style {
        background: Some(fill.into()),
        text_color: theme.fg_on_accent,
        border: rounded(Color::TRANSPARENT, 0.0, 4.0),
        shadow: soft_shadow(theme, 2.0, 3.0),
        ..Default::default()
    };

    match status {
        button::Status::Hovered => button::Style {
            background: Some(scale(fill, 1.08).into()),
            shadow: soft_shadow(theme, 2.5, 4.0),
            ..base
        },
        button::Status::Pressed => button::Style {
            background: Some(scale(fill, 0.95).into()),
            shadow: soft_shadow(theme, 0.5, 1.5),
            ..base
        },
        button::Status::Disabled => button::Style {
            background: Some(fade(fill, 0.5).into()),
            text_color: fade(theme.fg_on_accent, 0.5),
            shadow: Shadow::default(),
            ..base
        },
        button::Status::Active => base,
    }
}

pub fn primary_button(theme: &AppTheme, status: button::Status) -> button::Style {
    filled_button(theme, theme.accent, status)
}

pub fn secondary_button(theme: &AppTheme, status: button::Status) -> button::Style {
    let base = button::Style {
        background: Some(theme.bg_surface.into()),
        text_color: theme.fg_primary,
        border: rounded(theme.border, 1.0, 4.0),
        shadow: soft_shadow(theme, 2.0, 3.0),
        ..Default::default()
    };

    match status {
        button::Status::Hovered => button::Style {
            background: Some(scale(theme.bg_surface, 1.08).into()),
            shadow: soft_shadow(theme, 2.5, 4.0),
            ..base
        },
        button::Status::Pressed => button::Style {
            background: Some(scale(theme.bg_surface, 0.95).into()),
            shadow: soft_shadow(theme, 0.5, 1.5),
            ..base
        },
        button::Status::Disabled => button::Style {
            background: Some(fade(theme.bg_surface, 0.5).into()),
            text_color: theme.fg_muted,
            border: rounded(fade(theme.border, 0.3), 1.0, 4.0),
            shadow: Shadow::default(),
            ..base
        },
        button::Status::Active => base,
    }
}

/// Flat button used for tree rows, list entries and the expand indicator
pub fn row_button(theme: &AppTheme, selected: bool, status: button::Status) -> button::Style {
    let background = match (selected, status) {
        (true, _) => Some(theme.bg_active.into()),
        (false, button::Status::Hovered) => Some(theme.bg_hover.into()),
        (false, _) => None,
    };
    button::Style {
        background,
        text_color: if selected {
            theme.fg_primary
        } else {
            theme.fg_secondary
        },
        border: rounded(
            if selected { theme.accent } else { Color::TRANSPARENT },
            1.0,
            4.0,
        ),
        ..Default::default()
    }
}

/// Sidebar navigation button
pub fn nav_button(theme: &AppTheme, active: bool, status: button::Status) -> button::Style {
    let base = button::Style {
        background: active.then(|| theme.bg_elevated.into()),
        text_color: if active {
            theme.fg_primary
        } else {
            theme.fg_secondary
        },
        border: rounded(Color::TRANSPARENT, 0.0, 4.0),
        shadow: if active {
            soft_shadow(theme, 2.0, 4.0)
        } else {
            Shadow::default()
        },
        ..Default::default()
    };

    match status {
        button::Status::Hovered => button::Style {
            background: Some(theme.bg_hover.into()),
            text_color: theme.fg_primary,
            ..base
        },
        _ => base,
    }
}

pub fn themed_text_input(theme: &AppTheme, status: text_input::Status) -> text_input::Style {
    let base = text_input::Style {
        background: theme.bg_elevated.into(),
        border: rounded(theme.border, 1.0, 4.0),
        icon: theme.fg_muted,
        placeholder: theme.fg_muted,
        value: theme.fg_primary,
        selection: theme.accent,
    };

    match status {
        text_input::Status::Active => base,
        text_input::Status::Hovered => text_input::Style {
            background: theme.bg_hover.into(),
            border: rounded(theme.border_strong, 1.0, 4.0),
            icon: theme.fg_secondary,
            ..base
        },
        text_input::Status::Focused { .. } => text_input::Style {
            border: rounded(theme.accent, 2.0, 4.0),
            icon: theme.accent,
            ..base
        },
        text_input::Status::Disabled => text_input::Style {
            background: fade(theme.bg_elevated, 0.5).into(),
            border: rounded(fade(theme.border, 0.3), 1.0, 4.0),
            value: theme.fg_muted,
            ..base
        },
    }
}

/// Text input that shows a red border while its field has an error
pub fn invalid_text_input(theme: &AppTheme, status: text_input::Status) -> text_input::Style {
    text_input::Style {
        border: rounded(theme.danger, 1.5, 4.0),
        ..themed_text_input(theme, status)
    }
}

pub fn themed_pick_list(theme: &AppTheme, status: pick_list::Status) -> pick_list::Style {
    let base = pick_list::Style {
        background: theme.bg_elevated.into(),
        border: rounded(theme.border, 1.0, 4.0),
        handle_color: theme.fg_secondary,
        placeholder_color: theme.fg_muted,
        text_color: theme.fg_primary,
    };

    match status {
        pick_list::Status::Active => base,
        pick_list::Status::Hovered => pick_list::Style {
            background: theme.bg_hover.into(),
            border: rounded(theme.border_strong, 1.0, 4.0),
            handle_color: theme.fg_primary,
            ..base
        },
        pick_list::Status::Opened { .. } => pick_list::Style {
            border: rounded(theme.accent, 2.0, 4.0),
            handle_color: theme.accent,
            ..base
        },
    }
}

pub fn themed_pick_list_menu(theme: &AppTheme) -> iced::overlay::menu::Style {
    iced::overlay::menu::Style {
        background: theme.bg_surface.into(),
        border: rounded(theme.border_strong, 1.0, 4.0),
        shadow: soft_shadow(theme, 4.0, 8.0),
        text_color: theme.fg_primary,
        selected_background: theme.bg_hover.into(),
        selected_text_color: theme.fg_primary,
    }
}

pub fn themed_checkbox(theme: &AppTheme, status: checkbox::Status) -> checkbox::Style {
    let base = checkbox::Style {
        background: theme.bg_elevated.into(),
        icon_color: theme.fg_on_accent,
        border: rounded(theme.border, 1.0, 3.0),
        text_color: Some(theme.fg_primary),
    };

    match status {
        checkbox::Status::Active { is_checked: true } => checkbox::Style {
            background: theme.accent.into(),
            border: rounded(theme.accent, 1.0, 3.0),
            ..base
        },
        checkbox::Status::Hovered { is_checked: true } => checkbox::Style {
            background: theme.accent_hover.into(),
            border: rounded(theme.accent_hover, 1.0, 3.0),
            ..base
        },
        checkbox::Status::Hovered { is_checked: false } => checkbox::Style {
            background: theme.bg_hover.into(),
            border: rounded(theme.border_strong, 1.0, 3.0),
            ..base
        },
        checkbox::Status::Active { is_checked: false } => base,
        checkbox::Status::Disabled { .. } => checkbox::Style {
            background: fade(theme.bg_elevated, 0.5).into(),
            border: rounded(fade(theme.border, 0.3), 1.0, 3.0),
            text_color: Some(theme.fg_muted),
            ..base
        },
    }
}

pub fn modal_backdrop(theme: &AppTheme) -> container::Style {
    container::Style {
        background: Some(fade(theme.bg_base, 0.85).into()),
        ..Default::default()
    }
}

pub fn themed_horizontal_rule(theme: &AppTheme) -> rule::Style {
    rule::Style {
        color: theme.border,
        radius: 0.0.into(),
        fill_mode: rule::FillMode::Full,
        snap: true,
    }
}

pub fn themed_scrollable(theme: &AppTheme, status: scrollable::Status) -> scrollable::Style {
    let scroller_color = match status {
        scrollable::Status::Active { .. } => theme.fg_muted,
        scrollable::Status::Hovered {
            is_horizontal_scrollbar_hovered,
            is_vertical_scrollbar_hovered,
            ..
        } => {
            if is_horizontal_scrollbar_hovered || is_vertical_scrollbar_hovered {
                theme.fg_secondary
            } else {
                theme.fg_muted
            }
        }
        scrollable::Status::Dragged { .. } => theme.accent,
    };

    let rail = scrollable::Rail {
        background: Some(theme.bg_elevated.into()),
        border: rounded(theme.border, 0.0, 4.0),
        scroller: scrollable::Scroller {
            background: scroller_color.into(),
            border: rounded(Color::TRANSPARENT, 0.0, 4.0),
        },
    };

    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: rail,
        horizontal_rail: rail,
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: theme.bg_surface.into(),
            border: rounded(theme.border, 1.0, 4.0),
            shadow: soft_shadow(theme, 2.0, 4.0),
            icon: theme.fg_primary,
        },
    }
}
