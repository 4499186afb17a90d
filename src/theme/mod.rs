pub mod presets;

use iced::Color;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Theme colors by role rather than by hue
#[derive(Debug, Clone, PartialEq)]
pub struct AppTheme {
    pub name: &'static str,

    // Background layers, deepest first
    pub bg_base: Color,
    pub bg_sidebar: Color,
    pub bg_surface: Color,
    pub bg_elevated: Color,
    pub bg_hover: Color,
    pub bg_active: Color,

    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,
    pub fg_on_accent: Color,

    pub accent: Color,
    pub accent_hover: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,

    pub border: Color,
    pub border_strong: Color,
    pub divider: Color,

    pub shadow_color: Color,
    pub shadow_strong: Color,
}

/// Hex (0xRRGGBB) source values for an [`AppTheme`]
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: [u32; 6],
    pub fg: [u32; 4],
    pub accent: u32,
    pub accent_hover: u32,
    pub success: u32,
    pub warning: u32,
    pub danger: u32,
    pub info: u32,
    pub border: u32,
    pub border_strong: u32,
    pub divider: u32,
}

impl AppTheme {
    pub fn from_palette(name: &'static str, p: &Palette) -> Self {
        let [bg_base, bg_sidebar, bg_surface, bg_elevated, bg_hover, bg_active] =
            p.bg.map(hex_to_color);
        let [fg_primary, fg_secondary, fg_muted, fg_on_accent] = p.fg.map(hex_to_color);
        let light = luminance(bg_base) > 0.5;

        Self {
            name,
            bg_base,
            bg_sidebar,
            bg_surface,
            bg_elevated,
            bg_hover,
            bg_active,
            fg_primary,
            fg_secondary,
            fg_muted,
            fg_on_accent,
            accent: hex_to_color(p.accent),
            accent_hover: hex_to_color(p.accent_hover),
            success: hex_to_color(p.success),
            warning: hex_to_color(p.warning),
            danger: hex_to_color(p.danger),
            info: hex_to_color(p.info),
            border: hex_to_color(p.border),
            border_strong: hex_to_color(p.border_strong),
            divider: hex_to_color(p.divider),
            shadow_color: Color::from_rgba(0.0, 0.0, 0.0, if light { 0.15 } else { 0.5 }),
            shadow_strong: Color::from_rgba(0.0, 0.0, 0.0, if light { 0.35 } else { 0.8 }),
        }
    }

    pub fn is_light(&self) -> bool {
        luminance(self.bg_base) > 0.5
    }

    /// Matching iced built-in theme for widgets we don't style ourselves
    pub fn iced_theme(&self) -> iced::Theme {
        iced::Theme::custom(
            self.name.to_string(),
            iced::theme::Palette {
                background: self.bg_base,
                text: self.fg_primary,
                primary: self.accent,
                success: self.success,
                warning: self.warning,
                danger: self.danger,
            },
        )
    }
}

/// Converts hex color (0xRRGGBB) to iced Color
#[allow(clippy::cast_precision_loss)]
pub fn hex_to_color(hex: u32) -> Color {
    Color::from_rgb(
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    )
}

fn luminance(c: Color) -> f32 {
    0.2126 * c.r + 0.7152 * c.g + 0.0722 * c.b
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumIter,
)]
pub enum ThemeChoice {
    #[default]
    Nord,
    Gruvbox,
    #[strum(serialize = "Tokyo Night")]
    TokyoNight,
    #[strum(serialize = "Solarized Light")]
    SolarizedLight,
}

impl ThemeChoice {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn to_theme(self) -> AppTheme {
        match self {
            Self::Nord => presets::nord(),
            Self::Gruvbox => presets::gruvbox(),
            Self::TokyoNight => presets::tokyo_night(),
            Self::SolarizedLight => presets::solarized_light(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_color() {
        let c = hex_to_color(0x00FF_8000);
        assert!((c.r - 1.0).abs() < f32::EPSILON);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert!(c.b.abs() < f32::EPSILON);
    }

    #[test]
    fn test_light_detection() {
        assert!(ThemeChoice::SolarizedLight.to_theme().is_light());
        assert!(!ThemeChoice::Nord.to_theme().is_light());
    }

    #[test]
    fn test_choice_names_match_theme_names() {
        for choice in ThemeChoice::all() {
            assert_eq!(choice.to_string(), choice.to_theme().name);
        }
    }

    #[test]
    fn test_choice_serde_is_stable() {
        let json = serde_json::to_string(&ThemeChoice::TokyoNight).unwrap();
        assert_eq!(json, "\"TokyoNight\"");
    }
}
