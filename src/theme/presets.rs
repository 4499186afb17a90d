use super::{AppTheme, Palette};

/// Nord - cool arctic blues, the default
pub fn nord() -> AppTheme {
    AppTheme::from_palette(
        "Nord",
        &Palette {
            // base, sidebar, surface, elevated, hover, active
            bg: [0x002E_3440, 0x0029_2E39, 0x003B_4252, 0x0043_4C5E, 0x004C_566A, 0x0056_6178],
            // primary, secondary, muted, on_accent
            fg: [0x00EC_EFF4, 0x00D8_DEE9, 0x007B_88A1, 0x002E_3440],
            accent: 0x0088_C0D0,
            accent_hover: 0x008F_BCBB,
            success: 0x00A3_BE8C,
            warning: 0x00EB_CB8B,
            danger: 0x00BF_616A,
            info: 0x0081_A1C1,
            border: 0x0043_4C5E,
            border_strong: 0x0088_C0D0,
            divider: 0x003B_4252,
        },
    )
}

/// Gruvbox - warm retro browns
pub fn gruvbox() -> AppTheme {
    AppTheme::from_palette(
        "Gruvbox",
        &Palette {
            bg: [0x0028_2828, 0x001D_2021, 0x0032_302F, 0x003C_3836, 0x0050_4945, 0x0066_5C54],
            fg: [0x00EB_DBB2, 0x00D5_C4A1, 0x0092_8374, 0x0028_2828],
            accent: 0x00FE_8019,
            accent_hover: 0x00D6_5D0E,
            success: 0x00B8_BB26,
            warning: 0x00FA_BD2F,
            danger: 0x00FB_4934,
            info: 0x0083_A598,
            border: 0x0050_4945,
            border_strong: 0x00FE_8019,
            divider: 0x003C_3836,
        },
    )
}

pub fn tokyo_night() -> AppTheme {
    AppTheme::from_palette(
        "Tokyo Night",
        &Palette {
            bg: [0x001A_1B26, 0x0016_161E, 0x0024_283B, 0x0029_2E42, 0x0033_3A56, 0x0041_4868],
            fg: [0x00C0_CAF5, 0x00A9_B1D6, 0x0056_5F89, 0x001A_1B26],
            accent: 0x007A_A2F7,
            accent_hover: 0x007D_CFFF,
            success: 0x009E_CE6A,
            warning: 0x00E0_AF68,
            danger: 0x00F7_768E,
            info: 0x002A_C3DE,
            border: 0x0029_2E42,
            border_strong: 0x007A_A2F7,
            divider: 0x0024_283B,
        },
    )
}

/// Solarized Light - the one light option
pub fn solarized_light() -> AppTheme {
    AppTheme::from_palette(
        "Solarized Light",
        &Palette {
            bg: [0x00FD_F6E3, 0x00EE_E8D5, 0x00F5_EFDC, 0x00FF_FBEE, 0x00E4_DDC8, 0x00D9_D2BC],
            fg: [0x0007_3642, 0x0058_6E75, 0x0093_A1A1, 0x00FD_F6E3],
            accent: 0x0026_8BD2,
            accent_hover: 0x0020_75B0,
            success: 0x0085_9900,
            warning: 0x00B5_8900,
            danger: 0x00DC_322F,
            info: 0x002A_A198,
            border: 0x00D9_D2BC,
            border_strong: 0x0026_8BD2,
            divider: 0x00EE_E8D5,
        },
    )
}
