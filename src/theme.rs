//! Built-in color palettes, picked by the `[theme] scheme` setting.

use ratatui::style::Color;

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Tree panel
    pub tree_fg: Color,
    pub tree_selected_bg: Color,
    pub tree_folder_fg: Color,
    pub tree_note_fg: Color,
    /// The note currently open in the editor.
    pub tree_active_fg: Color,
    pub tree_guide_fg: Color,

    // Editor panel
    pub editor_fg: Color,
    pub editor_title_fg: Color,
    pub editor_cursor_fg: Color,
    pub editor_cursor_bg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders & dialogs
    pub border_fg: Color,
    pub border_focused_fg: Color,
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Semantic
    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub info_fg: Color,
    pub dim_fg: Color,
}

/// Catppuccin Mocha.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(205, 214, 244),          // #cdd6f4 (text)
        tree_selected_bg: Color::Rgb(69, 71, 90),    // #45475a (surface1)
        tree_folder_fg: Color::Rgb(137, 180, 250),   // #89b4fa (blue)
        tree_note_fg: Color::Rgb(205, 214, 244),
        tree_active_fg: Color::Rgb(166, 227, 161),   // #a6e3a1 (green)
        tree_guide_fg: Color::Rgb(88, 91, 112),      // #585b70 (surface2)

        editor_fg: Color::Rgb(205, 214, 244),
        editor_title_fg: Color::Rgb(203, 166, 247),  // #cba6f7 (mauve)
        editor_cursor_fg: Color::Rgb(30, 30, 46),    // #1e1e2e (base)
        editor_cursor_bg: Color::Rgb(205, 214, 244),

        status_bg: Color::Rgb(30, 30, 46),
        status_fg: Color::Rgb(205, 214, 244),

        border_fg: Color::Rgb(88, 91, 112),
        border_focused_fg: Color::Rgb(137, 180, 250),
        dialog_bg: Color::Rgb(49, 50, 68),           // #313244 (surface0)
        dialog_border_fg: Color::Rgb(137, 180, 250),

        error_fg: Color::Rgb(243, 139, 168),         // #f38ba8 (red)
        warning_fg: Color::Rgb(249, 226, 175),       // #f9e2af (yellow)
        success_fg: Color::Rgb(166, 227, 161),
        info_fg: Color::Rgb(137, 180, 250),
        dim_fg: Color::Rgb(108, 112, 134),           // #6c7086 (overlay0)
    }
}

/// Catppuccin Latte.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        tree_fg: Color::Rgb(76, 79, 105),            // #4c4f69 (text)
        tree_selected_bg: Color::Rgb(204, 208, 218), // #ccd0da (surface1)
        tree_folder_fg: Color::Rgb(30, 102, 245),    // #1e66f5 (blue)
        tree_note_fg: Color::Rgb(76, 79, 105),
        tree_active_fg: Color::Rgb(64, 160, 43),     // #40a02b (green)
        tree_guide_fg: Color::Rgb(172, 176, 190),    // #acb0be (surface2)

        editor_fg: Color::Rgb(76, 79, 105),
        editor_title_fg: Color::Rgb(136, 57, 239),   // #8839ef (mauve)
        editor_cursor_fg: Color::Rgb(239, 241, 245), // #eff1f5 (base)
        editor_cursor_bg: Color::Rgb(76, 79, 105),

        status_bg: Color::Rgb(239, 241, 245),
        status_fg: Color::Rgb(76, 79, 105),

        border_fg: Color::Rgb(172, 176, 190),
        border_focused_fg: Color::Rgb(30, 102, 245),
        dialog_bg: Color::Rgb(230, 233, 239),        // #e6e9ef (surface0)
        dialog_border_fg: Color::Rgb(30, 102, 245),

        error_fg: Color::Rgb(210, 15, 57),           // #d20f39 (red)
        warning_fg: Color::Rgb(223, 142, 29),        // #df8e1d (yellow)
        success_fg: Color::Rgb(64, 160, 43),
        info_fg: Color::Rgb(30, 102, 245),
        dim_fg: Color::Rgb(156, 160, 176),           // #9ca0b0 (overlay0)
    }
}

/// Unknown schemes fall back to dark.
pub fn resolve_theme(scheme: &str) -> ThemeColors {
    match scheme {
        "light" => light_theme(),
        _ => dark_theme(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_light_theme() {
        let theme = resolve_theme("light");
        assert_eq!(theme.tree_folder_fg, Color::Rgb(30, 102, 245));
    }

    #[test]
    fn test_unknown_scheme_falls_back_to_dark() {
        let theme = resolve_theme("neon");
        assert_eq!(theme.tree_folder_fg, Color::Rgb(137, 180, 250));
    }

    #[test]
    fn test_dark_and_light_different() {
        let dark = dark_theme();
        let light = light_theme();
        assert_ne!(dark.tree_fg, light.tree_fg);
        assert_ne!(dark.tree_selected_bg, light.tree_selected_bg);
        assert_ne!(dark.error_fg, light.error_fg);
    }
}
