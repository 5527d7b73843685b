//! Terminal styling and color detection for text output.

/// ANSI escape codes used by the text renderers.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    // Badge colors (bold reverse video)
    /// Bold reverse green for the first station of a path.
    pub const TAG_START: &str = "\x1b[1;7;32m";
    /// Bold reverse cyan for rail hops.
    pub const TAG_LINE: &str = "\x1b[1;7;36m";
    /// Bold reverse yellow for walking transfers.
    pub const TAG_WALK: &str = "\x1b[1;7;33m";

    /// Bright bold white for station names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary details.
    pub const GRAY: &str = "\x1b[90m";
}

/// Resolved color codes, or empty strings when color is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_start: &'static str,
    pub tag_line: &'static str,
    pub tag_walk: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_start: colors::TAG_START,
            tag_line: colors::TAG_LINE,
            tag_walk: colors::TAG_WALK,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_start: "",
            tag_line: "",
            tag_walk: "",
            white_bold: "",
            gray: "",
        }
    }

    /// `colored()` when the terminal accepts ANSI codes, else `plain()`.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether color output should be used.
///
/// Respects the `NO_COLOR` environment variable (https://no-color.org/) and
/// the `TERM=dumb` convention.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}
