use ratatui::style::{Color, Modifier, Style};

use crate::models::Category;

// Dark base shared by every screen.
pub(crate) const HEADER_BG: Color = Color::Rgb(30, 30, 46);
pub(crate) const COMMAND_BG: Color = Color::Rgb(24, 24, 37);
pub(crate) const SURFACE: Color = Color::Rgb(49, 50, 68);
pub(crate) const OVERLAY: Color = Color::Rgb(69, 71, 90);
pub(crate) const TEXT: Color = Color::Rgb(205, 214, 244);
pub(crate) const TEXT_DIM: Color = Color::Rgb(127, 132, 156);

// Receipt roles: amounts and saveable drafts are green, blocking
// validation errors red, advisories and the credit meter near its
// limit yellow.
pub(crate) const ACCENT: Color = Color::Rgb(137, 180, 250);
pub(crate) const GREEN: Color = Color::Rgb(166, 227, 161);
pub(crate) const RED: Color = Color::Rgb(243, 139, 168);
pub(crate) const YELLOW: Color = Color::Rgb(249, 226, 175);

const PEACH: Color = Color::Rgb(250, 179, 135);
const MAUVE: Color = Color::Rgb(203, 166, 247);
const TEAL: Color = Color::Rgb(148, 226, 213);
const PINK: Color = Color::Rgb(245, 194, 231);

/// Credits left at or below this count paint the meter yellow.
const LOW_CREDITS: u32 = 3;

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(TEXT)
        .bg(HEADER_BG)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn selected_style() -> Style {
    Style::default().fg(HEADER_BG).bg(ACCENT)
}

pub(crate) fn normal_style() -> Style {
    Style::default().fg(TEXT)
}

pub(crate) fn dim_style() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub(crate) fn amount_style() -> Style {
    Style::default().fg(GREEN)
}

/// Blocking validation finding.
pub(crate) fn error_style() -> Style {
    Style::default().fg(RED)
}

/// Advisory validation finding.
pub(crate) fn warning_style() -> Style {
    Style::default().fg(YELLOW)
}

pub(crate) fn category_style(category: Category) -> Style {
    let color = match category {
        Category::Meals => PEACH,
        Category::Travel => ACCENT,
        Category::VehicleExpenses => TEAL,
        Category::ClientEntertainment => MAUVE,
        Category::OfficeSupplies => YELLOW,
        Category::Communications => PINK,
        Category::Utilities => GREEN,
        Category::Other => TEXT_DIM,
    };
    Style::default().fg(color)
}

/// Status bar colouring for the monthly AI credit counter.
pub(crate) fn credits_style(used: u32, limit: u32) -> Style {
    let left = limit.saturating_sub(used);
    if left == 0 {
        Style::default().fg(RED).bg(SURFACE)
    } else if left <= LOW_CREDITS {
        Style::default().fg(YELLOW).bg(SURFACE)
    } else {
        status_bar_style()
    }
}

pub(crate) fn alt_row_style() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub(crate) fn block_title_style() -> Style {
    Style::default().fg(TEXT_DIM).add_modifier(Modifier::BOLD)
}

pub(crate) fn command_bar_style() -> Style {
    Style::default().fg(TEXT).bg(COMMAND_BG)
}

pub(crate) fn status_bar_style() -> Style {
    Style::default().fg(TEXT_DIM).bg(SURFACE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credits_style_thresholds() {
        assert_eq!(credits_style(0, 15), status_bar_style());
        assert_eq!(credits_style(12, 15).fg, Some(YELLOW));
        assert_eq!(credits_style(15, 15).fg, Some(RED));
        assert_eq!(credits_style(20, 15).fg, Some(RED));
    }

    #[test]
    fn test_other_category_is_dim() {
        assert_eq!(category_style(Category::Other), dim_style());
        assert_ne!(category_style(Category::Meals), category_style(Category::Travel));
    }
}
