use rust_decimal::Decimal;

/// Dollar amount with thousands separators, e.g. `1234.5` → `"$1,234.50"`.
pub(crate) fn format_amount(val: Decimal) -> String {
    let rounded = val.abs().round_dp(2);
    let text = format!("{rounded:.2}");
    let (int_part, dec_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let grouped = digits
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",");

    let sign = if val < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{dec_part}")
}

/// Truncate to `max` visible characters, ending in "…" when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max - 1).collect();
    format!("{kept}…")
}

/// "AI credits" counter text for the status line.
pub(crate) fn credits_label(used: u32, limit: u32) -> String {
    if used >= limit {
        format!("AI credits {used}/{limit} (limit reached)")
    } else {
        format!("AI credits {used}/{limit}")
    }
}

/// Move a list cursor down by one, adjusting scroll to keep it visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page.saturating_sub(1));
        }
    }
}

pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}
