use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Closed set of expense categories. Anything else collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub(crate) enum Category {
    Meals,
    Travel,
    VehicleExpenses,
    ClientEntertainment,
    OfficeSupplies,
    Communications,
    Utilities,
    #[default]
    Other,
}

impl Category {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Meals => "Meals",
            Self::Travel => "Travel",
            Self::VehicleExpenses => "Vehicle Expenses",
            Self::ClientEntertainment => "Client Entertainment",
            Self::OfficeSupplies => "Office Supplies",
            Self::Communications => "Communications",
            Self::Utilities => "Utilities",
            Self::Other => "Other",
        }
    }

    /// Exact match against the display names, as the AI schema requires.
    pub(crate) fn parse_exact(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == s)
    }

    /// Lenient match for typed input: case-insensitive, ignores spacing.
    pub(crate) fn parse(s: &str) -> Self {
        let wanted: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().replace(' ', "").to_lowercase() == wanted)
            .unwrap_or(Self::Other)
    }

    pub(crate) fn all() -> &'static [Category] {
        &[
            Self::Meals,
            Self::Travel,
            Self::VehicleExpenses,
            Self::ClientEntertainment,
            Self::OfficeSupplies,
            Self::Communications,
            Self::Utilities,
            Self::Other,
        ]
    }

    /// Amount above which a receipt in this category gets a review warning.
    pub(crate) fn threshold(&self) -> Option<Decimal> {
        let limit: i64 = match self {
            Self::Meals => 300,
            Self::Travel => 2000,
            Self::VehicleExpenses => 500,
            Self::ClientEntertainment => 1000,
            Self::OfficeSupplies => 500,
            Self::Communications => 200,
            Self::Utilities => 300,
            Self::Other => return None,
        };
        Some(Decimal::from(limit))
    }

    pub(crate) fn requires_client(&self) -> bool {
        matches!(self, Self::ClientEntertainment)
    }

    /// Step through `all()` with wraparound; used by the review form.
    pub(crate) fn cycle(&self, delta: i32) -> Self {
        let all = Self::all();
        let len = all.len() as i32;
        let idx = all.iter().position(|c| c == self).unwrap_or(0) as i32;
        all[(idx + delta).rem_euclid(len) as usize]
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::parse_exact(&s).unwrap_or_default()
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
