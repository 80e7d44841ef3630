use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Category;

/// A receipt's extracted or typed fields. Every field is optional until the
/// validator says otherwise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct ReceiptRecord {
    pub(crate) transaction_name: Option<String>,
    pub(crate) total_amount: Option<Decimal>,
    /// Format: "YYYY-MM-DD"
    pub(crate) transaction_date: Option<String>,
    #[serde(default)]
    pub(crate) category: Category,
    pub(crate) client_or_prospect: Option<String>,
    pub(crate) purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SavedReceipt {
    pub(crate) id: i64,
    #[serde(flatten)]
    pub(crate) record: ReceiptRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Field {
    TransactionName,
    TotalAmount,
    TransactionDate,
    Category,
    ClientOrProspect,
    Purpose,
}

impl Field {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionName => "transaction_name",
            Self::TotalAmount => "total_amount",
            Self::TransactionDate => "transaction_date",
            Self::Category => "category",
            Self::ClientOrProspect => "client_or_prospect",
            Self::Purpose => "purpose",
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::TransactionName => "Transaction",
            Self::TotalAmount => "Amount ($)",
            Self::TransactionDate => "Date",
            Self::Category => "Category",
            Self::ClientOrProspect => "Client/Prospect",
            Self::Purpose => "Purpose",
        }
    }

    /// Form order on the review screen.
    pub(crate) fn all() -> &'static [Field] {
        &[
            Self::TransactionName,
            Self::TotalAmount,
            Self::TransactionDate,
            Self::Category,
            Self::ClientOrProspect,
            Self::Purpose,
        ]
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ReceiptRecord {
    /// A blank draft dated `date`, as opened by manual entry.
    pub(crate) fn dated(date: &str) -> Self {
        Self {
            transaction_date: Some(date.to_string()),
            ..Self::default()
        }
    }

    /// Current value of a field as form text. Missing values are empty.
    pub(crate) fn field_text(&self, field: Field) -> String {
        match field {
            Field::TransactionName => self.transaction_name.clone().unwrap_or_default(),
            Field::TotalAmount => self
                .total_amount
                .map(|a| a.normalize().to_string())
                .unwrap_or_default(),
            Field::TransactionDate => self.transaction_date.clone().unwrap_or_default(),
            Field::Category => self.category.as_str().to_string(),
            Field::ClientOrProspect => self.client_or_prospect.clone().unwrap_or_default(),
            Field::Purpose => self.purpose.clone().unwrap_or_default(),
        }
    }

    /// Apply typed form input to a field. Blank input clears it.
    pub(crate) fn set_field(&mut self, field: Field, input: &str) {
        let text = non_blank(input);
        match field {
            Field::TransactionName => self.transaction_name = text,
            Field::TotalAmount => self.total_amount = text.as_deref().and_then(parse_amount),
            Field::TransactionDate => self.transaction_date = text,
            Field::Category => {
                self.category = text.as_deref().map(Category::parse).unwrap_or_default()
            }
            Field::ClientOrProspect => self.client_or_prospect = text,
            Field::Purpose => self.purpose = text,
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a typed amount such as `"$1,234.50"`. Unparseable input is `None`.
pub(crate) fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned = s.replace(['$', ','], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(cleaned).ok()
}

/// One-tap drafts for the most common sales-rep expenses.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Preset {
    pub(crate) key: &'static str,
    pub(crate) label: &'static str,
    pub(crate) name: &'static str,
    pub(crate) amount: i64,
    pub(crate) category: Category,
    pub(crate) purpose: &'static str,
}

pub(crate) const PRESETS: &[Preset] = &[
    Preset {
        key: "parking",
        label: "Parking ($5)",
        name: "Parking",
        amount: 5,
        category: Category::VehicleExpenses,
        purpose: "Parking",
    },
    Preset {
        key: "toll",
        label: "Toll ($8)",
        name: "Toll",
        amount: 8,
        category: Category::VehicleExpenses,
        purpose: "Toll",
    },
    Preset {
        key: "coffee",
        label: "Client Coffee ($15)",
        name: "Client Coffee",
        amount: 15,
        category: Category::ClientEntertainment,
        purpose: "Client Coffee",
    },
];

impl Preset {
    pub(crate) fn find(key: &str) -> Option<&'static Preset> {
        let lower = key.trim().to_lowercase();
        PRESETS.iter().find(|p| p.key == lower)
    }

    pub(crate) fn draft(&self, date: &str) -> ReceiptRecord {
        ReceiptRecord {
            transaction_name: Some(self.name.to_string()),
            total_amount: Some(Decimal::from(self.amount)),
            transaction_date: Some(date.to_string()),
            category: self.category,
            client_or_prospect: None,
            purpose: Some(self.purpose.to_string()),
        }
    }
}
