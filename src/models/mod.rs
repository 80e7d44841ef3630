mod category;
mod quota;
mod receipt;

pub(crate) use category::Category;
pub(crate) use quota::{UsageQuota, USAGE_LIMIT};
pub(crate) use receipt::{parse_amount, Field, Preset, ReceiptRecord, SavedReceipt, PRESETS};
