use crate::models::SavedReceipt;

const NOT_AVAILABLE: &str = "N/A";

/// CSV handed to the model as analysis context. Missing values read `N/A`
/// (amounts read `0.00`) so the model can spot incomplete claims.
pub(crate) fn format_for_analysis(receipts: &[SavedReceipt]) -> String {
    if receipts.is_empty() {
        return "No transactions available.".to_string();
    }

    match write_rows(receipts) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "failed to build analysis CSV");
            "No transactions available.".to_string()
        }
    }
}

fn write_rows(receipts: &[SavedReceipt]) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(["Date", "Transaction", "Amount", "Category", "Client/Prospect", "Purpose"])?;
    for r in receipts {
        let rec = &r.record;
        wtr.write_record([
            or_na(rec.transaction_date.as_deref()),
            or_na(rec.transaction_name.as_deref()),
            rec.total_amount
                .map_or_else(|| "0.00".to_string(), |a| format!("{:.2}", a)),
            rec.category.to_string(),
            or_na(rec.client_or_prospect.as_deref()),
            or_na(rec.purpose.as_deref()),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!("{}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}
