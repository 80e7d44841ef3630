use serde_json::{json, Value};

use crate::models::Category;

fn category_list() -> String {
    Category::all()
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn receipt_prompt() -> String {
    format!(
        "Analyze the receipt image and extract the following information. \
         The transaction date should be in YYYY-MM-DD format. \
         For the category, choose the most appropriate one from this list: {}. \
         Also extract the client/prospect name if mentioned, and the purpose of the expense \
         (e.g., travel, client coffee, toll, or parking). \
         If any information is not found, return null for that field.",
        category_list()
    )
}

pub(crate) fn voice_prompt(today: &str) -> String {
    format!(
        "Analyze the following audio and extract the transaction details. \
         Today's date is {today}. \
         For the category, choose the most appropriate one from this list: {}. \
         Also extract the client/prospect name if mentioned, and the purpose of the expense \
         (e.g., travel, client coffee, toll, or parking). \
         If any information is not found, return null for that field.",
        category_list()
    )
}

/// Structured-output schema for the six receipt fields. `today` is set for
/// voice input so the model can resolve "today" itself.
pub(crate) fn response_schema(today: Option<&str>) -> Value {
    let date_hint = match today {
        Some(d) => format!("The date in YYYY-MM-DD format. If the user says 'today', use {d}."),
        None => "The date of the transaction in YYYY-MM-DD format.".to_string(),
    };
    json!({
        "type": "OBJECT",
        "properties": {
            "transaction_name": {
                "type": "STRING",
                "description": "The name of the merchant or transaction."
            },
            "total_amount": {
                "type": "NUMBER",
                "description": "The final total amount of the transaction."
            },
            "transaction_date": { "type": "STRING", "description": date_hint },
            "category": {
                "type": "STRING",
                "description": format!("Must be one of: {}.", category_list())
            },
            "client_or_prospect": {
                "type": "STRING",
                "description": "The client or prospect name associated with the expense."
            },
            "purpose": {
                "type": "STRING",
                "description": "The purpose of the expense, e.g., travel, client coffee, toll."
            }
        }
    })
}

pub(crate) fn analysis_prompt(query: &str, transactions: &str) -> String {
    format!(
        r#"**Persona:** You are "Alex", a professional and diligent expense analyst. Your tone is direct, helpful and professional. Your only goal is to make sure the sales agent's expense report is fully compliant and gets approved by their manager without rejections. All currency is in US Dollars ($).

**Objective:** Analyze the user's transaction data based on their query. The user's query is: "{query}".

First, answer the user's query directly.

Second, proactively scan all transactions for "Compliance Risks". A Compliance Risk is any expense a manager might flag or reject. Report the 2 or 3 most critical ones.

**Compliance Risk Categories:**

1. **Missing Details:** This is the biggest risk. Look for transactions where 'purpose' or 'client_or_prospect' is 'N/A' or empty, and sum the dollar amount of these incomplete claims. That is money at risk.

2. **Vague Descriptions:** Identify generic transaction names (e.g., '7-Eleven', 'Uber', 'Misc') whose purpose is also generic (e.g., 'Food', 'Transport'). Explain why a manager might question them.

3. **Potential Missed Reimbursements:** If there are many vehicle or travel receipts but no mileage, ask whether a personal car was used and mileage was not claimed. If anything looks personal, warn that it needs a strong business purpose.

**Output Format (follow strictly):**

Start with a direct answer to the query: "{query}". Use the '$' symbol for currency.

Then, for each compliance risk found, use this card structure:

---
**Risk #1: [Short risk title]**
* **Observation:** [Plain, non-judgmental facts from the data.]
* **The Risk:** [Why this could delay or block reimbursement.]
* **Recommendation:** [One concrete action, e.g. edit the claim and add a purpose.]
---

End with a short encouraging sign-off.

**Now analyze the following transaction data based on the user's query:**
{transactions}"#
    )
}
