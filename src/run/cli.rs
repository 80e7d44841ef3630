use anyhow::Result;
use chrono::Local;
use std::path::Path;
use tokio::runtime::Runtime;

use super::shellexpand;
use crate::ai::{Attachment, InputKind, ReceiptAi};
use crate::models::{parse_amount, Field, ReceiptRecord};
use crate::session::{Draft, Session};
use crate::ui::util::format_amount;
use crate::validate::ValidationReport;

pub(crate) fn as_cli(
    args: &[String],
    session: &mut Session,
    ai: &dyn ReceiptAi,
    runtime: &Runtime,
) -> Result<()> {
    match args[1].as_str() {
        "scan" => cli_extract(&args[2..], InputKind::Image, session, ai, runtime),
        "voice" => cli_extract(&args[2..], InputKind::Voice, session, ai, runtime),
        "add" => cli_add(&args[2..], session),
        "list" | "ls" => cli_list(session),
        "delete" => cli_delete(&args[2..], session),
        "quota" => cli_quota(session),
        "ask" => cli_ask(&args[2..], session, ai, runtime),
        "export" => cli_export(&args[2..], session),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("snapledger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SnapLedger: receipt capture and expense review for sales reps");
    println!();
    println!("Usage: snapledger [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  scan <image> [--save]         Extract a receipt photo (uses 1 AI credit)");
    println!("  voice <audio> [--save]        Extract a spoken expense (uses 1 AI credit)");
    println!("  add --name <n> --amount <a>   Add a receipt by hand");
    println!("    --date <YYYY-MM-DD>         Transaction date (default: today)");
    println!("    --category <c>              Expense category (default: Other)");
    println!("    --client <c>                Client or prospect");
    println!("    --purpose <p>               Business purpose");
    println!("  list                          List saved receipts");
    println!("  delete <id>                   Delete a receipt");
    println!("  quota                         Show AI credits used this month");
    println!("  ask <question>                Ask about your spending (uses 1 AI credit)");
    println!("  export [path]                 Export receipts to CSV");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn cli_extract(
    args: &[String],
    kind: InputKind,
    session: &mut Session,
    ai: &dyn ReceiptAi,
    runtime: &Runtime,
) -> Result<()> {
    let Some(file) = args.first().filter(|a| !a.starts_with('-')) else {
        let what = match kind {
            InputKind::Image => "scan <image>",
            InputKind::Voice => "voice <audio>",
        };
        anyhow::bail!("Usage: snapledger {what} [--save]");
    };
    let keep = args.iter().any(|a| a == "--save");

    let attachment = Attachment::from_path(Path::new(&shellexpand(file)), kind)?;
    let record = runtime.block_on(session.extract(ai, kind, &attachment))?;

    let draft = Draft::new(record);
    let report = session.validate(&draft);
    print_record(&draft.record);
    print_report(&report);

    let quota = session.quota();
    println!();
    println!(
        "{} AI credits left this month",
        quota.remaining(session.quota_limit())
    );

    if keep {
        save(session, &draft)?;
    }
    Ok(())
}

fn cli_add(args: &[String], session: &mut Session) -> Result<()> {
    let flag = |name: &str| flag_value(args, name);

    let today = Local::now().format("%Y-%m-%d").to_string();
    let mut record = ReceiptRecord::dated(flag("--date").unwrap_or(today.as_str()));

    if let Some(amount) = flag("--amount") {
        if parse_amount(amount).is_none() {
            anyhow::bail!("Invalid amount: {amount}");
        }
    }

    for (name, field) in [
        ("--name", Field::TransactionName),
        ("--amount", Field::TotalAmount),
        ("--category", Field::Category),
        ("--client", Field::ClientOrProspect),
        ("--purpose", Field::Purpose),
    ] {
        if let Some(value) = flag(name) {
            record.set_field(field, value);
        }
    }

    save(session, &Draft::new(record))
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn save(session: &mut Session, draft: &Draft) -> Result<()> {
    match session.save_draft(draft) {
        Ok(id) => {
            println!("Saved receipt {id}");
            Ok(())
        }
        Err(report) => {
            print_report(&report);
            anyhow::bail!(
                "Receipt not saved: {} error(s) to fix",
                report.errors.len()
            );
        }
    }
}

fn print_record(record: &ReceiptRecord) {
    for field in Field::all() {
        let text = record.field_text(*field);
        let shown = if text.is_empty() { "-" } else { text.as_str() };
        println!("  {:<16} {shown}", field.label());
    }
}

fn print_report(report: &ValidationReport) {
    for (field, msg) in &report.errors {
        eprintln!("  error   {:<16} {msg}", field.label());
    }
    for (field, msg) in &report.warnings {
        eprintln!("  warning {:<16} {msg}", field.label());
    }
}

fn cli_list(session: &Session) -> Result<()> {
    let ledger = session.ledger();
    if ledger.is_empty() {
        println!("No receipts");
        return Ok(());
    }

    println!(
        "{:<14} {:<10} {:<24} {:<22} {:>12}",
        "ID", "Date", "Transaction", "Category", "Amount"
    );
    println!("{}", "─".repeat(86));
    for saved in ledger.all() {
        let rec = &saved.record;
        println!(
            "{:<14} {:<10} {:<24} {:<22} {:>12}",
            saved.id,
            rec.transaction_date.as_deref().unwrap_or("-"),
            crate::ui::util::truncate(rec.transaction_name.as_deref().unwrap_or("-"), 24),
            rec.category.as_str(),
            rec.total_amount.map(format_amount).unwrap_or_else(|| "-".into()),
        );
    }
    println!("{}", "─".repeat(86));
    println!("{:<72} {:>13}", "Total", format_amount(ledger.total()));
    Ok(())
}

fn cli_delete(args: &[String], session: &mut Session) -> Result<()> {
    let Some(raw) = args.first() else {
        anyhow::bail!("Usage: snapledger delete <id>");
    };
    let id: i64 = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid receipt id: {raw}"))?;
    if !session.delete(id) {
        anyhow::bail!("Receipt {id} not found");
    }
    println!("Deleted receipt {id}");
    Ok(())
}

fn cli_quota(session: &Session) -> Result<()> {
    let quota = session.quota();
    let limit = session.quota_limit();
    println!("AI credits used: {}/{limit}", quota.count);
    println!("Remaining:       {}", quota.remaining(limit));
    println!(
        "Resets on:       {}",
        quota.reset_date.with_timezone(&Local).format("%Y-%m-%d")
    );
    Ok(())
}

fn cli_ask(
    args: &[String],
    session: &mut Session,
    ai: &dyn ReceiptAi,
    runtime: &Runtime,
) -> Result<()> {
    let query = args.join(" ");
    if query.trim().is_empty() {
        anyhow::bail!("Usage: snapledger ask <question>");
    }
    let answer = runtime.block_on(session.analyze(ai, query.trim()))?;
    println!("{answer}");
    println!();
    println!(
        "{} AI credits left this month",
        session.quota().remaining(session.quota_limit())
    );
    Ok(())
}

fn cli_export(args: &[String], session: &Session) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/snapledger-export.csv")
        });

    if session.ledger().is_empty() {
        println!("No receipts to export");
        return Ok(());
    }
    let count = session.export(Path::new(&output_path))?;
    println!("Exported {count} receipts to {output_path}");
    Ok(())
}
