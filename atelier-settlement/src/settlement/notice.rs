//! Payment notice (支払通知書) composition
//!
//! Plain-text message for the notification gateway and an HTML document for
//! archival. Pure formatting; nothing here talks to the outside world.

use shared::models::{Creator, CreatorPayment, SettlementPeriod};
use shared::util::format_yen;

/// Rendered notice for one payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotice {
    pub subject: String,
    pub body: String,
    pub html: String,
    /// Archive filename
    pub filename: String,
    /// Archive folder, keyed by period
    pub folder: String,
}

/// Build the notice for a payment
///
/// The withholding line only appears when tax was withheld.
pub fn compose(creator: &Creator, payment: &CreatorPayment, period: SettlementPeriod) -> PaymentNotice {
    let label = period.label();
    let subject = format!("【お支払い明細】{label}分 売上精算のお知らせ");

    let mut lines: Vec<(&str, String)> = vec![
        ("対象期間", label.clone()),
        ("売上総額", yen(payment.gross_sales)),
        ("販売手数料", yen(payment.commission_amount)),
    ];
    if payment.withholding_tax > 0 {
        lines.push(("源泉徴収税", yen(payment.withholding_tax)));
    }
    lines.push(("お支払い金額", yen(payment.net_payment)));
    lines.push(("お振込", transfer_line(payment)));

    let mut body = format!(
        "{} 様\n\nいつもご利用ありがとうございます。\n{label}分の売上精算が確定しましたのでお知らせします。\n\n",
        creator.name
    );
    for (name, value) in &lines {
        body.push_str(&format!("{name}: {value}\n"));
    }
    body.push_str("\nご不明な点がございましたら運営事務局までお問い合わせください。\n");

    let mut rows = String::new();
    for (name, value) in &lines {
        rows.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            escape_html(name),
            escape_html(value)
        ));
    }
    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"ja\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>支払通知書</h1>\n<p>{name} 様</p>\n<table>\n{rows}</table>\n</body>\n</html>\n",
        title = escape_html(&subject),
        name = escape_html(&creator.name),
    );

    PaymentNotice {
        subject,
        body,
        html,
        filename: format!("payment_notice_{}_{}.html", creator.id, period.file_suffix()),
        folder: period.folder_key(),
    }
}

fn yen(amount: i64) -> String {
    format!("{}円", format_yen(amount))
}

fn transfer_line(payment: &CreatorPayment) -> String {
    match payment.transfer_date {
        Some(date) if payment.is_completed() => format!("{} 振込済み", date.format("%Y-%m-%d")),
        _ => "振込手続き中".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
