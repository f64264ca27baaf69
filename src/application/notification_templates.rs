use chrono::NaiveDate;
use rust_decimal::Decimal;
use url::Url;

use crate::{
    application::helpers::money::format_amount, domain::entities::subscription::Subscription,
};

const BRAND_NAME: &str = "Subscription Tracker";
const SUPPORT_EMAIL: &str = "support@subscriptiontracker.com";
const DATE_FORMAT: &str = "%b %d, %Y";

fn origin_label(app_origin: &str) -> String {
    Url::parse(app_origin)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
        .unwrap_or_else(|| app_origin.to_string())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn manage_url(app_origin: &str) -> String {
    format!("{}/subscriptions", app_origin.trim_end_matches('/'))
}

pub fn primary_button(url: &str, label: &str) -> String {
    format!(
        r#"<a href="{url}" style="display:inline-block;padding:12px 18px;background-color:#111827;color:#ffffff;text-decoration:none;border-radius:8px;font-weight:600;">{label}</a>"#
    )
}

fn detail_rows(rows: &[(&str, String)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<tr><td style="padding:4px 12px 4px 0;color:#6b7280;">{}</td><td style="padding:4px 0;color:#111827;">{}</td></tr>"#,
                label, value
            )
        })
        .collect();
    format!(r#"<table style="margin:12px 0;font-size:14px;border-collapse:collapse;">{rows}</table>"#)
}

/// "today", "tomorrow" or "N days".
pub fn renewal_phrase(days_until: u32) -> String {
    match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {} days", n),
    }
}

pub fn renewal_reminder_email(
    app_origin: &str,
    owner_name: &str,
    subscription: &Subscription,
    days_until: u32,
) -> (String, String) {
    let name = escape(&subscription.name);
    let subject = format!("Subscription Renewal Reminder - {}", subscription.name);
    let headline = "Upcoming renewal";
    let lead = format!(
        "Hi {}, your <strong>{}</strong> subscription ({}) renews {}.",
        escape(owner_name),
        name,
        escape(subscription.plan_name.as_deref().unwrap_or("Standard Plan")),
        renewal_phrase(days_until)
    );
    let body = format!(
        r#"{rows}{button}<p style="margin:12px 0 0;color:#374151;">If you want to cancel or modify this subscription, sign in to your account.</p>"#,
        rows = detail_rows(&[
            (
                "Renewal date",
                subscription.next_renewal.format(DATE_FORMAT).to_string()
            ),
            (
                "Amount",
                format!(
                    "${} {}",
                    format_amount(subscription.price),
                    subscription.currency
                )
            ),
            (
                "Payment method",
                escape(subscription.card.as_deref().unwrap_or("Default card"))
            ),
        ]),
        button = primary_button(&manage_url(app_origin), "Manage subscriptions"),
    );
    let reason = format!("{} renews soon", name);

    let html = wrap_email(app_origin, headline, &lead, &body, &reason, None);
    (subject, html)
}

pub fn price_change_email(
    app_origin: &str,
    owner_name: &str,
    subscription: &Subscription,
    old_price: Decimal,
    new_price: Decimal,
) -> (String, String) {
    let name = escape(&subscription.name);
    let monthly = new_price - old_price;
    let yearly = monthly * Decimal::from(12);
    let sign = if monthly.is_sign_negative() { "-" } else { "+" };

    let subject = format!("Price Change Alert - {}", subscription.name);
    let headline = "Price change detected";
    let lead = format!(
        "Hi {}, we detected a price change for your <strong>{}</strong> subscription.",
        escape(owner_name),
        name
    );
    let body = format!(
        r#"{rows}<p style="margin:12px 0;color:#374151;">This change will be reflected in your next billing cycle on {renewal}.</p>{button}"#,
        rows = detail_rows(&[
            (
                "Previous price",
                format!("${} {}", format_amount(old_price), subscription.currency)
            ),
            (
                "New price",
                format!("${} {}", format_amount(new_price), subscription.currency)
            ),
            ("Monthly change", format!("{}${}", sign, format_amount(monthly.abs()))),
            ("Yearly change", format!("{}${}", sign, format_amount(yearly.abs()))),
        ]),
        renewal = subscription.next_renewal.format(DATE_FORMAT),
        button = primary_button(&manage_url(app_origin), "Review subscription"),
    );
    let reason = format!("the price of {} changed", name);

    let html = wrap_email(app_origin, headline, &lead, &body, &reason, None);
    (subject, html)
}

pub fn payment_failed_email(
    app_origin: &str,
    owner_name: &str,
    subscription: &Subscription,
) -> (String, String) {
    let name = escape(&subscription.name);
    let subject = format!("Payment Failed - {}", subscription.name);
    let headline = "Payment failed";
    let lead = format!(
        "Hi {}, a payment for your <strong>{}</strong> subscription failed.",
        escape(owner_name),
        name
    );
    let body = format!(
        r#"{rows}<p style="margin:12px 0;color:#374151;">Check your payment method for sufficient funds, update the card if it expired, or contact your bank if it is being declined. Your subscription may be suspended if the payment is not resolved soon.</p>{button}"#,
        rows = detail_rows(&[
            (
                "Service",
                format!(
                    "{} ({})",
                    name,
                    escape(subscription.plan_name.as_deref().unwrap_or("Standard"))
                )
            ),
            (
                "Amount",
                format!(
                    "${} {}",
                    format_amount(subscription.price),
                    subscription.currency
                )
            ),
            (
                "Payment method",
                escape(subscription.card.as_deref().unwrap_or("Default card"))
            ),
        ]),
        button = primary_button(&manage_url(app_origin), "Update payment method"),
    );
    let reason = format!("a payment for {} failed", name);
    let footer = format!("Need help? Contact {}.", SUPPORT_EMAIL);

    let html = wrap_email(app_origin, headline, &lead, &body, &reason, Some(&footer));
    (subject, html)
}

pub fn cancellation_email(
    app_origin: &str,
    owner_name: &str,
    subscription: &Subscription,
    cancelled_on: NaiveDate,
) -> (String, String) {
    let name = escape(&subscription.name);
    let service_until = subscription.next_renewal.format(DATE_FORMAT).to_string();
    let subject = format!("Subscription Cancelled - {}", subscription.name);
    let headline = "Subscription cancelled";
    let lead = format!(
        "Hi {}, your <strong>{}</strong> subscription has been cancelled.",
        escape(owner_name),
        name
    );
    let body = format!(
        r#"{rows}<p style="margin:12px 0;color:#374151;">Your service remains active until {until}.</p>{button}"#,
        rows = detail_rows(&[
            ("Cancelled on", cancelled_on.format(DATE_FORMAT).to_string()),
            ("Service until", service_until.clone()),
            (
                "Monthly savings",
                format!("${}", format_amount(subscription.price))
            ),
            (
                "Yearly savings",
                format!("${}", format_amount(subscription.price * Decimal::from(12)))
            ),
        ]),
        until = service_until,
        button = primary_button(&manage_url(app_origin), "Manage subscriptions"),
    );
    let reason = format!("{} was cancelled", name);

    let html = wrap_email(app_origin, headline, &lead, &body, &reason, None);
    (subject, html)
}

pub fn wrap_email(
    app_origin: &str,
    headline: &str,
    lead: &str,
    body_html: &str,
    reason: &str,
    footer_note: Option<&str>,
) -> String {
    let origin = origin_label(app_origin);

    let footer_note = footer_note
        .map(|note| {
            format!(
                r#"<p style="margin:8px 0 0;color:#4b5563;font-size:13px;">{}</p>"#,
                note
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <body style="background:#f8fafc;margin:0;padding:24px;font-family:Arial,Helvetica,sans-serif;">
    <div style="max-width:560px;margin:0 auto;background:#ffffff;border:1px solid #e5e7eb;border-radius:12px;padding:24px;">
      <div style="font-size:12px;letter-spacing:0.08em;text-transform:uppercase;color:#6b7280;">{brand} - {origin}</div>
      <h1 style="margin:12px 0 8px;font-size:22px;color:#111827;">{headline}</h1>
      <p style="margin:0 0 12px;font-size:15px;color:#111827;line-height:1.6;">{lead}</p>
      {body_html}
      <div style="margin-top:20px;padding-top:16px;border-top:1px solid #e5e7eb;">
        <p style="margin:0;font-size:13px;color:#4b5563;">Why you got this email: {reason}.</p>
        {footer_note}
      </div>
      <p style="margin:14px 0 0;font-size:12px;color:#9ca3af;">Sent by {brand} - {origin}</p>
    </div>
  </body>
</html>
"#,
        brand = BRAND_NAME,
    )
}
