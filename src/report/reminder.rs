use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rust_decimal::Decimal;

use crate::config::Locale;
use crate::models::clean_phone;
use crate::schedule::{ClientStanding, Tier};
use crate::ui::util::format_money;

// Characters a URI component may carry unescaped.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Short payment reminder addressed to the client.
pub(crate) fn draft_reminder(standing: &ClientStanding, currency: &str, locale: Locale) -> String {
    let name = &standing.client.name;
    let remaining = format_money(standing.remaining.max(Decimal::ZERO), currency);
    let arrears = standing.arrears();

    match locale {
        Locale::En => {
            let overdue = if arrears > Decimal::ZERO {
                format!(", of which {} is overdue", format_money(arrears, currency))
            } else {
                String::new()
            };
            format!(
                "Hello {name}, this is a friendly reminder that {remaining} remains on your \
                 installment plan{overdue}. Please arrange your next payment at your earliest \
                 convenience. Thank you!"
            )
        }
        Locale::Ar => {
            let overdue = if arrears > Decimal::ZERO {
                format!("، منها {} متأخرة", format_money(arrears, currency))
            } else {
                String::new()
            };
            format!(
                "مرحباً {name}، نود تذكيرك بأن المبلغ المتبقي على خطة التقسيط هو {remaining}{overdue}. \
                 نرجو سداد القسط القادم في أقرب وقت. شكراً لك!"
            )
        }
    }
}

/// `wa.me` link that opens a chat with `phone` prefilled with `message`.
pub(crate) fn whatsapp_link(phone: &str, message: &str) -> String {
    let number: String = clean_phone(phone)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '+')
        .collect();
    let text = utf8_percent_encode(message, COMPONENT_ENCODE_SET);
    format!("https://wa.me/{number}?text={text}")
}

/// Clients a bulk reminder goes to: late and still owing.
pub(crate) fn late_reminder_targets(standings: &[ClientStanding]) -> Vec<&ClientStanding> {
    standings
        .iter()
        .filter(|s| s.tier == Tier::Late && s.remaining > Decimal::ZERO)
        .collect()
}
