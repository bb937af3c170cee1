use rust_decimal::Decimal;

use crate::config::Locale;
use crate::schedule::{ClientStanding, Tier};
use crate::ui::util::{format_money, percent_of};

const TOP_BALANCES: usize = 3;

/// Aggregate figures shown on the dashboard and at the top of the report.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PortfolioSummary {
    pub(crate) receivables: Decimal,
    pub(crate) collected: Decimal,
    pub(crate) outstanding: Decimal,
    pub(crate) client_count: usize,
    pub(crate) paid_count: usize,
    pub(crate) current_count: usize,
    pub(crate) late_count: usize,
    /// Sum of amounts behind schedule across late clients.
    pub(crate) arrears: Decimal,
}

impl PortfolioSummary {
    pub(crate) fn from_standings(standings: &[ClientStanding]) -> Self {
        let mut summary = Self::default();
        for s in standings {
            summary.receivables = summary.receivables.saturating_add(s.client.total);
            summary.collected = summary.collected.saturating_add(s.paid);
            summary.client_count += 1;
            match s.tier {
                Tier::Paid => summary.paid_count += 1,
                Tier::Current => summary.current_count += 1,
                Tier::Late => {
                    summary.late_count += 1;
                    summary.arrears = summary.arrears.saturating_add(s.arrears());
                }
            }
        }
        summary.outstanding = summary.receivables.saturating_sub(summary.collected);
        summary
    }

    pub(crate) fn count(&self, tier: Tier) -> usize {
        match tier {
            Tier::Paid => self.paid_count,
            Tier::Current => self.current_count,
            Tier::Late => self.late_count,
        }
    }

    /// Collected share of receivables as a whole percentage.
    pub(crate) fn collected_percent(&self) -> Decimal {
        percent_of(self.collected, self.receivables)
    }
}

/// Plain-text portfolio report: totals, tier counts, the largest open
/// balances and follow-up recommendations.
pub(crate) fn render_summary_report(
    summary: &PortfolioSummary,
    standings: &[ClientStanding],
    currency: &str,
    locale: Locale,
) -> String {
    let money = |v: Decimal| format_money(v, currency);
    let mut out = Vec::new();

    let mut top: Vec<&ClientStanding> = standings
        .iter()
        .filter(|s| s.remaining > Decimal::ZERO)
        .collect();
    top.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    top.truncate(TOP_BALANCES);

    match locale {
        Locale::En => {
            out.push("Portfolio summary".to_string());
            out.push(format!("- Clients: {}", summary.client_count));
            out.push(format!("- Total receivables: {}", money(summary.receivables)));
            out.push(format!(
                "- Collected: {} ({}%)",
                money(summary.collected),
                summary.collected_percent()
            ));
            out.push(format!("- Outstanding: {}", money(summary.outstanding)));
            out.push(format!(
                "- Paid: {} | Current: {} | Late: {}",
                summary.paid_count, summary.current_count, summary.late_count
            ));
            out.push(String::new());
            out.push("Largest outstanding balances".to_string());
            if top.is_empty() {
                out.push("- None".to_string());
            }
            for (i, s) in top.iter().enumerate() {
                out.push(format!(
                    "{}. {}: {} ({})",
                    i + 1,
                    s.client.name,
                    money(s.remaining),
                    s.tier.label(locale)
                ));
            }
            out.push(String::new());
            out.push("Recommendations".to_string());
            if summary.client_count == 0 {
                out.push("- No clients yet. Add a client or import a sheet to get started.".into());
            } else {
                if summary.late_count > 0 {
                    out.push(format!(
                        "- Follow up with the {} late client(s); {} is overdue in total.",
                        summary.late_count,
                        money(summary.arrears)
                    ));
                } else {
                    out.push("- Every active plan is on schedule.".into());
                }
                if summary.paid_count > 0 {
                    out.push(format!(
                        "- Thank the {} client(s) who completed their plans.",
                        summary.paid_count
                    ));
                }
            }
        }
        Locale::Ar => {
            out.push("ملخص المحفظة".to_string());
            out.push(format!("- عدد العملاء: {}", summary.client_count));
            out.push(format!("- إجمالي المستحقات: {}", money(summary.receivables)));
            out.push(format!(
                "- المحصل: {} ({}%)",
                money(summary.collected),
                summary.collected_percent()
            ));
            out.push(format!("- المتبقي: {}", money(summary.outstanding)));
            out.push(format!(
                "- مدفوع: {} | ساري: {} | متأخر: {}",
                summary.paid_count, summary.current_count, summary.late_count
            ));
            out.push(String::new());
            out.push("أكبر الأرصدة المتبقية".to_string());
            if top.is_empty() {
                out.push("- لا يوجد".to_string());
            }
            for (i, s) in top.iter().enumerate() {
                out.push(format!(
                    "{}. {}: {} ({})",
                    i + 1,
                    s.client.name,
                    money(s.remaining),
                    s.tier.label(locale)
                ));
            }
            out.push(String::new());
            out.push("التوصيات".to_string());
            if summary.client_count == 0 {
                out.push("- لا يوجد عملاء بعد. أضف عميلاً أو استورد ملفاً للبدء.".into());
            } else {
                if summary.late_count > 0 {
                    out.push(format!(
                        "- تابع العملاء المتأخرين ({})؛ إجمالي المتأخرات {}.",
                        summary.late_count,
                        money(summary.arrears)
                    ));
                } else {
                    out.push("- جميع الخطط النشطة منتظمة.".into());
                }
                if summary.paid_count > 0 {
                    out.push(format!(
                        "- اشكر العملاء الذين أتموا السداد ({}).",
                        summary.paid_count
                    ));
                }
            }
        }
    }

    out.join("\n")
}
