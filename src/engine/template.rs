// ==========================================
// 徒步旅行预订系统 - 消息模板
// ==========================================
// {{key}} 替换以及通知中使用的显示格式
// ==========================================

use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap());

pub struct TemplateRenderer;

impl TemplateRenderer {
    /// 将每个 `{{key}}` 替换为对应值。未知键保持原样
    pub fn render(template: &str, variables: &HashMap<String, String>) -> String {
        PLACEHOLDER_RE
            .replace_all(template, |caps: &regex::Captures| {
                variables
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// 占位符名称，按首次出现顺序
    pub fn placeholders(template: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in PLACEHOLDER_RE.captures_iter(template) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// "Monday, 15 January 2024"
    pub fn long_date(date: NaiveDate) -> String {
        date.format("%A, %-d %B %Y").to_string()
    }

    /// "15/1/2024"
    pub fn short_date(date: NaiveDate) -> String {
        date.format("%-d/%-m/%Y").to_string()
    }

    /// 带千位分隔符的金额：`₹12,500` 或 `₹12,500.50`
    pub fn money(symbol: &str, amount: f64) -> String {
        let negative = amount < 0.0;
        let cents = (amount.abs() * 100.0).round() as u64;
        let whole = cents / 100;
        let frac = cents % 100;

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        if frac == 0 {
            format!("{}{}{}", sign, symbol, grouped)
        } else {
            format!("{}{}{}.{:02}", sign, symbol, grouped, frac)
        }
    }
}
