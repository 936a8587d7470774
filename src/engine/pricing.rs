// ==========================================
// 徒步旅行预订系统 - 计价
// ==========================================

pub struct PricingRules;

impl PricingRules {
    /// 团队总价：人均价格乘以人数，精确到派萨
    pub fn quote(price_per_person: f64, group_size: i32) -> f64 {
        let total = price_per_person * group_size.max(0) as f64;
        (total * 100.0).round() / 100.0
    }
}
