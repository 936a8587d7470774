// ==========================================
// 徒步旅行预订系统 - 徒步线路领域模型
// ==========================================
// 可预订的旅游产品：价格、天数、行程、团队人数上限
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::Difficulty;

// ==========================================
// TrekPackage - 徒步线路
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrekPackage {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub duration: i32, // 天
    pub difficulty: Difficulty,
    pub price: f64, // 人均
    pub max_group_size: i32,
    pub images: Vec<String>,
    pub itinerary: Vec<ItineraryDay>, // 按天排序
    pub included: Vec<String>,
    pub excluded: Vec<String>,
    pub is_active: bool,
    pub rating: Option<f64>,
    pub total_reviews: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TrekPackage {
    pub fn summary(&self) -> PackageSummary {
        PackageSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            location: self.location.clone(),
            duration: self.duration,
            difficulty: self.difficulty,
            price: self.price,
            images: self.images.clone(),
            rating: self.rating,
            total_reviews: self.total_reviews,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: i32,
    pub title: String,
    pub description: String,
    pub activities: Vec<String>,
}

/// 嵌入预订与心愿单列表中的线路字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSummary {
    pub id: String,
    pub title: String,
    pub location: String,
    pub duration: i32,
    pub difficulty: Difficulty,
    pub price: f64,
    pub images: Vec<String>,
    pub rating: Option<f64>,
    pub total_reviews: i32,
}

// ==========================================
// PackageDraft - 管理员创建/更新输入
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub duration: i32,
    pub difficulty: Difficulty,
    pub price: f64,
    pub max_group_size: i32,
    pub images: Vec<String>,
    #[serde(default)]
    pub included: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
}

impl PackageDraft {
    /// 去除文本字段首尾空白并丢弃空的列表项，
    /// 与管理后台表单提交逗号分隔值的方式一致
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.location = self.location.trim().to_string();
        self.images = clean_list(self.images);
        self.included = clean_list(self.included);
        self.excluded = clean_list(self.excluded);
        for day in &mut self.itinerary {
            day.title = day.title.trim().to_string();
            day.description = day.description.trim().to_string();
            day.activities = clean_list(std::mem::take(&mut day.activities));
        }
        self.itinerary.sort_by_key(|d| d.day);
        self
    }

    /// 按表单顺序返回第一个校验失败项（如有）
    pub fn validation_error(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Some("Description is required".to_string());
        }
        if self.location.trim().is_empty() {
            return Some("Location is required".to_string());
        }
        if self.duration < 1 {
            return Some("Duration must be at least 1 day".to_string());
        }
        if !(self.price > 0.0) {
            return Some("Price must be greater than 0".to_string());
        }
        if self.max_group_size < 1 {
            return Some("Max group size must be at least 1".to_string());
        }
        if self.images.iter().all(|i| i.trim().is_empty()) {
            return Some("At least one image URL is required".to_string());
        }
        for (i, day) in self.itinerary.iter().enumerate() {
            if day.title.trim().is_empty() {
                return Some(format!("Day {} title is required", i + 1));
            }
            if day.description.trim().is_empty() {
                return Some(format!("Day {} description is required", i + 1));
            }
        }
        None
    }
}

/// 将逗号分隔的表单字段拆分为去空白的非空项
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PackageDraft {
        PackageDraft {
            title: "  Munnar Tea Garden Trek ".to_string(),
            description: "Tea plantations".to_string(),
            location: "Munnar".to_string(),
            duration: 3,
            difficulty: Difficulty::Moderate,
            price: 8500.0,
            max_group_size: 15,
            images: vec!["https://img/1.jpg".to_string(), "  ".to_string()],
            included: vec!["Guide".to_string(), "".to_string()],
            excluded: vec![],
            itinerary: vec![
                ItineraryDay {
                    day: 2,
                    title: "Peak".to_string(),
                    description: "Summit day".to_string(),
                    activities: vec![" trek ".to_string()],
                },
                ItineraryDay {
                    day: 1,
                    title: "Arrival".to_string(),
                    description: "Check in".to_string(),
                    activities: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_normalized_trims_and_orders_itinerary() {
        let d = draft().normalized();
        assert_eq!(d.title, "Munnar Tea Garden Trek");
        assert_eq!(d.images.len(), 1);
        assert_eq!(d.included, vec!["Guide".to_string()]);
        assert_eq!(d.itinerary[0].day, 1);
        assert_eq!(d.itinerary[1].activities, vec!["trek".to_string()]);
        assert!(d.validation_error().is_none());
    }

    #[test]
    fn test_validation_reports_first_problem() {
        let mut d = draft();
        d.price = 0.0;
        assert_eq!(d.validation_error().as_deref(), Some("Price must be greater than 0"));

        let mut d = draft();
        d.itinerary[1].title = " ".to_string();
        assert_eq!(d.validation_error().as_deref(), Some("Day 2 title is required"));

        let mut d = draft();
        d.images = vec![];
        assert_eq!(
            d.validation_error().as_deref(),
            Some("At least one image URL is required")
        );
    }

    #[test]
    fn test_split_comma_list() {
        assert_eq!(
            split_comma_list("Guide, Meals,, ,Permits"),
            vec!["Guide", "Meals", "Permits"]
        );
        assert!(split_comma_list("").is_empty());
    }
}
