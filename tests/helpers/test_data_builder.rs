// ==========================================
// 测试数据构建器
// ==========================================

use trek_booking::domain::{ItineraryDay, PackageDraft};
use trek_booking::Difficulty;

// ==========================================
// PackageDraft 构建器
// ==========================================

pub struct PackageDraftBuilder {
    draft: PackageDraft,
}

impl PackageDraftBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            draft: PackageDraft {
                title: title.to_string(),
                description: format!("{} through forest and ridge", title),
                location: "Uttarakhand".to_string(),
                duration: 4,
                difficulty: Difficulty::Moderate,
                price: 8000.0,
                max_group_size: 8,
                images: vec!["https://img.example.in/trek.jpg".to_string()],
                included: vec!["Meals".to_string(), "Guide".to_string()],
                excluded: vec![],
                itinerary: vec![ItineraryDay {
                    day: 1,
                    title: "Base camp".to_string(),
                    description: "Drive and short acclimatisation walk".to_string(),
                    activities: vec!["Drive".to_string()],
                }],
            },
        }
    }

    pub fn location(mut self, location: &str) -> Self {
        self.draft.location = location.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.draft.description = description.to_string();
        self
    }

    pub fn duration(mut self, days: i32) -> Self {
        self.draft.duration = days;
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.draft.difficulty = difficulty;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.draft.price = price;
        self
    }

    pub fn max_group_size(mut self, size: i32) -> Self {
        self.draft.max_group_size = size;
        self
    }

    pub fn images(mut self, images: &[&str]) -> Self {
        self.draft.images = images.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> PackageDraft {
        self.draft
    }
}
