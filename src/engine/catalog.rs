// ==========================================
// 徒步旅行预订系统 - 线路目录筛选
// ==========================================
// 对上架线路列表做搜索、分面筛选与排序
// 分档边界: 天数 1-2 / 3-4 / 5+，
// 价格 <=7500 / (7500, 12500] / >12500
// ==========================================

use crate::domain::package::TrekPackage;
use crate::domain::types::Difficulty;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationBucket {
    #[serde(rename = "1-2")]
    Short,
    #[serde(rename = "3-4")]
    Medium,
    #[serde(rename = "5+")]
    Long,
}

impl DurationBucket {
    pub fn contains(&self, days: i32) -> bool {
        match self {
            DurationBucket::Short => days <= 2,
            DurationBucket::Medium => (3..=4).contains(&days),
            DurationBucket::Long => days >= 5,
        }
    }
}

impl FromStr for DurationBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-2" => Ok(DurationBucket::Short),
            "3-4" => Ok(DurationBucket::Medium),
            "5+" => Ok(DurationBucket::Long),
            other => Err(format!("unknown duration bucket: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "0-7500")]
    Budget,
    #[serde(rename = "7500-12500")]
    Standard,
    #[serde(rename = "12500+")]
    Premium,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        match self {
            PriceRange::Budget => price <= 7500.0,
            PriceRange::Standard => price > 7500.0 && price <= 12500.0,
            PriceRange::Premium => price > 12500.0,
        }
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0-7500" => Ok(PriceRange::Budget),
            "7500-12500" => Ok(PriceRange::Standard),
            "12500+" => Ok(PriceRange::Premium),
            other => Err(format!("unknown price range: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "price-low")]
    PriceLow,
    #[serde(rename = "price-high")]
    PriceHigh,
    #[serde(rename = "duration")]
    Duration,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "rating" => Ok(SortBy::Rating),
            "price-low" => Ok(SortBy::PriceLow),
            "price-high" => Ok(SortBy::PriceHigh),
            "duration" => Ok(SortBy::Duration),
            other => Err(format!("unknown sort: {}", other)),
        }
    }
}

/// 面向客户的线路筛选条件。空字段匹配全部
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub duration: Option<DurationBucket>,
    pub price_range: Option<PriceRange>,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSearchResult {
    pub packages: Vec<TrekPackage>,
    pub total: usize,
}

pub struct CatalogFilter;

impl CatalogFilter {
    pub fn matches(package: &TrekPackage, filter: &PackageFilter) -> bool {
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = package.title.to_lowercase().contains(&term)
                || package.description.to_lowercase().contains(&term)
                || package.location.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(location) = filter.location.as_deref().filter(|l| !l.is_empty()) {
            if package.location != location {
                return false;
            }
        }
        if let Some(difficulty) = filter.difficulty {
            if package.difficulty != difficulty {
                return false;
            }
        }
        if let Some(bucket) = filter.duration {
            if !bucket.contains(package.duration) {
                return false;
            }
        }
        if let Some(range) = filter.price_range {
            if !range.contains(package.price) {
                return false;
            }
        }
        true
    }

    /// 先筛选后排序。排序稳定，相同值保持输入顺序
    pub fn apply(packages: Vec<TrekPackage>, filter: &PackageFilter) -> PackageSearchResult {
        let mut matched: Vec<TrekPackage> = packages
            .into_iter()
            .filter(|p| Self::matches(p, filter))
            .collect();

        match filter.sort_by {
            SortBy::Rating => matched.sort_by(|a, b| {
                b.rating
                    .unwrap_or(0.0)
                    .partial_cmp(&a.rating.unwrap_or(0.0))
                    .unwrap_or(Ordering::Equal)
            }),
            SortBy::PriceLow => {
                matched.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
            }
            SortBy::PriceHigh => {
                matched.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal))
            }
            SortBy::Duration => matched.sort_by_key(|p| p.duration),
        }

        let total = matched.len();
        PackageSearchResult {
            packages: matched,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn pkg(id: &str, location: &str, duration: i32, price: f64, rating: Option<f64>) -> TrekPackage {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TrekPackage {
            id: id.to_string(),
            title: format!("{} trail", id),
            description: "Tea gardens and mist".to_string(),
            location: location.to_string(),
            duration,
            difficulty: if duration > 3 { Difficulty::Difficult } else { Difficulty::Easy },
            price,
            max_group_size: 10,
            images: vec![],
            itinerary: vec![],
            included: vec![],
            excluded: vec![],
            is_active: true,
            rating,
            total_reviews: 0,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn catalog() -> Vec<TrekPackage> {
        vec![
            pkg("kolukkumalai", "Munnar", 1, 3500.0, Some(4.6)),
            pkg("meesapulimala", "Munnar", 2, 7500.0, Some(4.9)),
            pkg("chembra", "Wayanad", 3, 7600.0, None),
            pkg("agasthyarkoodam", "Trivandrum", 5, 14000.0, Some(4.7)),
        ]
    }

    fn ids(result: &PackageSearchResult) -> Vec<&str> {
        result.packages.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_sorts_by_rating_with_unrated_last() {
        let result = CatalogFilter::apply(catalog(), &PackageFilter::default());
        assert_eq!(
            ids(&result),
            vec!["meesapulimala", "agasthyarkoodam", "kolukkumalai", "chembra"]
        );
        assert_eq!(result.total, 4);
    }

    #[test]
    fn test_price_bucket_bounds() {
        let filter = PackageFilter {
            price_range: Some(PriceRange::Budget),
            sort_by: SortBy::PriceLow,
            ..Default::default()
        };
        assert_eq!(
            ids(&CatalogFilter::apply(catalog(), &filter)),
            vec!["kolukkumalai", "meesapulimala"]
        );

        let filter = PackageFilter {
            price_range: Some(PriceRange::Standard),
            ..Default::default()
        };
        assert_eq!(ids(&CatalogFilter::apply(catalog(), &filter)), vec!["chembra"]);
    }

    #[test]
    fn test_search_location_and_duration() {
        let filter = PackageFilter {
            search: Some("  MUNNAR ".to_string()),
            duration: Some(DurationBucket::Short),
            sort_by: SortBy::PriceHigh,
            ..Default::default()
        };
        assert_eq!(
            ids(&CatalogFilter::apply(catalog(), &filter)),
            vec!["meesapulimala", "kolukkumalai"]
        );

        let filter = PackageFilter {
            location: Some("Trivandrum".to_string()),
            duration: Some(DurationBucket::Long),
            difficulty: Some(Difficulty::Difficult),
            ..Default::default()
        };
        assert_eq!(ids(&CatalogFilter::apply(catalog(), &filter)), vec!["agasthyarkoodam"]);
    }

    #[test]
    fn test_parse_wire_values() {
        assert_eq!("5+".parse::<DurationBucket>().unwrap(), DurationBucket::Long);
        assert_eq!("12500+".parse::<PriceRange>().unwrap(), PriceRange::Premium);
        assert_eq!("".parse::<SortBy>().unwrap(), SortBy::Rating);
        assert!("cheap".parse::<PriceRange>().is_err());

        let filter: PackageFilter =
            serde_json::from_str(r#"{"duration":"3-4","sort_by":"price-low"}"#).unwrap();
        assert_eq!(filter.duration, Some(DurationBucket::Medium));
        assert_eq!(filter.sort_by, SortBy::PriceLow);
    }
}
