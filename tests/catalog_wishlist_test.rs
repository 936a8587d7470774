// ==========================================
// CatalogApi / WishlistApi 集成测试
// ==========================================
// 覆盖范围:
// 1. 列表、搜索、筛选与排序
// 2. 评价与线路评分
// 3. 心愿单
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::PackageDraftBuilder;

use trek_booking::api::ApiError;
use trek_booking::domain::{Booking, NewReview, ReviewUpdate, TrekPackage, UserProfile};
use trek_booking::engine::{DurationBucket, PackageFilter, PriceRange, SortBy};
use trek_booking::{BookingStatus, Difficulty};

fn seed_catalog(env: &ApiTestEnv, admin_id: &str) -> (TrekPackage, TrekPackage, TrekPackage) {
    let kedarkantha = env.create_package(
        admin_id,
        PackageDraftBuilder::new("Kedarkantha")
            .description("Snow trails through pine forest")
            .duration(6)
            .price(11500.0)
            .build(),
    );
    let hampta = env.create_package(
        admin_id,
        PackageDraftBuilder::new("Hampta Pass")
            .location("Himachal Pradesh")
            .duration(5)
            .difficulty(Difficulty::Difficult)
            .price(13500.0)
            .build(),
    );
    let triund = env.create_package(
        admin_id,
        PackageDraftBuilder::new("Triund")
            .location("Himachal Pradesh")
            .duration(2)
            .difficulty(Difficulty::Easy)
            .price(3500.0)
            .build(),
    );
    (kedarkantha, hampta, triund)
}

fn completed_booking(env: &ApiTestEnv, admin_id: &str, user: &UserProfile, package_id: &str, days: i64) -> Booking {
    let booking = env
        .state
        .booking_api
        .create_booking(&user.id, booking_request(package_id, days, 1))
        .unwrap();
    for status in [BookingStatus::Confirmed, BookingStatus::Completed] {
        env.state
            .admin_api
            .update_booking_status(admin_id, &booking.id, status, None)
            .unwrap();
    }
    booking
}

fn titles(packages: &[TrekPackage]) -> Vec<&str> {
    packages.iter().map(|p| p.title.as_str()).collect()
}

// ==========================================
// 列表与搜索
// ==========================================

#[test]
fn test_search_filters_and_sort() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    seed_catalog(&env, &admin.id);
    let catalog = &env.state.catalog_api;

    let all = catalog.search_packages(&PackageFilter::default()).unwrap();
    assert_eq!(all.total, 3);

    let himachal = catalog
        .search_packages(&PackageFilter {
            location: Some("Himachal Pradesh".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(himachal.total, 2);

    let snow = catalog
        .search_packages(&PackageFilter {
            search: Some("SNOW".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(titles(&snow.packages), vec!["Kedarkantha"]);

    let short = catalog
        .search_packages(&PackageFilter {
            duration: Some(DurationBucket::Short),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(titles(&short.packages), vec!["Triund"]);

    let premium = catalog
        .search_packages(&PackageFilter {
            price_range: Some(PriceRange::Premium),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(titles(&premium.packages), vec!["Hampta Pass"]);

    let difficult = catalog
        .search_packages(&PackageFilter {
            difficulty: Some(Difficulty::Difficult),
            location: Some("Himachal Pradesh".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(difficult.total, 1);

    let cheapest_first = catalog
        .search_packages(&PackageFilter {
            sort_by: SortBy::PriceLow,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        titles(&cheapest_first.packages),
        vec!["Triund", "Kedarkantha", "Hampta Pass"]
    );

    let shortest_first = catalog
        .search_packages(&PackageFilter {
            sort_by: SortBy::Duration,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        titles(&shortest_first.packages),
        vec!["Triund", "Hampta Pass", "Kedarkantha"]
    );

    assert_eq!(
        catalog.list_locations().unwrap(),
        vec!["Himachal Pradesh".to_string(), "Uttarakhand".to_string()]
    );
}

#[test]
fn test_inactive_packages_are_hidden_from_catalog() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let (kedarkantha, _, _) = seed_catalog(&env, &admin.id);

    env.state
        .admin_api
        .toggle_package_status(&admin.id, &kedarkantha.id, false)
        .unwrap();

    let listed = env.state.catalog_api.get_trek_packages().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| p.id != kedarkantha.id));
    assert_eq!(
        env.state.catalog_api.list_locations().unwrap(),
        vec!["Himachal Pradesh".to_string()]
    );
}

// ==========================================
// 评价
// ==========================================

#[test]
fn test_reviews_update_package_rating() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let (kedarkantha, hampta, _) = seed_catalog(&env, &admin.id);
    let ananya = env.create_customer();
    let rohan = env.sign_up_user("Rohan Mehta", "rohan@example.in", None);

    let first = completed_booking(&env, &admin.id, &ananya, &hampta.id, 3);
    let second = completed_booking(&env, &admin.id, &rohan, &hampta.id, 4);

    let review = env
        .state
        .catalog_api
        .create_review(
            &ananya.id,
            NewReview {
                booking_id: first.id.clone(),
                rating: 5,
                comment: "  Stunning crossover  ".to_string(),
            },
        )
        .unwrap();
    assert_eq!(review.comment, "Stunning crossover");
    assert_eq!(review.package_id, hampta.id);
    assert_eq!(review.reviewer_name.as_deref(), Some("Ananya Rao"));

    env.state
        .catalog_api
        .create_review(
            &rohan.id,
            NewReview {
                booking_id: second.id.clone(),
                rating: 4,
                comment: "Cold nights".to_string(),
            },
        )
        .unwrap();

    let rated = env
        .state
        .catalog_api
        .get_trek_package_by_id(&hampta.id)
        .unwrap()
        .unwrap();
    assert_eq!(rated.rating, Some(4.5));
    assert_eq!(rated.total_reviews, 2);

    // 有评分的线路排在前面
    let listed = env.state.catalog_api.get_trek_packages().unwrap();
    assert_eq!(listed[0].id, hampta.id);
    assert!(listed.iter().any(|p| p.id == kedarkantha.id && p.rating.is_none()));

    let reviews = env.state.catalog_api.get_package_reviews(&hampta.id).unwrap();
    assert_eq!(reviews.len(), 2);
    let rohan_review = reviews.iter().find(|r| r.user_id == rohan.id).unwrap();

    let updated = env
        .state
        .catalog_api
        .update_review(
            &rohan.id,
            &rohan_review.id,
            ReviewUpdate {
                rating: Some(3),
                comment: None,
            },
        )
        .unwrap();
    assert_eq!(updated.rating, 3);
    assert_eq!(updated.comment, "Cold nights");

    let rerated = env
        .state
        .catalog_api
        .get_trek_package_by_id(&hampta.id)
        .unwrap()
        .unwrap();
    assert_eq!(rerated.rating, Some(4.0));

    // 只有作者能修改
    assert_not_found(env.state.catalog_api.update_review(
        &ananya.id,
        &updated.id,
        ReviewUpdate {
            rating: Some(1),
            comment: None,
        },
    ));
}

#[test]
fn test_review_rules() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let (kedarkantha, _, _) = seed_catalog(&env, &admin.id);
    let ananya = env.create_customer();
    let rohan = env.sign_up_user("Rohan Mehta", "rohan@example.in", None);

    let pending = env
        .state
        .booking_api
        .create_booking(&ananya.id, booking_request(&kedarkantha.id, 5, 1))
        .unwrap();
    let review = |user_id: &str, booking_id: &str, rating: i32| {
        env.state.catalog_api.create_review(
            user_id,
            NewReview {
                booking_id: booking_id.to_string(),
                rating,
                comment: "Good".to_string(),
            },
        )
    };

    assert_business_rule(review(&ananya.id, &pending.id, 4));

    let done = completed_booking(&env, &admin.id, &ananya, &kedarkantha.id, 6);
    assert_invalid_input(review(&ananya.id, &done.id, 0));
    assert_invalid_input(review(&ananya.id, &done.id, 6));
    assert_not_found(review(&rohan.id, &done.id, 4));

    review(&ananya.id, &done.id, 4).unwrap();
    match review(&ananya.id, &done.id, 5) {
        Err(ApiError::AlreadyExists(_)) => {}
        other => panic!("expected AlreadyExists, got {:?}", other),
    }
    assert_eq!(env.state.catalog_api.get_package_reviews(&kedarkantha.id).unwrap().len(), 1);
}

// ==========================================
// 心愿单
// ==========================================

#[test]
fn test_wishlist_membership() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let (kedarkantha, hampta, _) = seed_catalog(&env, &admin.id);
    let user = env.create_customer();
    let wishlist = &env.state.wishlist_api;

    let entry = wishlist.add_to_wishlist(&user.id, &kedarkantha.id).unwrap();
    assert_eq!(entry.package.as_ref().map(|p| p.title.as_str()), Some("Kedarkantha"));
    assert!(wishlist.is_in_wishlist(&user.id, &kedarkantha.id).unwrap());

    assert_business_rule(wishlist.add_to_wishlist(&user.id, &kedarkantha.id));
    assert_not_found(wishlist.add_to_wishlist(&user.id, "missing-package"));

    assert!(wishlist.toggle_wishlist(&user.id, &hampta.id).unwrap());
    let saved = wishlist.get_user_wishlist(&user.id).unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|e| e.package.is_some()));
    // 按创建时间倒序，同一秒内也是如此
    let order: Vec<&str> = saved.iter().map(|e| e.package_id.as_str()).collect();
    assert_eq!(order, vec![hampta.id.as_str(), kedarkantha.id.as_str()]);

    assert!(!wishlist.toggle_wishlist(&user.id, &hampta.id).unwrap());
    assert!(!wishlist.is_in_wishlist(&user.id, &hampta.id).unwrap());

    assert!(wishlist.remove_from_wishlist(&user.id, &kedarkantha.id).unwrap());
    assert!(!wishlist.remove_from_wishlist(&user.id, &kedarkantha.id).unwrap());
    assert!(wishlist.get_user_wishlist(&user.id).unwrap().is_empty());
}

#[test]
fn test_wishlist_is_independent_of_bookings() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let (kedarkantha, _, _) = seed_catalog(&env, &admin.id);
    let user = env.create_customer();

    env.state.wishlist_api.add_to_wishlist(&user.id, &kedarkantha.id).unwrap();
    let booking = env
        .state
        .booking_api
        .create_booking(&user.id, booking_request(&kedarkantha.id, 5, 2))
        .unwrap();
    env.state.booking_api.cancel_booking(&user.id, &booking.id).unwrap();

    assert!(env.state.wishlist_api.is_in_wishlist(&user.id, &kedarkantha.id).unwrap());
}
