// ==========================================
// AdminApi 集成测试
// ==========================================
// 覆盖范围:
// 1. 预订状态生命周期与名额释放
// 2. 预订搜索
// 3. 仪表盘指标
// 4. 线路管理
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::PackageDraftBuilder;

use trek_booking::api::{ApiError, BookingQuery, PackageStatusFilter};
use trek_booking::{BookingStatus, Difficulty, PaymentStatus};

// ==========================================
// 预订状态
// ==========================================

#[test]
fn test_status_lifecycle_with_payment() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Pangarchulla").build());
    env.add_slot(&admin.id, &package.id, 10, 2);
    let booking = env
        .state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 10, 2))
        .unwrap();

    let update = env
        .state
        .admin_api
        .update_booking_status(&admin.id, &booking.id, BookingStatus::Confirmed, Some("pay_8231"))
        .unwrap();
    assert_eq!(update.booking.status, BookingStatus::Confirmed);
    assert_eq!(update.booking.payment_status, PaymentStatus::Completed);
    assert_eq!(update.booking.payment_id.as_deref(), Some("pay_8231"));
    assert!(!update.slot_released);
    assert!(update.notification.is_none());

    // 重复设置当前状态不产生变化
    let same = env
        .state
        .admin_api
        .update_booking_status(&admin.id, &booking.id, BookingStatus::Confirmed, None)
        .unwrap();
    assert_eq!(same.booking.status, BookingStatus::Confirmed);

    let done = env
        .state
        .admin_api
        .update_booking_status(&admin.id, &booking.id, BookingStatus::Completed, None)
        .unwrap();
    assert_eq!(done.booking.status, BookingStatus::Completed);

    match env
        .state
        .admin_api
        .update_booking_status(&admin.id, &booking.id, BookingStatus::Pending, None)
    {
        Err(ApiError::InvalidStateTransition { from, to }) => {
            assert_eq!(from, "completed");
            assert_eq!(to, "pending");
        }
        other => panic!("expected InvalidStateTransition, got {:?}", other),
    }

    // 已完成的行程保留名额
    let slots = env.state.availability_api.get_package_availability(&package.id).unwrap();
    assert_eq!(slots[0].current_bookings, 1);
}

#[test]
fn test_admin_cancel_of_confirmed_booking_releases_slot() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Deoriatal").build());
    env.add_slot(&admin.id, &package.id, 3, 1);
    let booking = env
        .state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 3, 1))
        .unwrap();

    env.state
        .admin_api
        .update_booking_status(&admin.id, &booking.id, BookingStatus::Confirmed, None)
        .unwrap();
    let update = env
        .state
        .admin_api
        .update_booking_status(&admin.id, &booking.id, BookingStatus::Cancelled, None)
        .unwrap();

    assert!(update.slot_released);
    assert_eq!(
        env.state.availability_api.get_available_dates(&package.id).unwrap(),
        vec![days_from_today(3)]
    );
}

#[test]
fn test_payment_cannot_be_recorded_on_closed_booking() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Brahmatal").build());
    let booking = env
        .state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 12, 1))
        .unwrap();
    env.state.booking_api.cancel_booking(&customer.id, &booking.id).unwrap();

    assert_business_rule(env.state.admin_api.update_booking_status(
        &admin.id,
        &booking.id,
        BookingStatus::Cancelled,
        Some("pay_late"),
    ));
    let stored = env.state.booking_api.get_booking(&customer.id, &booking.id).unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    assert!(stored.payment_id.is_none());
}

#[test]
fn test_update_unknown_booking() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    assert_not_found(env.state.admin_api.update_booking_status(
        &admin.id,
        "missing-booking",
        BookingStatus::Confirmed,
        None,
    ));
}

// ==========================================
// 搜索
// ==========================================

#[test]
fn test_search_bookings_by_status_and_term() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let ananya = env.create_customer();
    let vikram = env.sign_up_user("Vikram Singh", "vikram@example.in", None);
    let kedar = env.create_package(&admin.id, PackageDraftBuilder::new("Kedarkantha").build());
    let hampta = env.create_package(&admin.id, PackageDraftBuilder::new("Hampta Pass").build());

    let first = env
        .state
        .booking_api
        .create_booking(&ananya.id, booking_request(&kedar.id, 5, 2))
        .unwrap();
    let second = env
        .state
        .booking_api
        .create_booking(&vikram.id, booking_request(&hampta.id, 6, 1))
        .unwrap();
    env.state
        .admin_api
        .update_booking_status(&admin.id, &second.id, BookingStatus::Confirmed, None)
        .unwrap();

    let all = env.state.admin_api.get_all_bookings_detailed().unwrap();
    assert_eq!(all.len(), 2);
    let detailed = all.iter().find(|b| b.booking.id == first.id).unwrap();
    assert_eq!(detailed.user.name, "Ananya Rao");
    assert_eq!(detailed.package.title, "Kedarkantha");

    let confirmed = env
        .state
        .admin_api
        .search_bookings(&BookingQuery {
            status: Some(BookingStatus::Confirmed),
            search: None,
        })
        .unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].booking.id, second.id);

    let by_name = env
        .state
        .admin_api
        .search_bookings(&BookingQuery {
            status: None,
            search: Some("ANANYA".to_string()),
        })
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].booking.id, first.id);

    let by_title = env
        .state
        .admin_api
        .search_bookings(&BookingQuery {
            status: None,
            search: Some("hampta".to_string()),
        })
        .unwrap();
    assert_eq!(by_title.len(), 1);

    let by_id = env
        .state
        .admin_api
        .search_bookings(&BookingQuery {
            status: Some(BookingStatus::Pending),
            search: Some(first.id[..8].to_string()),
        })
        .unwrap();
    assert_eq!(by_id.len(), 1);

    let everything = env.state.admin_api.search_bookings(&BookingQuery::default()).unwrap();
    assert_eq!(everything.len(), 2);
}

// ==========================================
// 仪表盘
// ==========================================

#[test]
fn test_admin_stats() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Sar Pass").price(5000.0).build());
    let hidden = env.create_package(&admin.id, PackageDraftBuilder::new("Bhrigu Lake").build());
    env.state
        .admin_api
        .toggle_package_status(&admin.id, &hidden.id, false)
        .unwrap();

    let mut ids = Vec::new();
    for (days, group) in [(5, 1), (6, 2), (7, 3)] {
        ids.push(
            env.state
                .booking_api
                .create_booking(&customer.id, booking_request(&package.id, days, group))
                .unwrap()
                .id,
        );
    }
    // 5000 待确认，10000 已确认，15000 已完成
    env.state
        .admin_api
        .update_booking_status(&admin.id, &ids[1], BookingStatus::Confirmed, None)
        .unwrap();
    env.state
        .admin_api
        .update_booking_status(&admin.id, &ids[2], BookingStatus::Confirmed, None)
        .unwrap();
    env.state
        .admin_api
        .update_booking_status(&admin.id, &ids[2], BookingStatus::Completed, None)
        .unwrap();

    let stats = env.state.admin_api.get_admin_stats().unwrap();
    assert_eq!(stats.total_bookings, 3);
    assert_eq!(stats.total_revenue, 25000.0);
    assert_eq!(stats.total_packages, 1);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.monthly_bookings, 3);
    assert_eq!(stats.pending_bookings, 1);
}

// ==========================================
// 线路
// ==========================================

#[test]
fn test_create_package_validation() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();

    assert_invalid_input(
        env.state
            .admin_api
            .create_trek_package(&admin.id, PackageDraftBuilder::new("Free Trek").price(0.0).build()),
    );
    assert_invalid_input(
        env.state
            .admin_api
            .create_trek_package(&admin.id, PackageDraftBuilder::new("No Photos").images(&["  "]).build()),
    );
    assert_invalid_input(
        env.state
            .admin_api
            .create_trek_package(&admin.id, PackageDraftBuilder::new("   ").build()),
    );
    assert!(env
        .state
        .admin_api
        .list_all_packages(None, PackageStatusFilter::All)
        .unwrap()
        .is_empty());
}

#[test]
fn test_package_update_toggle_and_listing() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let package = env.create_package(
        &admin.id,
        PackageDraftBuilder::new("Tarsar Marsar").location("Kashmir").build(),
    );
    let other = env.create_package(&admin.id, PackageDraftBuilder::new("Kheerganga").build());

    let updated = env
        .state
        .admin_api
        .update_trek_package(
            &admin.id,
            &package.id,
            PackageDraftBuilder::new("Tarsar Marsar Lakes")
                .location("Kashmir")
                .difficulty(Difficulty::Difficult)
                .price(14500.0)
                .build(),
        )
        .unwrap();
    assert_eq!(updated.title, "Tarsar Marsar Lakes");
    assert!(updated.is_active);

    let stored = env
        .state
        .catalog_api
        .get_trek_package_by_id(&package.id)
        .unwrap()
        .expect("package visible");
    assert_eq!(stored.price, 14500.0);
    assert_eq!(stored.difficulty, Difficulty::Difficult);
    assert_eq!(stored.itinerary.len(), 1);

    env.state
        .admin_api
        .toggle_package_status(&admin.id, &other.id, false)
        .unwrap();
    assert!(env.state.catalog_api.get_trek_package_by_id(&other.id).unwrap().is_none());

    let active = env
        .state
        .admin_api
        .list_all_packages(None, PackageStatusFilter::Active)
        .unwrap();
    assert_eq!(active.len(), 1);
    let inactive = env
        .state
        .admin_api
        .list_all_packages(None, PackageStatusFilter::Inactive)
        .unwrap();
    assert_eq!(inactive[0].id, other.id);
    let kashmir = env
        .state
        .admin_api
        .list_all_packages(Some("kashmir"), PackageStatusFilter::All)
        .unwrap();
    assert_eq!(kashmir.len(), 1);

    assert_not_found(env.state.admin_api.update_trek_package(
        &admin.id,
        "missing-package",
        PackageDraftBuilder::new("Ghost").build(),
    ));
}

#[test]
fn test_delete_package_only_without_bookings() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let booked = env.create_package(&admin.id, PackageDraftBuilder::new("Rupin Pass").build());
    let unused = env.create_package(&admin.id, PackageDraftBuilder::new("Prashar Lake").build());
    env.add_slot(&admin.id, &unused.id, 5, 2);

    env.state
        .booking_api
        .create_booking(&customer.id, booking_request(&booked.id, 5, 1))
        .unwrap();

    assert_business_rule(env.state.admin_api.delete_trek_package(&admin.id, &booked.id));

    env.state.admin_api.delete_trek_package(&admin.id, &unused.id).unwrap();
    assert!(env.state.catalog_api.get_trek_package_by_id(&unused.id).unwrap().is_none());
    assert_not_found(env.state.admin_api.delete_trek_package(&admin.id, &unused.id));
}
