// ==========================================
// 预订流程集成测试
// ==========================================
// 覆盖范围:
// 1. 可预订日期：容量、管理员开关、过去日期
// 2. 按日期创建预订：报价、占位、拒绝
// 3. 取消与名额释放
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use helpers::test_data_builder::PackageDraftBuilder;

use trek_booking::domain::SlotUpdate;
use trek_booking::{BookingStatus, PaymentStatus};

// ==========================================
// 可预订日期
// ==========================================

#[test]
fn test_available_dates_only_lists_dates_with_capacity() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Kedarkantha").build());

    env.add_slot(&admin.id, &package.id, 10, 1);
    env.add_slot(&admin.id, &package.id, 5, 2);
    let closed = env.add_slot(&admin.id, &package.id, 15, 3);
    env.state
        .availability_api
        .update_package_availability(
            &admin.id,
            &closed.id,
            SlotUpdate {
                max_bookings: None,
                is_available: Some(false),
            },
        )
        .expect("close slot");

    let dates = env.state.availability_api.get_available_dates(&package.id).unwrap();
    assert_eq!(dates, vec![days_from_today(5), days_from_today(10)]);

    // +10 天的唯一名额已被占用
    env.state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 10, 2))
        .expect("book +10");

    let dates = env.state.availability_api.get_available_dates(&package.id).unwrap();
    assert_eq!(dates, vec![days_from_today(5)]);

    // 管理视图仍显示所有未来余位
    let slots = env.state.availability_api.get_package_availability(&package.id).unwrap();
    assert_eq!(slots.len(), 3);
    assert!(slots.windows(2).all(|w| w[0].available_date <= w[1].available_date));
}

#[test]
fn test_available_dates_for_unknown_or_inactive_package() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Hampta Pass").build());
    env.add_slot(&admin.id, &package.id, 3, 2);

    assert_not_found(env.state.availability_api.get_available_dates("missing-package"));

    env.state
        .admin_api
        .toggle_package_status(&admin.id, &package.id, false)
        .unwrap();
    assert_not_found(env.state.availability_api.get_available_dates(&package.id));
}

#[test]
fn test_package_without_calendar_has_no_listed_dates() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Triund").build());

    let dates = env.state.availability_api.get_available_dates(&package.id).unwrap();
    assert!(dates.is_empty());
}

// ==========================================
// 创建预订
// ==========================================

#[test]
fn test_create_booking_claims_slot_and_quotes_total() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(
        &admin.id,
        PackageDraftBuilder::new("Valley of Flowers").price(8000.0).build(),
    );
    env.add_slot(&admin.id, &package.id, 7, 3);

    let mut request = booking_request(&package.id, 7, 3);
    request.special_requests = Some("  vegetarian meals  ".to_string());
    let booking = env.state.booking_api.create_booking(&customer.id, request).unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert_eq!(booking.total_amount, 24000.0);
    assert_eq!(booking.start_date, days_from_today(7));
    assert_eq!(booking.special_requests.as_deref(), Some("vegetarian meals"));
    assert_eq!(booking.booking_reference.len(), 8);
    assert_eq!(booking.booking_reference, booking.booking_reference.to_uppercase());

    let slots = env.state.availability_api.get_package_availability(&package.id).unwrap();
    assert_eq!(slots[0].current_bookings, 1);
    assert_eq!(slots[0].max_bookings, 3);
}

#[test]
fn test_full_date_is_rejected_and_nothing_is_written() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let first = env.create_customer();
    let second = env.sign_up_user("Rohan Mehta", "rohan@example.in", None);
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Brahmatal").build());
    env.add_slot(&admin.id, &package.id, 12, 1);

    env.state
        .booking_api
        .create_booking(&first.id, booking_request(&package.id, 12, 2))
        .expect("first booking");

    assert_date_unavailable(
        env.state
            .booking_api
            .create_booking(&second.id, booking_request(&package.id, 12, 2)),
    );
    assert!(env.state.booking_api.get_user_bookings(&second.id).unwrap().is_empty());

    let slots = env.state.availability_api.get_package_availability(&package.id).unwrap();
    assert_eq!(slots[0].current_bookings, 1);
}

#[test]
fn test_date_outside_calendar_or_closed_is_rejected() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Roopkund").build());
    let slot = env.add_slot(&admin.id, &package.id, 20, 4);

    assert_date_unavailable(
        env.state
            .booking_api
            .create_booking(&customer.id, booking_request(&package.id, 21, 1)),
    );

    env.state
        .availability_api
        .update_package_availability(
            &admin.id,
            &slot.id,
            SlotUpdate {
                max_bookings: None,
                is_available: Some(false),
            },
        )
        .unwrap();
    assert_date_unavailable(
        env.state
            .booking_api
            .create_booking(&customer.id, booking_request(&package.id, 20, 1)),
    );
}

#[test]
fn test_package_without_calendar_accepts_future_dates() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Nag Tibba").build());

    let booking = env
        .state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 40, 1))
        .unwrap();
    assert_eq!(booking.start_date, days_from_today(40));
}

#[test]
fn test_booking_request_validation() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(
        &admin.id,
        PackageDraftBuilder::new("Sandakphu").max_group_size(4).build(),
    );

    assert_invalid_input(
        env.state
            .booking_api
            .create_booking(&customer.id, booking_request(&package.id, 5, 0)),
    );
    assert_invalid_input(
        env.state
            .booking_api
            .create_booking(&customer.id, booking_request(&package.id, 5, 5)),
    );
    assert_invalid_input(
        env.state
            .booking_api
            .create_booking(&customer.id, booking_request(&package.id, -1, 2)),
    );
    assert_not_found(
        env.state
            .booking_api
            .create_booking(&customer.id, booking_request("missing-package", 5, 2)),
    );

    env.state
        .admin_api
        .toggle_package_status(&admin.id, &package.id, false)
        .unwrap();
    assert_not_found(
        env.state
            .booking_api
            .create_booking(&customer.id, booking_request(&package.id, 5, 2)),
    );
}

// ==========================================
// 列表与取消
// ==========================================

#[test]
fn test_user_bookings_are_private() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let owner = env.create_customer();
    let other = env.sign_up_user("Meera Iyer", "meera@example.in", None);
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Chopta").build());

    let booking = env
        .state
        .booking_api
        .create_booking(&owner.id, booking_request(&package.id, 9, 2))
        .unwrap();

    let listed = env.state.booking_api.get_user_bookings(&owner.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].booking.id, booking.id);
    assert_eq!(
        listed[0].package.as_ref().map(|p| p.title.as_str()),
        Some("Chopta")
    );

    assert_eq!(env.state.booking_api.get_booking(&owner.id, &booking.id).unwrap().id, booking.id);
    assert_not_found(env.state.booking_api.get_booking(&other.id, &booking.id));
    assert_not_found(env.state.booking_api.cancel_booking(&other.id, &booking.id));
}

#[test]
fn test_bookings_made_back_to_back_list_newest_first() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Bali Pass").build());

    let mut created: Vec<String> = (0..6)
        .map(|i| {
            env.state
                .booking_api
                .create_booking(&customer.id, booking_request(&package.id, 10 + i, 1))
                .unwrap()
                .id
        })
        .collect();
    created.reverse();

    let listed: Vec<String> = env
        .state
        .booking_api
        .get_user_bookings(&customer.id)
        .unwrap()
        .into_iter()
        .map(|b| b.booking.id)
        .collect();
    assert_eq!(listed, created);

    let detailed: Vec<String> = env
        .state
        .admin_api
        .get_all_bookings_detailed()
        .unwrap()
        .into_iter()
        .map(|b| b.booking.id)
        .collect();
    assert_eq!(detailed, created);
}

#[test]
fn test_cancel_pending_booking_releases_the_date() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Kuari Pass").build());
    env.add_slot(&admin.id, &package.id, 6, 1);

    let booking = env
        .state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 6, 2))
        .unwrap();
    assert!(env.state.availability_api.get_available_dates(&package.id).unwrap().is_empty());

    let cancelled = env.state.booking_api.cancel_booking(&customer.id, &booking.id).unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(
        env.state.availability_api.get_available_dates(&package.id).unwrap(),
        vec![days_from_today(6)]
    );

    // 已取消
    assert_business_rule(env.state.booking_api.cancel_booking(&customer.id, &booking.id));
}

#[test]
fn test_customer_cannot_cancel_confirmed_booking() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Har Ki Dun").build());
    env.add_slot(&admin.id, &package.id, 8, 2);

    let booking = env
        .state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 8, 1))
        .unwrap();
    env.state
        .admin_api
        .update_booking_status(&admin.id, &booking.id, BookingStatus::Confirmed, None)
        .unwrap();

    assert_business_rule(env.state.booking_api.cancel_booking(&customer.id, &booking.id));

    let slots = env.state.availability_api.get_package_availability(&package.id).unwrap();
    assert_eq!(slots[0].current_bookings, 1);
}

// ==========================================
// 余位管理
// ==========================================

#[test]
fn test_slot_administration_rules() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let customer = env.create_customer();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Brahmatal").build());
    let availability = &env.state.availability_api;

    assert_invalid_input(availability.add_package_availability(&admin.id, &package.id, days_from_today(-1), Some(2)));
    assert_invalid_input(availability.add_package_availability(&admin.id, &package.id, days_from_today(4), Some(0)));
    assert_not_found(availability.add_package_availability(&admin.id, "missing-package", days_from_today(4), Some(2)));

    // 未指定 max：使用配置默认值 1
    let slot = availability
        .add_package_availability(&admin.id, &package.id, days_from_today(4), None)
        .unwrap();
    assert_eq!(slot.max_bookings, 1);
    assert_eq!(slot.current_bookings, 0);
    match availability.add_package_availability(&admin.id, &package.id, days_from_today(4), Some(3)) {
        Err(trek_booking::api::ApiError::AlreadyExists(_)) => {}
        other => panic!("expected AlreadyExists, got {:?}", other),
    }

    let raised = availability
        .update_package_availability(
            &admin.id,
            &slot.id,
            SlotUpdate {
                max_bookings: Some(2),
                is_available: None,
            },
        )
        .unwrap();
    assert_eq!(raised.max_bookings, 2);

    env.state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 4, 1))
        .unwrap();
    env.state
        .booking_api
        .create_booking(&customer.id, booking_request(&package.id, 4, 1))
        .unwrap();

    // 不能缩小到已预订数以下，也不能删除有占用的余位
    assert_business_rule(availability.update_package_availability(
        &admin.id,
        &slot.id,
        SlotUpdate {
            max_bookings: Some(1),
            is_available: None,
        },
    ));
    assert_business_rule(availability.remove_package_availability(&admin.id, &slot.id));

    let spare = env.add_slot(&admin.id, &package.id, 9, 2);
    availability.remove_package_availability(&admin.id, &spare.id).unwrap();
    assert_not_found(availability.remove_package_availability(&admin.id, &spare.id));
    assert_eq!(availability.get_package_availability(&package.id).unwrap().len(), 1);
}
