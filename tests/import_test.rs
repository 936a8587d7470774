// ==========================================
// 余位日历导入测试
// ==========================================
// 覆盖范围:
// 1. CSV 导入：插入行、重复行、行级错误
// 2. 来自配置的默认 max_bookings
// 3. 文件级失败
// ==========================================

mod helpers;

use std::io::Write;
use std::path::PathBuf;

use helpers::api_test_helper::*;
use helpers::test_data_builder::PackageDraftBuilder;
use tempfile::TempDir;

use trek_booking::api::ApiError;
use trek_booking::config::config_keys;

fn write_file(dir: &TempDir, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create import file");
    for line in lines {
        writeln!(file, "{}", line).expect("write import line");
    }
    path
}

fn assert_import_error<T: std::fmt::Debug>(result: Result<T, ApiError>) -> String {
    match result {
        Err(ApiError::ImportError(msg)) => msg,
        other => panic!("expected ImportError, got {:?}", other),
    }
}

#[test]
fn test_csv_import_collects_row_errors() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Kedarkantha").build());
    env.add_slot(&admin.id, &package.id, 5, 2);
    env.state
        .config_manager
        .set_global_config_value(config_keys::AVAILABILITY_DEFAULT_MAX_BOOKINGS, "6")
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let date = |days: i64| days_from_today(days).format("%Y-%m-%d").to_string();
    let path = write_file(
        &dir,
        "calendar.csv",
        &[
            "Package ID,Available Date,Max Bookings".to_string(),
            format!("{},{},3", package.id, date(10)), // 第 2 行：新日期
            format!("{},{},", package.id, date(11)),  // 第 3 行：默认 max
            format!("{},{},4", package.id, date(5)),  // 第 4 行：日历中已存在
            format!("{},{},3", package.id, date(10)), // 第 5 行：文件内重复
            format!("{},{},3", package.id, date(-1)), // 第 6 行：过去日期
            format!("missing-package,{},3", date(12)), // 第 7 行
            format!("{},12/01/2030,3", package.id),   // 第 8 行
            format!("{},{},zero", package.id, date(13)), // 第 9 行
            format!("{},{},0", package.id, date(14)),  // 第 10 行
            ",,".to_string(),                          // 空行，忽略
        ],
    );

    let report = env
        .state
        .availability_api
        .import_availability(&admin.id, &path)
        .unwrap();

    assert_eq!(report.total_rows, 9);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped_duplicates, 2);
    let failed_rows: Vec<usize> = report.errors.iter().map(|e| e.row).collect();
    assert_eq!(failed_rows, vec![6, 7, 8, 9, 10]);
    assert!(report.errors[1].reason.contains("missing-package"));

    let slots = env.state.availability_api.get_package_availability(&package.id).unwrap();
    assert_eq!(slots.len(), 3);
    let imported_default = slots
        .iter()
        .find(|s| s.available_date == days_from_today(11))
        .expect("row 3 imported");
    assert_eq!(imported_default.max_bookings, 6);
    let existing = slots
        .iter()
        .find(|s| s.available_date == days_from_today(5))
        .unwrap();
    assert_eq!(existing.max_bookings, 2);

    assert_eq!(
        env.state.availability_api.get_available_dates(&package.id).unwrap(),
        vec![days_from_today(5), days_from_today(10), days_from_today(11)]
    );
}

#[test]
fn test_missing_column_aborts_import() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let package = env.create_package(&admin.id, PackageDraftBuilder::new("Kuari Pass").build());

    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "calendar.csv",
        &[
            "package_id,max_bookings".to_string(),
            format!("{},3", package.id),
        ],
    );

    let msg = assert_import_error(env.state.availability_api.import_availability(&admin.id, &path));
    assert!(msg.contains("available_date"));
    assert!(env
        .state
        .availability_api
        .get_package_availability(&package.id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_unreadable_files_are_rejected() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let dir = tempfile::tempdir().unwrap();

    let text = write_file(&dir, "calendar.txt", &["package_id,available_date".to_string()]);
    assert_import_error(env.state.availability_api.import_availability(&admin.id, &text));

    let missing = dir.path().join("nowhere.csv");
    assert_import_error(env.state.availability_api.import_availability(&admin.id, &missing));
}

#[test]
fn test_header_only_file_imports_nothing() {
    let env = ApiTestEnv::new().expect("test env");
    let admin = env.create_admin();
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "calendar.csv", &["package_id,available_date,max_bookings".to_string()]);

    let report = env
        .state
        .availability_api
        .import_availability(&admin.id, &path)
        .unwrap();
    assert_eq!(report.total_rows, 0);
    assert_eq!(report.inserted, 0);
    assert!(report.errors.is_empty());
}
