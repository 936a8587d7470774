// ==========================================
// 徒步旅行预订系统 - 桌面入口
// ==========================================

// Windows release 构建不弹出控制台窗口
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use trek_booking::app::{get_default_db_path, AppState};

#[cfg(feature = "tauri-app")]
fn main() {
    use trek_booking::app::tauri_commands::*;

    trek_booking::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} {}", trek_booking::APP_NAME, trek_booking::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, "using database");

    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "AppState initialization failed");
            std::process::exit(1);
        }
    };

    let result = tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ===== 认证 =====
            sign_up,
            sign_in,
            sign_out,
            get_current_user,
            check_is_admin,
            request_password_reset,
            reset_password,
            update_password,
            track_user_session,
            // ===== 线路目录 =====
            get_trek_packages,
            get_trek_package_by_id,
            search_packages,
            list_locations,
            get_available_dates,
            get_package_reviews,
            create_review,
            update_review,
            // ===== 预订 =====
            create_booking,
            get_user_bookings,
            get_booking,
            cancel_booking,
            // ===== 心愿单 =====
            get_user_wishlist,
            add_to_wishlist,
            remove_from_wishlist,
            is_in_wishlist,
            toggle_wishlist,
            // ===== 个人资料 =====
            get_user_profile,
            update_user_profile,
            get_user_profile_with_stats,
            get_user_activity_history,
            get_user_dashboard_stats,
            log_user_activity,
            // ===== 管理后台 =====
            get_all_bookings_detailed,
            search_bookings,
            update_booking_status,
            get_admin_stats,
            list_all_packages,
            create_trek_package,
            update_trek_package,
            delete_trek_package,
            toggle_package_status,
            get_package_availability,
            add_package_availability,
            update_package_availability,
            remove_package_availability,
            import_availability,
            // ===== 消息 =====
            get_message_templates,
            send_booking_confirmation,
            get_booking_message_logs,
            retry_failed_message,
            // ===== 配置 =====
            get_config_value,
            set_config_value,
            get_config_snapshot,
            restore_config_from_snapshot,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!(error = %e, "tauri application exited with error");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tauri-app"))]
fn main() {
    trek_booking::logging::init();

    println!("{} {}", trek_booking::APP_NAME, trek_booking::VERSION);
    println!();
    println!("Built without the desktop shell. Rebuild with:");
    println!("  cargo run --features tauri-app");
    println!();

    let db_path = get_default_db_path();
    match AppState::new(db_path.clone()) {
        Ok(state) => match state.admin_api.get_admin_stats() {
            Ok(stats) => {
                println!("database: {}", db_path);
                println!(
                    "packages: {}  users: {}  bookings: {} ({} pending)",
                    stats.total_packages, stats.total_users, stats.total_bookings, stats.pending_bookings
                );
            }
            Err(e) => eprintln!("cannot read stats: {}", e),
        },
        Err(e) => {
            eprintln!("cannot open database {}: {}", db_path, e);
            std::process::exit(1);
        }
    }
}
