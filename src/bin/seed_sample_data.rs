// ==========================================
// 徒步旅行预订系统 - 示例数据生成
// ==========================================
// 用法: seed_sample_data [db_path]
// 先备份已有数据库，再建表并写入三条线路、
// 一个月的余位、确认消息模板与一个
// 管理员账户 (admin@trekbooking.in / admin123)
// ==========================================

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use chrono::{Duration, Local};

use trek_booking::app::{get_default_db_path, AppState};
use trek_booking::db::open_sqlite_connection;
use trek_booking::domain::{ItineraryDay, MessageTemplate, PackageDraft, SignUpData};
use trek_booking::engine::TemplateRenderer;
use trek_booking::repository::{MessageRepository, UserRepository};
use trek_booking::{ChannelKind, Difficulty};

const ADMIN_EMAIL: &str = "admin@trekbooking.in";
const ADMIN_PASSWORD: &str = "admin123";
const HORIZON_DAYS: i64 = 30;

fn main() -> anyhow::Result<()> {
    trek_booking::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone()).map_err(|e| anyhow!(e))?;

    let admin = state
        .auth_api
        .sign_up(SignUpData {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
            name: "Trek Admin".to_string(),
            phone: Some("9876543210".to_string()),
        })
        .context("create admin account")?;

    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
    UserRepository::from_connection(conn.clone()).set_admin(&admin.id, true)?;

    let today = Local::now().date_naive();
    let mut slot_count = 0;
    for (index, draft) in sample_packages().into_iter().enumerate() {
        let title = draft.title.clone();
        let package = state
            .admin_api
            .create_trek_package(&admin.id, draft)
            .with_context(|| format!("create package {}", title))?;

        // 错开出发日期，避免所有线路共享每一天
        for offset in ((index as i64 + 3)..=HORIZON_DAYS).step_by(3) {
            state.availability_api.add_package_availability(
                &admin.id,
                &package.id,
                today + Duration::days(offset),
                Some(package.max_group_size.min(4)),
            )?;
            slot_count += 1;
        }
    }

    let message_repo = MessageRepository::from_connection(conn);
    for template in confirmation_templates() {
        message_repo.insert_template(&template)?;
    }

    let stats = state.admin_api.get_admin_stats()?;
    eprintln!(
        "Seeded {}: {} packages, {} availability slots, admin {}",
        db_path, stats.total_packages, slot_count, ADMIN_EMAIL
    );
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> anyhow::Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path).with_context(|| format!("back up {}", db_path))?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn day(day: i32, title: &str, description: &str, activities: &[&str]) -> ItineraryDay {
    ItineraryDay {
        day,
        title: title.to_string(),
        description: description.to_string(),
        activities: activities.iter().map(|a| a.to_string()).collect(),
    }
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_packages() -> Vec<PackageDraft> {
    vec![
        PackageDraft {
            title: "Kedarkantha Winter Trek".to_string(),
            description: "Snow trails through pine forest to a 12,500 ft summit with views of the Garhwal range.".to_string(),
            location: "Uttarakhand".to_string(),
            duration: 6,
            difficulty: Difficulty::Moderate,
            price: 11500.0,
            max_group_size: 12,
            images: list(&["https://images.trekbooking.in/kedarkantha.jpg"]),
            included: list(&["Accommodation", "Meals", "Trek leader", "Permits"]),
            excluded: list(&["Travel to Dehradun", "Personal gear"]),
            itinerary: vec![
                day(1, "Dehradun to Sankri", "Drive through Mussoorie and Purola.", &["Drive", "Briefing"]),
                day(2, "Sankri to Juda Ka Talab", "Climb through oak and pine to the frozen lake.", &["Trek", "Campfire"]),
                day(3, "Juda Ka Talab to Base Camp", "Short climb to the base camp meadow.", &["Trek", "Acclimatisation"]),
                day(4, "Summit day", "Pre-dawn start for the summit and descent to Hargaon.", &["Summit push"]),
                day(5, "Hargaon to Sankri", "Descent through the forest.", &["Trek"]),
                day(6, "Sankri to Dehradun", "Drive back.", &["Drive"]),
            ],
        },
        PackageDraft {
            title: "Hampta Pass Crossover".to_string(),
            description: "Cross from the green Kullu valley into the stark Lahaul desert over a 14,100 ft pass.".to_string(),
            location: "Himachal Pradesh".to_string(),
            duration: 5,
            difficulty: Difficulty::Difficult,
            price: 13500.0,
            max_group_size: 10,
            images: list(&["https://images.trekbooking.in/hampta.jpg"]),
            included: list(&["Tents", "Meals", "Guide", "Chandratal visit"]),
            excluded: list(&["Travel to Manali", "Insurance"]),
            itinerary: vec![
                day(1, "Manali to Chika", "Drive to Jobra and walk to Chika.", &["Drive", "Trek"]),
                day(2, "Chika to Balu Ka Ghera", "Follow the Rani Nallah.", &["Trek", "River crossing"]),
                day(3, "Cross Hampta Pass", "Climb to the pass and descend to Shea Goru.", &["Pass crossing"]),
                day(4, "Shea Goru to Chatru", "Descend into Lahaul.", &["Trek"]),
                day(5, "Chandratal and back to Manali", "Visit the moon lake and return.", &["Drive", "Sightseeing"]),
            ],
        },
        PackageDraft {
            title: "Triund Weekend".to_string(),
            description: "Ridge walk above McLeod Ganj with the Dhauladhar wall at sunrise.".to_string(),
            location: "Himachal Pradesh".to_string(),
            duration: 2,
            difficulty: Difficulty::Easy,
            price: 3500.0,
            max_group_size: 15,
            images: list(&["https://images.trekbooking.in/triund.jpg"]),
            included: list(&["Tents", "Dinner and breakfast", "Guide"]),
            excluded: list(&["Travel to McLeod Ganj"]),
            itinerary: vec![
                day(1, "McLeod Ganj to Triund", "Climb via Galu Devi temple to the ridge.", &["Trek", "Sunset"]),
                day(2, "Triund to McLeod Ganj", "Sunrise over the Dhauladhar and descent.", &["Sunrise", "Trek"]),
            ],
        },
    ]
}

fn confirmation_templates() -> Vec<MessageTemplate> {
    let now = Local::now().naive_local();
    let mut templates = vec![
        MessageTemplate {
            id: uuid::Uuid::new_v4().to_string(),
            channel: ChannelKind::Whatsapp,
            name: "Booking Confirmation".to_string(),
            subject: None,
            content: "Hi {{userName}}! Your booking for {{packageTitle}} ({{location}}) is confirmed. \
                      Start: {{startDate}}, {{duration}} days, {{groupSize}} trekkers. \
                      Total: {{totalAmount}}. Reference: {{bookingReference}}"
                .to_string(),
            variables: Vec::new(),
            is_active: true,
            created_at: now,
        },
        MessageTemplate {
            id: uuid::Uuid::new_v4().to_string(),
            channel: ChannelKind::Email,
            name: "Booking Confirmation".to_string(),
            subject: Some("Booking Confirmed - {{packageTitle}}".to_string()),
            content: "Dear {{userName}},\n\n\
                      Your trek {{packageTitle}} in {{location}} is confirmed.\n\
                      Start date: {{startDate}}\n\
                      Duration: {{duration}} days\n\
                      Group size: {{groupSize}}\n\
                      Total amount: {{totalAmount}}\n\
                      Booking reference: {{bookingReference}}\n\n\
                      Confirmed on {{confirmationDate}}."
                .to_string(),
            variables: Vec::new(),
            is_active: true,
            created_at: now,
        },
    ];
    for template in &mut templates {
        let subject = template.subject.clone().unwrap_or_default();
        template.variables = TemplateRenderer::placeholders(&format!("{} {}", subject, template.content));
    }
    templates
}
