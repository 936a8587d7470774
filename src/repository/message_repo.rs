// ==========================================
// 徒步旅行预订系统 - 消息仓储
// ==========================================
// 表: message_templates、message_logs
// ==========================================

use crate::db::{format_datetime, parse_datetime_column, parse_enum_column, parse_string_list_column};
use crate::domain::message::{MessageLog, MessageTemplate};
use crate::domain::types::ChannelKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const TEMPLATE_COLUMNS: &str =
    "id, channel, name, subject, content, variables_json, is_active, created_at";
const LOG_COLUMNS: &str = "id, booking_id, channel, recipient, subject, content, status, \
     error_message, sent_at, delivered_at";

pub struct MessageRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MessageRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 模板 =====

    pub fn insert_template(&self, template: &MessageTemplate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO message_templates ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                TEMPLATE_COLUMNS
            ),
            params![
                template.id,
                template.channel.as_str(),
                template.name,
                template.subject,
                template.content,
                serde_json::to_string(&template.variables)?,
                template.is_active,
                format_datetime(template.created_at),
            ],
        )?;
        Ok(())
    }

    /// 启用中的模板（可限定渠道），按创建时间倒序
    pub fn list_active_templates(&self, channel: Option<ChannelKind>) -> RepositoryResult<Vec<MessageTemplate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM message_templates
             WHERE is_active = 1 AND (?1 IS NULL OR channel = ?1)
             ORDER BY created_at DESC, rowid DESC",
            TEMPLATE_COLUMNS
        ))?;
        let templates = stmt
            .query_map(params![channel.map(|c| c.as_str())], map_template_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    /// 指定渠道与名称下最新的启用模板
    pub fn find_active_template(&self, channel: ChannelKind, name: &str) -> RepositoryResult<Option<MessageTemplate>> {
        let conn = self.get_conn()?;
        let template = conn
            .query_row(
                &format!(
                    "SELECT {} FROM message_templates
                     WHERE is_active = 1 AND channel = ?1 AND name = ?2
                     ORDER BY created_at DESC, rowid DESC LIMIT 1",
                    TEMPLATE_COLUMNS
                ),
                params![channel.as_str(), name],
                map_template_row,
            )
            .optional()?;
        Ok(template)
    }

    // ===== 日志 =====

    pub fn insert_log(&self, log: &MessageLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO message_logs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                LOG_COLUMNS
            ),
            params![
                log.id,
                log.booking_id,
                log.channel.as_str(),
                log.recipient,
                log.subject,
                log.content,
                log.status.as_str(),
                log.error_message,
                format_datetime(log.sent_at),
                log.delivered_at.map(format_datetime),
            ],
        )?;
        Ok(())
    }

    pub fn find_log(&self, id: &str) -> RepositoryResult<Option<MessageLog>> {
        let conn = self.get_conn()?;
        let log = conn
            .query_row(
                &format!("SELECT {} FROM message_logs WHERE id = ?1", LOG_COLUMNS),
                params![id],
                map_log_row,
            )
            .optional()?;
        Ok(log)
    }

    /// 单个预订的消息日志，按时间倒序
    pub fn list_logs_by_booking(&self, booking_id: &str) -> RepositoryResult<Vec<MessageLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM message_logs WHERE booking_id = ?1 ORDER BY sent_at DESC, rowid DESC",
            LOG_COLUMNS
        ))?;
        let logs = stmt
            .query_map(params![booking_id], map_log_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}

fn map_template_row(row: &Row) -> rusqlite::Result<MessageTemplate> {
    Ok(MessageTemplate {
        id: row.get(0)?,
        channel: parse_enum_column(1, &row.get::<_, String>(1)?)?,
        name: row.get(2)?,
        subject: row.get(3)?,
        content: row.get(4)?,
        variables: parse_string_list_column(5, &row.get::<_, String>(5)?)?,
        is_active: row.get(6)?,
        created_at: parse_datetime_column(7, &row.get::<_, String>(7)?)?,
    })
}

fn map_log_row(row: &Row) -> rusqlite::Result<MessageLog> {
    let delivered_at = match row.get::<_, Option<String>>(9)? {
        Some(raw) => Some(parse_datetime_column(9, &raw)?),
        None => None,
    };
    Ok(MessageLog {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        channel: parse_enum_column(2, &row.get::<_, String>(2)?)?,
        recipient: row.get(3)?,
        subject: row.get(4)?,
        content: row.get(5)?,
        status: parse_enum_column(6, &row.get::<_, String>(6)?)?,
        error_message: row.get(7)?,
        sent_at: parse_datetime_column(8, &row.get::<_, String>(8)?)?,
        delivered_at,
    })
}
