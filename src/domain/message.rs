// ==========================================
// 徒步旅行预订系统 - 消息领域模型
// ==========================================
// 带 {{variable}} 占位符的模板与投递日志
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ChannelKind, DeliveryStatus};

/// 预订确认时查找的模板名
pub const BOOKING_CONFIRMATION_TEMPLATE: &str = "Booking Confirmation";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: String,
    pub channel: ChannelKind,
    pub name: String,
    pub subject: Option<String>, // 仅邮件
    pub content: String,
    pub variables: Vec<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// 渲染完成、待交给渠道发送的消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub channel: ChannelKind,
    pub to: String,
    pub subject: Option<String>,
    pub body: String,
    pub booking_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLog {
    pub id: String,
    pub booking_id: String,
    pub channel: ChannelKind,
    pub recipient: String,
    pub subject: Option<String>,
    pub content: String,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub sent_at: NaiveDateTime,
    pub delivered_at: Option<NaiveDateTime>,
}

impl MessageLog {
    /// 记录一次投递尝试的结果
    pub fn from_attempt(message: &OutgoingMessage, outcome: Result<(), String>) -> Self {
        let now = chrono::Local::now().naive_local();
        let (status, error_message, delivered_at) = match outcome {
            Ok(()) => (DeliveryStatus::Sent, None, Some(now)),
            Err(e) => (DeliveryStatus::Failed, Some(e), None),
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: message.booking_id.clone(),
            channel: message.channel,
            recipient: message.to.clone(),
            subject: message.subject.clone(),
            content: message.body.clone(),
            status,
            error_message,
            sent_at: now,
            delivered_at,
        }
    }

    /// 重建消息用于重发
    pub fn to_outgoing(&self) -> OutgoingMessage {
        OutgoingMessage {
            channel: self.channel,
            to: self.recipient.clone(),
            subject: self.subject.clone(),
            body: self.content.clone(),
            booking_id: self.booking_id.clone(),
        }
    }
}
