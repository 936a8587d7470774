// ==========================================
// 徒步旅行预订系统 - 通知渠道
// ==========================================
// 未接入真实服务商：模拟渠道校验收件人、
// 记录消息内容并返回成功
// ==========================================

use crate::auth::validation::is_valid_email;
use crate::domain::message::OutgoingMessage;
use crate::domain::types::ChannelKind;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait MessageChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// 将一条消息交给服务商
    ///
    /// # 返回
    /// - Ok(()): 服务商已接收
    /// - Err(reason): 被拒绝，原因写入消息日志
    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), String>;
}

// ==========================================
// SimulatedWhatsAppChannel - 模拟 WhatsApp 渠道
// ==========================================
pub struct SimulatedWhatsAppChannel {
    latency: Duration,
}

impl SimulatedWhatsAppChannel {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedWhatsAppChannel {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

/// 10 到 15 位数字，可带前导 '+'
fn is_valid_msisdn(to: &str) -> bool {
    let digits = to.strip_prefix('+').unwrap_or(to);
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[async_trait]
impl MessageChannel for SimulatedWhatsAppChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Whatsapp
    }

    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), String> {
        if !is_valid_msisdn(message.to.trim()) {
            return Err(format!("invalid WhatsApp number: {}", message.to));
        }
        if message.body.trim().is_empty() {
            return Err("empty message body".to_string());
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        tracing::info!(
            target: "messaging",
            channel = "whatsapp",
            to = %message.to,
            booking_id = %message.booking_id,
            chars = message.body.chars().count(),
            "whatsapp message sent (simulated)"
        );
        Ok(())
    }
}

// ==========================================
// SimulatedEmailChannel - 模拟邮件渠道
// ==========================================
pub struct SimulatedEmailChannel {
    latency: Duration,
}

impl SimulatedEmailChannel {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedEmailChannel {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl MessageChannel for SimulatedEmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), String> {
        if !is_valid_email(message.to.trim()) {
            return Err(format!("invalid email address: {}", message.to));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        tracing::info!(
            target: "messaging",
            channel = "email",
            to = %message.to,
            subject = message.subject.as_deref().unwrap_or(""),
            booking_id = %message.booking_id,
            "email sent (simulated)"
        );
        Ok(())
    }
}
