// ==========================================
// 徒步旅行预订系统 - 消息服务
// ==========================================
// 通过 WhatsApp 与邮件发送预订确认，记录消息日志，支持重发
// 每次投递尝试无论成败都写入 message_logs
// ==========================================

use crate::config::ConfigManager;
use crate::domain::booking::BookingWithDetails;
use crate::domain::message::{MessageLog, MessageTemplate, OutgoingMessage, BOOKING_CONFIRMATION_TEMPLATE};
use crate::domain::types::{ChannelKind, DeliveryStatus};
use crate::engine::TemplateRenderer;
use crate::i18n::t;
use crate::messaging::channel::{MessageChannel, SimulatedEmailChannel, SimulatedWhatsAppChannel};
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::repository::{BookingRepository, MessageRepository};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// 一次确认发送写入的日志。`None` 表示该渠道被跳过
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmationOutcome {
    pub whatsapp: Option<MessageLog>,
    pub email: Option<MessageLog>,
}

impl ConfirmationOutcome {
    pub fn all_sent(&self) -> bool {
        [&self.whatsapp, &self.email]
            .iter()
            .filter_map(|l| l.as_ref())
            .all(|l| l.status == DeliveryStatus::Sent)
    }
}

pub struct MessagingService {
    message_repo: Arc<MessageRepository>,
    booking_repo: Arc<BookingRepository>,
    config: Arc<ConfigManager>,
    whatsapp: Arc<dyn MessageChannel>,
    email: Arc<dyn MessageChannel>,
}

impl MessagingService {
    /// 使用模拟渠道的服务
    pub fn new(
        message_repo: Arc<MessageRepository>,
        booking_repo: Arc<BookingRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self::with_channels(
            message_repo,
            booking_repo,
            config,
            Arc::new(SimulatedWhatsAppChannel::default()),
            Arc::new(SimulatedEmailChannel::default()),
        )
    }

    pub fn with_channels(
        message_repo: Arc<MessageRepository>,
        booking_repo: Arc<BookingRepository>,
        config: Arc<ConfigManager>,
        whatsapp: Arc<dyn MessageChannel>,
        email: Arc<dyn MessageChannel>,
    ) -> Self {
        Self {
            message_repo,
            booking_repo,
            config,
            whatsapp,
            email,
        }
    }

    fn channel_for(&self, kind: ChannelKind) -> &Arc<dyn MessageChannel> {
        match kind {
            ChannelKind::Whatsapp => &self.whatsapp,
            ChannelKind::Email => &self.email,
        }
    }

    fn channel_enabled(&self, kind: ChannelKind) -> MessagingResult<bool> {
        let enabled = match kind {
            ChannelKind::Whatsapp => self.config.whatsapp_enabled(),
            ChannelKind::Email => self.config.email_enabled(),
        };
        enabled.map_err(|e| MessagingError::Config(e.to_string()))
    }

    /// 启用中的模板，按创建时间倒序
    pub fn get_message_templates(&self, channel: Option<ChannelKind>) -> MessagingResult<Vec<MessageTemplate>> {
        Ok(self.message_repo.list_active_templates(channel)?)
    }

    /// 替换 `template` 中的每个 `{{key}}`
    pub fn process_message_template(template: &str, variables: &HashMap<String, String>) -> String {
        TemplateRenderer::render(template, variables)
    }

    /// 预订确认消息的模板变量
    pub fn confirmation_variables(
        details: &BookingWithDetails,
        currency_symbol: &str,
        today: NaiveDate,
    ) -> HashMap<String, String> {
        let booking = &details.booking;
        let mut vars = HashMap::new();
        vars.insert("userName".to_string(), details.user.name.clone());
        vars.insert("packageTitle".to_string(), details.package.title.clone());
        vars.insert("location".to_string(), details.package.location.clone());
        vars.insert("startDate".to_string(), TemplateRenderer::long_date(booking.start_date));
        vars.insert("duration".to_string(), details.package.duration.to_string());
        vars.insert("groupSize".to_string(), booking.group_size.to_string());
        vars.insert(
            "totalAmount".to_string(),
            TemplateRenderer::money(currency_symbol, booking.total_amount),
        );
        vars.insert("bookingReference".to_string(), booking.booking_reference.clone());
        vars.insert("confirmationDate".to_string(), TemplateRenderer::short_date(today));
        vars
    }

    /// 投递一条消息并记录本次尝试
    pub async fn send(&self, message: OutgoingMessage) -> MessagingResult<MessageLog> {
        let outcome = if self.channel_enabled(message.channel)? {
            self.channel_for(message.channel).deliver(&message).await
        } else {
            Err(format!("{} channel is disabled", message.channel))
        };

        if let Err(reason) = &outcome {
            tracing::warn!(
                channel = %message.channel,
                booking_id = %message.booking_id,
                reason = %reason,
                "message delivery failed"
            );
        }

        let log = MessageLog::from_attempt(&message, outcome);
        self.message_repo.insert_log(&log)?;
        Ok(log)
    }

    /// 通过所有适用渠道发送预订确认
    ///
    /// 客户有手机号且存在 WhatsApp 模板时发送 WhatsApp；
    /// 存在邮件模板时发送邮件。已禁用的渠道跳过。
    /// 两个渠道并发执行
    pub async fn send_booking_confirmation(&self, booking_id: &str) -> MessagingResult<ConfirmationOutcome> {
        let details = self
            .booking_repo
            .find_detailed(booking_id)?
            .ok_or_else(|| MessagingError::BookingNotFound(booking_id.to_string()))?;

        let currency = self
            .config
            .currency_symbol()
            .map_err(|e| MessagingError::Config(e.to_string()))?;
        let today = chrono::Local::now().date_naive();
        let vars = Self::confirmation_variables(&details, &currency, today);

        let whatsapp_message = match details.user.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() && self.channel_enabled(ChannelKind::Whatsapp)? => self
                .message_repo
                .find_active_template(ChannelKind::Whatsapp, BOOKING_CONFIRMATION_TEMPLATE)?
                .map(|template| OutgoingMessage {
                    channel: ChannelKind::Whatsapp,
                    to: phone.to_string(),
                    subject: None,
                    body: TemplateRenderer::render(&template.content, &vars),
                    booking_id: details.booking.id.clone(),
                }),
            _ => None,
        };

        let email_message = if self.channel_enabled(ChannelKind::Email)? {
            self.message_repo
                .find_active_template(ChannelKind::Email, BOOKING_CONFIRMATION_TEMPLATE)?
                .map(|template| {
                    let subject = template
                        .subject
                        .clone()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| t("notify.default_subject"));
                    OutgoingMessage {
                        channel: ChannelKind::Email,
                        to: details.user.email.clone(),
                        subject: Some(TemplateRenderer::render(&subject, &vars)),
                        body: TemplateRenderer::render(&template.content, &vars),
                        booking_id: details.booking.id.clone(),
                    }
                })
        } else {
            None
        };

        let whatsapp_fut = async {
            match whatsapp_message {
                Some(m) => Some(self.send(m).await),
                None => None,
            }
        };
        let email_fut = async {
            match email_message {
                Some(m) => Some(self.send(m).await),
                None => None,
            }
        };
        let (whatsapp, email) = futures::join!(whatsapp_fut, email_fut);

        let outcome = ConfirmationOutcome {
            whatsapp: whatsapp.transpose()?,
            email: email.transpose()?,
        };
        tracing::info!(
            booking_id,
            whatsapp = outcome.whatsapp.as_ref().map(|l| l.status.as_str()).unwrap_or("skipped"),
            email = outcome.email.as_ref().map(|l| l.status.as_str()).unwrap_or("skipped"),
            "booking confirmation processed"
        );
        Ok(outcome)
    }

    /// 预订的消息日志，按时间倒序
    pub fn get_booking_message_logs(&self, booking_id: &str) -> MessagingResult<Vec<MessageLog>> {
        Ok(self.message_repo.list_logs_by_booking(booking_id)?)
    }

    /// 通过原渠道重发失败的消息
    ///
    /// # 返回
    /// 新一次尝试投递成功时返回 true。每次尝试单独记一行日志
    pub async fn retry_failed_message(&self, log_id: &str) -> MessagingResult<bool> {
        let log = self
            .message_repo
            .find_log(log_id)?
            .ok_or_else(|| MessagingError::LogNotFound(log_id.to_string()))?;
        if log.status == DeliveryStatus::Sent {
            return Err(MessagingError::AlreadyDelivered(log_id.to_string()));
        }
        let retried = self.send(log.to_outgoing()).await?;
        Ok(retried.status == DeliveryStatus::Sent)
    }
}
