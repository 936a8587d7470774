// ==========================================
// 徒步旅行预订系统 - 消息
// ==========================================
// 渠道: 异步 MessageChannel trait（模拟 WhatsApp / 邮件）
// 服务: 预订确认、消息日志、重发
// ==========================================

pub mod channel;
pub mod error;
pub mod service;

pub use channel::{MessageChannel, SimulatedEmailChannel, SimulatedWhatsAppChannel};
pub use error::{MessagingError, MessagingResult};
pub use service::{ConfirmationOutcome, MessagingService};
