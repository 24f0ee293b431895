//! WhatsApp delivery adapter.

pub mod dto;
pub mod http_sender;

pub use http_sender::{HttpWhatsAppSender, WhatsAppConfig};
