//! Outbound adapters implementing the domain ports.

pub mod mailer;
pub mod memory;
pub mod persistence;
pub mod storage;
pub mod whatsapp;
