//! CRM (practice management) integration.

pub mod client;

pub use client::CrmClient;
