//! External system adapters behind the core ports.

pub mod crm;
pub mod google;
