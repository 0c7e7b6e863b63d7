pub mod application_service;
pub mod contract_service;
pub mod contract_state;
pub mod error;
pub mod fees;
pub mod notification_service;
