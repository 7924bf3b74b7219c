pub mod alert_monitor;
pub mod alerts_service;
pub mod price_lookup;
pub mod stockdata;
pub mod stocknews;
