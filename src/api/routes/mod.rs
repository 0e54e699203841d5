pub mod monitor;
pub mod notifications;
pub mod rankings;
