pub mod appointment;
pub mod dashboard;
pub mod event;
pub mod tariff;
