pub mod availability;
pub mod booking_locks;
pub mod credit_service;
pub mod reservation_service;
pub mod slot_service;
pub mod time_range;
