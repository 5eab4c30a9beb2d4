pub mod availability;
pub mod block;
pub mod credit;
pub mod health;
pub mod pricing;
pub mod reservation;
pub mod slot;
pub mod template;
pub mod user;
