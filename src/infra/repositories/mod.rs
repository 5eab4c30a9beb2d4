pub mod sqlite_user_repo;
pub mod sqlite_block_repo;
pub mod sqlite_slot_repo;
pub mod sqlite_template_repo;
pub mod sqlite_reservation_repo;
pub mod sqlite_credit_repo;
pub mod sqlite_pricing_repo;

pub mod postgres_user_repo;
pub mod postgres_block_repo;
pub mod postgres_slot_repo;
pub mod postgres_template_repo;
pub mod postgres_reservation_repo;
pub mod postgres_credit_repo;
pub mod postgres_pricing_repo;
