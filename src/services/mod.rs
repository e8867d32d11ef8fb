pub mod auth_service;
pub mod user_service;
pub mod order_service;
pub mod discount_code_service;
pub mod recharge_service;
pub mod sync_service;
pub mod membership_service;
pub mod monthly_card_service;
pub mod stripe_transaction_service;

pub use auth_service::*;
pub use user_service::*;
pub use order_service::*;
pub use discount_code_service::*;
pub use recharge_service::*;
pub use sync_service::*;
