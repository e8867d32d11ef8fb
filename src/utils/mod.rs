pub mod jwt;
pub mod phone;
pub mod password;
pub mod member_code;
pub mod code_generator;

pub use jwt::*;
pub use phone::*;
pub use password::*;
pub use member_code::{generate_unique_member_code, generate_unique_referral_code, generate_unique_discount_code};
pub use code_generator::generate_six_digit_code;
