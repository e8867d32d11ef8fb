pub mod sevencloud;
pub mod stripe;
pub mod twilio;
pub mod turnstile;

pub use sevencloud::*;
pub use stripe::*;
pub use twilio::*;
pub use turnstile::*;