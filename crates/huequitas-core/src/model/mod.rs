mod chat;
mod restaurant;
mod review;
mod session;


pub use chat::*;
pub use restaurant::*;
pub use review::*;
pub use session::*;
