pub mod admin;
pub mod auth;
pub mod cart;
pub mod common;
pub mod contact;
pub mod memorial;
pub mod pagination;
pub mod payment;
pub mod qr_code;
pub mod reference;
pub mod worker;

pub use admin::*;
pub use auth::*;
pub use cart::*;
pub use common::*;
pub use contact::*;
pub use memorial::*;
pub use pagination::*;
pub use payment::*;
pub use qr_code::*;
pub use reference::*;
pub use worker::*;
