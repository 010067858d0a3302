pub mod mailer;
pub mod qr_renderer;
pub mod stripe;

pub use self::mailer::*;
pub use self::qr_renderer::*;
pub use self::stripe::*;
