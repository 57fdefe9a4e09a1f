pub mod newsletter_subscribe;

pub use newsletter_subscribe::newsletter_subscribe;
