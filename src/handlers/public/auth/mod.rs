// handlers/public/auth/mod.rs - token acquisition endpoints

pub mod login;

pub use login::login_post;
