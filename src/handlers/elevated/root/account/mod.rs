// handlers/elevated/root/account/mod.rs

pub mod bind;

pub use bind::account_bind;
