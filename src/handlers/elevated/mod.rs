// handlers/elevated/mod.rs - admin-only handlers (/api/root/*)
//
// Routed behind the admin gate middleware on top of the usual principal
// extraction, so every handler here can assume an admin caller.

pub mod root;

pub use root::*;
