// handlers/mod.rs - 3-tier handler architecture
//
// Public (no auth) → Protected (JWT auth) → Elevated (admin JWT auth)

pub mod elevated; // Tier 3: admin role required (/api/root/*)
pub mod protected; // Tier 2: JWT authentication required (/api/*)
pub mod public; // Tier 1: no authentication required (/auth/*, /health)
