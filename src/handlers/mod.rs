// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) -> Protected (session resolved, then role gate per route group).
// Routing and the gate layers live in lib.rs; handlers only see an already-admitted session.

pub mod protected; // /api/*, role-gated
pub mod public; // /auth/*, no authentication
