// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and the one-time owner bootstrap. Inputs here come from anonymous
// callers, so every field is validated by the account service before anything is written.

pub mod auth;
