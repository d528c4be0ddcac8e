// One module per route group. Each exposes `routes(state)`, which mounts its
// endpoints, authentication and per-endpoint authorization rules.
pub mod check;
pub mod condition;
pub mod patient;
pub mod product;
pub mod region;
pub mod role;
pub mod user;
