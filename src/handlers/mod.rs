// handlers/mod.rs - HTTP handlers
//
// root:  service index, health check, fallback 404
// tasks: CRUD over the tasks resource, validated against the task projections
pub mod root;
pub mod tasks;
