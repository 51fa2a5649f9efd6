// Application layer - use cases and ports
pub mod observation_repository;
pub mod observation_service;
pub mod state_source;
