// Domain layer - observation model, statistics and projections
pub mod domains;
pub mod error;
pub mod event;
pub mod forecast;
pub mod model;
pub mod observable;
pub mod plot;
pub mod stats;
pub mod value;
