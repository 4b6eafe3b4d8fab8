pub mod configuration;
pub mod dispatcher;
pub mod domain;
pub mod messaging_client;
pub mod relay_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
