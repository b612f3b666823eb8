pub mod errors;
pub mod routes;
pub mod startup;
pub mod state;
pub mod variant;

pub use startup::run;
pub use variant::ServiceVariant;
