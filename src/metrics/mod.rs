pub mod exposition;
pub mod instances;
pub mod schema;
