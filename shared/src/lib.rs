pub mod config;
pub mod errors;
pub mod models;
pub mod redirect;
pub mod response;
pub mod services;
pub mod templates;
pub mod utils;
pub mod validation;

pub use config::*;
pub use errors::*;
pub use models::*;
pub use redirect::*;
pub use response::*;
pub use services::*;
pub use templates::*;
pub use utils::*;
pub use validation::*;
