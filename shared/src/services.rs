pub mod cognito_service;
pub mod oauth_service;
pub mod template_service;

pub use cognito_service::*;
pub use oauth_service::*;
pub use template_service::*;
