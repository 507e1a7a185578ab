pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use error::ArticleError;
pub use model::*;
pub use repository::ArticleRepository;
pub use service::ArticleService;
