pub mod docs;

pub use docs::{openapi_document, swagger_ui, ApiDoc, DOCS_PATH, OPENAPI_PATH};
