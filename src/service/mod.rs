pub mod record;
pub mod repository;
pub mod validation;

pub use record::{parse_form, project_rows, FormMode, Record};
pub use repository::{Row, RowRepository};
pub use validation::RequestValidator;
