pub mod datastar;

pub use datastar::{FragmentRequest, DATASTAR_REQUEST_HEADER};
