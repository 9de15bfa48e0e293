//! Table view: filtering, sorting, paging and the full-page/fragment render adapter.

pub mod filter;
pub mod render;
pub mod sort;
pub mod table;
pub mod templates;

pub use filter::{filter, Filter, FilterSpec};
pub use render::{fragments_response, Fragment, MergeMode, Renderer};
pub use sort::{paginate, sort, Page, SortSpec};
pub use table::{effective_sort, list_params, render, table_context, ListQuery, TableContext};
