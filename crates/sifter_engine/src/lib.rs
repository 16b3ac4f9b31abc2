//! Sifter engine: the page model, the load-more capability and the HTTP
//! plumbing behind it.
mod driver;
mod error;
mod fetch;
mod page;

pub use driver::{HtmlPageDriver, LoadMoreReport, MoreSource, PageDriver, ScriptedMoreSource};
pub use error::SiftError;
pub use fetch::{fetch_listing, FetchSettings, HttpMoreSource};
pub use page::{MergeReport, ProductEntry, ProductPage};
