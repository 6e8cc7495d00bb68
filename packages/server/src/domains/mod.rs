pub mod binder;
pub mod catalog;
pub mod scraping;
pub mod searches;
