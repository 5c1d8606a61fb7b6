//! Reporter module for output formatting

pub mod html;

pub use html::HtmlReporter;
