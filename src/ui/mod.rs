pub mod browser;
pub mod detail_dialog;
pub mod edit_dialog;
pub mod gallery;
pub mod timezone_selector;
pub mod window;
