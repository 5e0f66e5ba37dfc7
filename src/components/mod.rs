pub mod dialog;
pub mod editor;
pub mod search;
pub mod status_bar;
pub mod tree;
