pub mod field_chooser;

pub use field_chooser::FieldChooser;
