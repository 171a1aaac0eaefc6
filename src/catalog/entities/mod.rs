pub mod file_entry;

pub use file_entry::Entity as File;
pub use file_entry::{ActiveModel as FileActiveModel, Model as FileModel};
