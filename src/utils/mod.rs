pub mod read_file;
pub mod script_var;
pub mod write_file;
