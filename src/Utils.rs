/// Loading of pH adjustment tasks (model, pKa library, settings) from JSON files.
pub mod load_from_file;
