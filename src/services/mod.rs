pub mod notes;

pub use notes::NotesService;
