pub mod audio;
pub mod track;
