/// Sources de lots d'images pour lumeq (dossier, archive zip, synthétique).

pub mod folder_batch;
pub mod image;
pub mod resize;
pub mod synthetic;
pub mod zip_batch;

pub use folder_batch::FolderSource;
pub use synthetic::SyntheticSource;
pub use zip_batch::ZipSource;
