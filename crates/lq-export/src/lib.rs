/// Écriture des résultats d'une session lumeq : images PNG et rapport JSON.

pub mod report;
pub mod writer;

pub use report::{summary_lines, write_report};
pub use writer::write_normalized;
