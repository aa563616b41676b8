pub mod imputed;
pub mod output;
pub mod records;

pub use imputed::*;
pub use output::*;
pub use records::*;
