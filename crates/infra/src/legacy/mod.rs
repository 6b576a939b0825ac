//! Legacy (SHOficina) store access

mod powershell;
pub mod script;

pub use powershell::PowerShellReader;
