// Library half of the instalock binary; the CLI in main.rs is a thin shell over it
pub mod commands;
