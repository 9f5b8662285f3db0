//! Cartesian Gaussian basis functions and the molecular integrals over them.

pub mod basis;
pub mod cgto;
pub mod eri;
pub mod error;
pub mod gto;
pub mod helper;
pub mod library;
