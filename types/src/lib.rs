pub mod api;
pub mod combined;
pub mod containers;
pub mod nonstandard;
pub mod primitives;
pub mod uint256;
