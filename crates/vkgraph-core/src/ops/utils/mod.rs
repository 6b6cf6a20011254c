pub mod dim;
