//! gridpaint - draw an image on an on-screen pixel canvas by clicking.
//!
//! The canvas grid and the color palette are found in screen captures, the
//! image is quantized to the grid and matched against the palette, and the
//! pointer is driven cell by cell while a global key listener can pause or
//! stop the run. This library exposes the modules for integration testing.

pub mod error;
pub mod models;
pub mod services;
pub mod vision;
