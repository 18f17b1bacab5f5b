//! slp-render - Library for rendering SLP sprite frames
//!
//! This library provides functionality to:
//! - Parse SLP sprite containers and JASC-PAL palettes
//! - Render frames to RGBA with player colors, shadows and outlines
//! - Export every frame of a container to numbered PNG files
//! - Report a container's header and frame table

pub mod alpha;
pub mod cli;
pub mod config;
pub mod export;
pub mod inspect;
pub mod models;
pub mod output;
pub mod palette;
pub mod palettes;
pub mod player;
pub mod progress;
pub mod renderer;
pub mod slp;
pub mod source;
