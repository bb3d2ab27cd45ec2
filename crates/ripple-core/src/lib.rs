//! Platform-free core of the video ripple effect.
//!
//! Holds the wave solver, the compositing reference, the effect lifecycle and
//! the backend seam. Nothing here touches a browser or GPU API directly; the
//! web and native frontends plug a `wgpu` backend in, tests plug in
//! [`CpuBackend`].

pub mod backend;
pub mod composite;
pub mod config;
pub mod constants;
pub mod cpu;
pub mod effect;
pub mod grid;
pub mod init;
pub mod pingpong;
pub mod pointer;
pub mod sim;
pub mod uniforms;

pub use backend::*;
pub use composite::{caustics, composite, shade, VideoFrame};
pub use config::*;
pub use constants::*;
pub use cpu::{Call, CpuBackend, CpuPrograms, CpuTarget, CpuTexture, HandleId, VideoFeed};
pub use effect::*;
pub use grid::*;
pub use init::*;
pub use pingpong::PingPong;
pub use pointer::*;
pub use sim::{step, StepReport, Texel, WaveField};
pub use uniforms::*;
