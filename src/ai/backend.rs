//! Numeric backend selection. The `wgpu` feature moves inference and
//! training onto the GPU; the default is the CPU `ndarray` backend.

use burn::backend::Autodiff;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu<f32, i32>;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray<f32>;

pub type TrainBackend = Autodiff<InferBackend>;

pub type Device = <InferBackend as burn::prelude::Backend>::Device;
