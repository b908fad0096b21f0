use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::{BoardView, BOARD_SIZE, NUM_CELLS};

/// Encode a single perspective-signed board as a tensor of shape [1, 8, 8].
pub fn encode_view<B: Backend>(view: &BoardView, device: &B::Device) -> Tensor<B, 3> {
    let data = view.to_flat();
    Tensor::<B, 1>::from_data(TensorData::from(data.as_slice()), device)
        .reshape([1, BOARD_SIZE as i32, BOARD_SIZE as i32])
}

/// Encode multiple boards as a batched tensor of shape [batch, 8, 8].
pub fn encode_views_batch<'a, B, I>(views: I, device: &B::Device) -> Tensor<B, 3>
where
    B: Backend,
    I: IntoIterator<Item = &'a BoardView>,
{
    let mut flat = Vec::new();
    let mut batch_size = 0;
    for view in views {
        flat.extend_from_slice(&view.to_flat());
        batch_size += 1;
    }
    debug_assert_eq!(flat.len(), batch_size * NUM_CELLS);
    Tensor::<B, 1>::from_data(TensorData::from(flat.as_slice()), device)
        .reshape([batch_size as i32, BOARD_SIZE as i32, BOARD_SIZE as i32])
}
