use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

use crate::game::NUM_CELLS;

/// Action-value network for Reversi.
///
/// ```text
/// Input:   [batch, 8, 8]  (mover = +1, opponent = -1)
/// Flatten: 64
/// Hidden:  hidden_layers x (Linear -> units, ReLU)
/// Output:  Linear -> 64  (Q-values, one per cell)
/// ```
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct QNetworkConfig {
    #[config(default = 2)]
    pub hidden_layers: usize,
    #[config(default = 24)]
    pub units: usize,
}

impl QNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        let mut hidden = Vec::with_capacity(self.hidden_layers);
        let mut inputs = NUM_CELLS;
        for _ in 0..self.hidden_layers {
            hidden.push(LinearConfig::new(inputs, self.units).init(device));
            inputs = self.units;
        }
        QNetwork {
            hidden,
            output: LinearConfig::new(inputs, NUM_CELLS).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass: input [batch, 8, 8] -> output [batch, 64] Q-values.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let batch_size = input.dims()[0];

        let mut x = input.reshape([batch_size as i32, NUM_CELLS as i32]);
        for layer in &self.hidden {
            x = self.relu.forward(layer.forward(x));
        }
        self.output.forward(x)
    }
}
