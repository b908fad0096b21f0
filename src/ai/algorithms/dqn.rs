use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::TensorData;
use rand::rngs::StdRng;

use crate::ai::agent::{Policy, RewardMode, Transition};
use crate::ai::backend::{Device, InferBackend, TrainBackend};
use crate::ai::networks::{QNetwork, QNetworkConfig};
use crate::ai::state_encoding::{encode_view, encode_views_batch};
use crate::error::CheckpointError;
use crate::game::{ActionValues, BoardView, GameState, NUM_CELLS};
use crate::training::replay_buffer::ReplayBuffer;

/// A learner shared between seats. Seats act strictly in turn order, so a
/// single-threaded `RefCell` is all the coordination needed.
pub type SharedLearner = Rc<RefCell<DqnLearner>>;

/// DQN hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon: f64,
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub sync_every: usize,
    pub hidden_layers: usize,
    pub units: usize,
    pub reward_mode: RewardMode,
}

impl Default for DqnConfig {
    fn default() -> Self {
        DqnConfig {
            learning_rate: 0.01,
            gamma: 1.0,
            epsilon: 0.1,
            batch_size: 1000,
            replay_capacity: 20_000,
            sync_every: 300,
            hidden_layers: 2,
            units: 24,
            reward_mode: RewardMode::EveryStep,
        }
    }
}

impl DqnConfig {
    pub fn network_config(&self) -> QNetworkConfig {
        QNetworkConfig::new()
            .with_hidden_layers(self.hidden_layers)
            .with_units(self.units)
    }
}

/// Online + target networks, replay buffer, and Adam optimizer.
///
/// Only the online network is trained; the target network changes only
/// through [`DqnLearner::sync_target`].
pub struct DqnLearner {
    q_network: QNetwork<TrainBackend>,
    target_network: QNetwork<InferBackend>,
    optimizer: OptimizerAdaptor<Adam, QNetwork<TrainBackend>, TrainBackend>,
    replay_buffer: ReplayBuffer<Transition>,
    net_config: QNetworkConfig,
    learning_rate: f64,
    gamma: f32,
    device: Device,
    update_count: usize,
    sync_count: usize,
    rng: StdRng,
}

impl DqnLearner {
    pub fn new(config: &DqnConfig, rng: StdRng) -> Self {
        let device = Device::default();
        let net_config = config.network_config();
        let q_network: QNetwork<TrainBackend> = net_config.init(&device);
        let target_network = q_network.valid();
        let optimizer = AdamConfig::new().init();

        DqnLearner {
            q_network,
            target_network,
            optimizer,
            replay_buffer: ReplayBuffer::new(config.replay_capacity),
            net_config,
            learning_rate: config.learning_rate,
            gamma: config.gamma,
            device,
            update_count: 0,
            sync_count: 0,
            rng,
        }
    }

    pub fn into_shared(self) -> SharedLearner {
        Rc::new(RefCell::new(self))
    }

    /// Store a transition. An evicted transition is dropped here.
    pub fn remember(&mut self, transition: Transition) {
        let _evicted = self.replay_buffer.append(transition);
    }

    pub fn replay_len(&self) -> usize {
        self.replay_buffer.len()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.replay_buffer.iter()
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    pub fn sync_count(&self) -> usize {
        self.sync_count
    }

    /// Copy the online network's parameters into the target network.
    pub fn sync_target(&mut self) {
        self.target_network = self.q_network.valid();
        self.sync_count += 1;
        log::debug!("target network synced ({} syncs)", self.sync_count);
    }

    /// Q-values of the target network, used for bootstrapped targets.
    pub fn target_values(&self, view: &BoardView) -> [f32; NUM_CELLS] {
        let q = self
            .target_network
            .forward(encode_view::<InferBackend>(view, &self.device));
        to_action_array(q)
    }

    /// Perform one gradient update step from the replay buffer.
    ///
    /// For each sampled transition the target is `reward` when `done`, else
    /// `reward + gamma * max_a target(next_state)[a]`; the loss is the mean
    /// squared error against the online network's value of the action taken.
    ///
    /// # Panics
    ///
    /// If the replay buffer is empty.
    pub fn train_step(&mut self, batch_size: usize) -> f32 {
        let batch: Vec<&Transition> = self
            .replay_buffer
            .sample(batch_size, &mut self.rng)
            .collect();
        let batch_size = batch.len();

        // Forward pass on current states: [B, 64]
        let state_tensors =
            encode_views_batch::<TrainBackend, _>(batch.iter().map(|t| &t.state), &self.device);
        let q_all = self.q_network.forward(state_tensors);

        // One-hot action mask [B, 64] to extract Q(s, a)
        let mut action_mask_data = vec![0.0f32; batch_size * NUM_CELLS];
        for (i, t) in batch.iter().enumerate() {
            action_mask_data[i * NUM_CELLS + t.action] = 1.0;
        }
        let action_mask = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(action_mask_data.as_slice()),
            &self.device,
        )
        .reshape([batch_size as i32, NUM_CELLS as i32]);

        // Q(s, a) = sum(q_all * mask, dim=1) -> [B, 1]
        let q_taken = (q_all * action_mask).sum_dim(1);

        // Targets from the target network (inference backend, no grad)
        let next_state_tensors = encode_views_batch::<InferBackend, _>(
            batch.iter().map(|t| &t.next_state),
            &self.device,
        );
        let next_q_data: Vec<f32> = self
            .target_network
            .forward(next_state_tensors)
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction");

        let target_data: Vec<f32> = batch
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if t.done {
                    t.reward
                } else {
                    let max_q = next_q_data[i * NUM_CELLS..(i + 1) * NUM_CELLS]
                        .iter()
                        .copied()
                        .fold(f32::NEG_INFINITY, f32::max);
                    t.reward + self.gamma * max_q
                }
            })
            .collect();

        let targets = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(target_data.as_slice()),
            &self.device,
        )
        .reshape([batch_size as i32, 1]);

        // MSE loss
        let diff = q_taken - targets;
        let loss = (diff.clone() * diff).mean();

        let loss_val: f32 = loss
            .clone()
            .into_data()
            .to_vec::<f32>()
            .expect("f32 loss tensor extraction")[0];

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.q_network);

        // Optimizer step: consumes q_network, returns updated one
        self.q_network = self
            .optimizer
            .step(self.learning_rate, self.q_network.clone(), grads);
        self.update_count += 1;

        loss_val
    }

    /// Save both networks as `{stem}_q_network.mpk` and
    /// `{stem}_target_network.mpk` in `dir`.
    pub fn save_to_dir(&self, dir: &Path, stem: &str) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();
        self.q_network
            .clone()
            .valid()
            .save_file(dir.join(format!("{stem}_q_network")), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;
        self.target_network
            .clone()
            .save_file(dir.join(format!("{stem}_target_network")), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;
        Ok(())
    }

    /// Load both networks saved by [`DqnLearner::save_to_dir`].
    pub fn load_from_dir(&mut self, dir: &Path, stem: &str) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();

        let q: QNetwork<TrainBackend> = self
            .net_config
            .init(&self.device)
            .load_file(dir.join(format!("{stem}_q_network")), &recorder, &self.device)
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
        self.q_network = q;

        let target: QNetwork<InferBackend> = self
            .net_config
            .init(&self.device)
            .load_file(
                dir.join(format!("{stem}_target_network")),
                &recorder,
                &self.device,
            )
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
        self.target_network = target;
        Ok(())
    }
}

/// Exploitation uses the online network.
impl ActionValues for DqnLearner {
    fn action_values(&self, view: &BoardView) -> [f32; NUM_CELLS] {
        let q = self
            .q_network
            .valid()
            .forward(encode_view::<InferBackend>(view, &self.device));
        to_action_array(q)
    }
}

fn to_action_array(q: Tensor<InferBackend, 2>) -> [f32; NUM_CELLS] {
    let q_vec: Vec<f32> = q
        .into_data()
        .to_vec()
        .expect("f32 tensor data extraction");
    let mut values = [0.0f32; NUM_CELLS];
    values.copy_from_slice(&q_vec[..NUM_CELLS]);
    values
}

/// Pure exploitation of a learner's online network. Never records
/// transitions, so it is safe to use for evaluation games.
pub struct GreedyAgent {
    learner: SharedLearner,
}

impl GreedyAgent {
    pub fn new(learner: SharedLearner) -> Self {
        GreedyAgent { learner }
    }
}

impl Policy for GreedyAgent {
    fn select_action(&mut self, state: &GameState) -> usize {
        let player = state.turn().expect("greedy agent asked to move in a finished game");
        let view = state.state_view(player);
        state.greedy_action(&*self.learner.borrow(), &view)
    }

    fn name(&self) -> &str {
        "Greedy"
    }
}
