use std::error::Error;

use tabular_rl::{
    algo::{Algorithm, TdAgent, TdAgentConfig, TrainOptions},
    decay,
    exploration::EpsilonGreedy,
    gym::{grid_world::GridWorldConfig, GridWorld},
    table::QInit,
};

const NUM_EPISODES: u32 = 2000;

fn main() -> Result<(), Box<dyn Error>> {
    let mut env = GridWorld::new(GridWorldConfig::default());
    let mut agent = TdAgent::new(
        &env,
        TdAgentConfig {
            algorithm: Algorithm::QLearning,
            alpha: 0.5,
            gamma: 0.9,
            exploration: EpsilonGreedy::new(decay::Constant::new(0.1)),
            q_init: QInit::Zero,
            max_steps_per_episode: None,
            seed: None,
        },
    );

    agent.train(
        &mut env,
        TrainOptions::new(NUM_EPISODES).on_progress(|episode, total, reward| {
            println!("episode {episode}/{total}: reward {reward}");
        }),
    );

    let result = &agent.evaluate(&mut env, 1)[0];
    println!(
        "greedy rollout: {} steps, total reward {}",
        result.steps, result.total_reward
    );
    println!("path: {:?}", result.path);

    let snapshot_path = std::env::temp_dir().join("grid_world_q_table.json");
    agent.export().save(&snapshot_path)?;
    println!("snapshot written to {}", snapshot_path.display());

    Ok(())
}
