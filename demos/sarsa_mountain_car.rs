use std::{error::Error, fs, path::Path};

use tabular_rl::{
    algo::{Algorithm, TdAgent, TdAgentConfig, TrainOptions},
    decay,
    exploration::EpsilonGreedy,
    gym::MountainCar,
    table::QInit,
};

const NUM_EPISODES: u32 = 500;

fn main() -> Result<(), Box<dyn Error>> {
    let out = Path::new("demos/out");
    fs::create_dir_all(out)?;

    let mut env = MountainCar::new(18, 14);
    let mut agent = TdAgent::new(
        &env,
        TdAgentConfig {
            algorithm: Algorithm::Sarsa,
            alpha: 0.1,
            gamma: 0.99,
            exploration: EpsilonGreedy::new(decay::Exponential::new(5e-3, 1.0, 0.05)?),
            q_init: QInit::Zero,
            max_steps_per_episode: Some(1000),
            seed: None,
        },
    );

    let mut wtr = csv::Writer::from_path(out.join("mountain_car.csv"))?;
    wtr.write_record(["episode", "steps", "reward"])?;

    for episode in 0..NUM_EPISODES {
        let summary = agent.go(&mut env);
        wtr.write_record(&[
            episode.to_string(),
            summary.steps.to_string(),
            summary.total_reward.to_string(),
        ])?;
    }

    wtr.flush()?;
    println!("learning curve written to {}", out.join("mountain_car.csv").display());

    Ok(())
}
