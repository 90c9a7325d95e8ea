use tabular_rl::{
    algo::{Algorithm, TdAgent, TdAgentConfig, TrainOptions},
    augment::GoalDirection,
    decay,
    exploration::EpsilonGreedy,
    gym::{
        grid_world::{GridWorldConfig, Move},
        FrozenLake, GridWorld, MountainCar,
    },
    table::QInit,
};

fn grid_config(algorithm: Algorithm, epsilon: f64, seed: u64) -> TdAgentConfig<decay::Constant> {
    TdAgentConfig {
        algorithm,
        alpha: 0.5,
        gamma: 0.9,
        exploration: EpsilonGreedy::new(decay::Constant::new(epsilon)),
        q_init: QInit::Zero,
        max_steps_per_episode: None,
        seed: Some(seed),
    }
}

#[test]
fn q_learning_masters_the_open_grid() {
    let mut env = GridWorld::new(GridWorldConfig::default());
    let mut agent = TdAgent::new(&env, grid_config(Algorithm::QLearning, 0.1, 7));

    let rewards = agent.train(&mut env, TrainOptions::new(2000));
    assert_eq!(rewards.len(), 2000);

    let result = &agent.evaluate(&mut env, 1)[0];
    assert!(result.success);
    assert_eq!(result.steps, 8);
    assert!(result.total_reward >= -6.0 - 1e-9);
    assert_eq!(result.path.first(), Some(&(0, 0)));
    assert_eq!(result.path.last(), Some(&(4, 4)));
    assert_eq!(result.path.len(), result.steps + 1);
}

#[test]
fn sarsa_masters_the_open_grid() {
    let mut env = GridWorld::new(GridWorldConfig::default());
    let mut agent = TdAgent::new(&env, grid_config(Algorithm::Sarsa, 0.1, 17));

    agent.train(&mut env, TrainOptions::new(2000));

    let result = &agent.evaluate(&mut env, 1)[0];
    assert!(result.success);
    assert_eq!(result.steps, 8);
}

#[test]
fn learned_policy_covers_every_free_cell() {
    let mut env = GridWorld::new(GridWorldConfig::default());
    let mut agent = TdAgent::new(&env, grid_config(Algorithm::QLearning, 0.1, 7));
    agent.train(&mut env, TrainOptions::new(2000));

    let policy = agent.policy(&env);
    assert_eq!(policy.len(), 25);

    // cells adjacent to the goal must step into it
    assert_eq!(agent.best_action((4, 3)), Move::Right);
    assert_eq!(agent.best_action((3, 4)), Move::Down);
}

#[test]
fn obstacles_reroute_the_greedy_path() {
    // wall across the middle with a single gap at (2, 4)
    let obstacles = [(2, 0), (2, 1), (2, 2), (2, 3)].into_iter().collect();
    let mut env = GridWorld::new(GridWorldConfig {
        obstacles,
        ..Default::default()
    });
    let mut agent = TdAgent::new(&env, grid_config(Algorithm::QLearning, 0.2, 23));

    agent.train(&mut env, TrainOptions::new(3000));

    let result = &agent.evaluate(&mut env, 1)[0];
    assert!(result.success);
    assert_eq!(result.steps, 8);
    assert!(result.path.contains(&(2, 4)), "path must use the gap: {:?}", result.path);
}

#[test]
fn goal_direction_generalizes_across_goals() {
    let mut env = GridWorld::new(GridWorldConfig {
        randomize_goal: true,
        seed: Some(11),
        ..Default::default()
    });
    let mut agent = TdAgent::with_augment(
        &env,
        grid_config(Algorithm::QLearning, 0.2, 12),
        GoalDirection,
    );

    agent.train(&mut env, TrainOptions::new(3000));

    let results = agent.evaluate(&mut env, 20);
    let successes = results.iter().filter(|r| r.success).count();
    assert!(
        successes >= 15,
        "only {successes}/20 goal-conditioned rollouts reached their goal"
    );
}

#[test]
fn q_learning_crosses_the_lake() {
    let mut env = FrozenLake::new();
    let mut agent = TdAgent::new(
        &env,
        TdAgentConfig {
            algorithm: Algorithm::QLearning,
            alpha: 0.7,
            gamma: 0.95,
            exploration: EpsilonGreedy::new(decay::Exponential::new(1e-3, 1.0, 0.01).unwrap()),
            q_init: QInit::Zero,
            max_steps_per_episode: None,
            seed: Some(5),
        },
    );

    agent.train(&mut env, TrainOptions::new(2000));

    let result = &agent.evaluate(&mut env, 1)[0];
    assert!(result.success);
    assert_eq!(result.steps, 6);
    assert!((result.total_reward - 0.5).abs() < 1e-9);
}

#[test]
fn sarsa_training_runs_on_mountain_car() {
    let mut env = MountainCar::new(18, 14).with_seed(21);
    let mut agent = TdAgent::new(
        &env,
        TdAgentConfig {
            algorithm: Algorithm::Sarsa,
            alpha: 0.1,
            gamma: 0.99,
            exploration: EpsilonGreedy::new(decay::Constant::new(0.1)),
            q_init: QInit::Jitter {
                base: 0.0,
                spread: 0.01,
            },
            max_steps_per_episode: Some(400),
            seed: Some(22),
        },
    );

    let rewards = agent.train(&mut env, TrainOptions::new(30));

    assert_eq!(rewards.len(), 30);
    assert!(rewards.iter().all(|&r| (-400.0..=0.0).contains(&r)));
}
