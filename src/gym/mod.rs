pub mod frozen_lake;
pub mod grid_world;
pub mod mountain_car;

pub use frozen_lake::FrozenLake;
pub use grid_world::GridWorld;
pub use mountain_car::MountainCar;
