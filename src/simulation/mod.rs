pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod oscillator;
pub mod coupled;
pub mod backend;
pub mod modal;
pub mod scenario;
