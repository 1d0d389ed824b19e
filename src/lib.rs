pub mod camera;
pub mod channel;
pub mod dashboard;
pub mod portal;
pub mod sampler;
pub mod settings;
pub mod telemetry;
pub mod view;
