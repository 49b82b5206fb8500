mod dense_scenario;
mod simulator;
mod sls_recorder;
mod support;
mod throughput;
