//! Signal-Controlled Intersection Simulation Library
//!
//! Simulates vehicle and pedestrian flow through one signalized road
//! intersection. The core is headless; consumers read state through the
//! snapshot queries on [`simulation::SimWorld`].

pub mod simulation;
