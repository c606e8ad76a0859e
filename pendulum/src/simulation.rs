//! Closed-loop step response of a PID-controlled inverted pendulum,
//! with plant transfer function `1 / (M·l·s² − (M + m)·g)` and
//! controller `Kp + Ki/s + Kd·s` acting on the tracking error.
//!
//! The derivative of the unit step reference is an impulse at
//! `t = 0`, so the derivative term kicks the output with an
//! initial velocity of `Kd / (M·l)`.
use serde::{Deserialize, Serialize};

use std::error::Error;
use std::fmt;

/// Integration steps per output sample.
const SUBSTEPS: usize = 10;
/// Output magnitude beyond which the loop is considered unstable.
const DIVERGENCE_THRESHOLD: f64 = 1e3;
/// Cost added to the accumulated error of an unstable loop.
const DIVERGENCE_PENALTY: f64 = 1e6;

/// Physical parameters of the cart and pendulum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Mass of the cart (kg).
    pub cart_mass: f64,
    /// Mass of the pendulum (kg).
    pub pendulum_mass: f64,
    /// Length of the pendulum rod (m).
    pub length: f64,
    /// Gravitational acceleration (m/s²).
    pub gravity: f64,
}

impl Default for Plant {
    fn default() -> Plant {
        Plant {
            cart_mass: 1.0,
            pendulum_mass: 0.1,
            length: 1.0,
            gravity: 9.81,
        }
    }
}

/// Controller gains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    /// Reads gains from a `[Kp, Ki, Kd]` slice.
    pub fn from_slice(gains: &[f64]) -> Result<Gains, SimulationError> {
        match *gains {
            [kp, ki, kd] => Ok(Gains { kp, ki, kd }),
            _ => Err(SimulationError::GainCount(gains.len())),
        }
    }
}

/// The controller structures compared by the tuner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerKind {
    P,
    PI,
    PD,
    PID,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 4] = [
        ControllerKind::P,
        ControllerKind::PI,
        ControllerKind::PD,
        ControllerKind::PID,
    ];

    /// Zeroes the gains this controller doesn't use.
    pub fn restrict(self, gains: Gains) -> Gains {
        match self {
            ControllerKind::P => Gains {
                ki: 0.0,
                kd: 0.0,
                ..gains
            },
            ControllerKind::PI => Gains { kd: 0.0, ..gains },
            ControllerKind::PD => Gains { ki: 0.0, ..gains },
            ControllerKind::PID => gains,
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An error type indicating a simulation
/// could not be run.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A plant parameter was not positive and finite.
    InvalidPlant(&'static str, f64),
    /// The simulation duration or resolution was invalid.
    InvalidHorizon,
    /// The wrong number of gains was given.
    GainCount(usize),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlant(name, value) => write!(
                f,
                "plant parameter {} must be positive and finite, got {}",
                name, value
            ),
            Self::InvalidHorizon => {
                write!(f, "simulation duration and sample count must be positive")
            }
            Self::GainCount(n) => write!(f, "expected 3 gains (Kp, Ki, Kd), got {}", n),
        }
    }
}

impl Error for SimulationError {}

/// A fixed-horizon step response simulation.
#[derive(Clone, Debug)]
pub struct Simulation {
    plant: Plant,
    duration: f64,
    samples: usize,
}

impl Simulation {
    /// Creates a simulation of `duration` seconds,
    /// sampled `samples` times.
    pub fn new(plant: Plant, duration: f64, samples: usize) -> Result<Simulation, SimulationError> {
        for (name, value) in [
            ("cart_mass", plant.cart_mass),
            ("pendulum_mass", plant.pendulum_mass),
            ("length", plant.length),
            ("gravity", plant.gravity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidPlant(name, value));
            }
        }
        if !(duration.is_finite() && duration > 0.0) || samples == 0 {
            return Err(SimulationError::InvalidHorizon);
        }
        Ok(Simulation {
            plant,
            duration,
            samples,
        })
    }

    /// Returns the sampled output for a unit step reference,
    /// stopping early if the output diverges.
    pub fn step_response(&self, gains: Gains) -> Vec<f64> {
        let mut response = Vec::with_capacity(self.samples);
        self.simulate(gains, |y| {
            response.push(y);
        });
        response
    }

    /// Returns the integral of the squared tracking error
    /// over the simulation horizon. Unstable loops are
    /// charged a large fixed penalty on top.
    pub fn integral_squared_error(&self, gains: &[f64]) -> Result<f64, SimulationError> {
        let gains = Gains::from_slice(gains)?;
        let dt = self.duration / self.samples as f64;
        let mut cost = 0.0;
        let stable = self.simulate(gains, |y| cost += (1.0 - y).powi(2) * dt);
        if stable {
            Ok(cost)
        } else {
            Ok(cost + DIVERGENCE_PENALTY)
        }
    }

    /// Integrates `a·y'' − b·y = u` under PID control with
    /// semi-implicit Euler, passing every sample to `sink`.
    /// Returns `false` if the output diverged.
    fn simulate<S: FnMut(f64)>(&self, gains: Gains, mut sink: S) -> bool {
        let a = self.plant.cart_mass * self.plant.length;
        let b = (self.plant.cart_mass + self.plant.pendulum_mass) * self.plant.gravity;
        let dt = self.duration / (self.samples * SUBSTEPS) as f64;

        // Impulse of Kd·δ(t) from differentiating the step.
        let (mut y, mut dy, mut integral) = (0.0, gains.kd / a, 0.0);
        for _ in 0..self.samples {
            for _ in 0..SUBSTEPS {
                let error = 1.0 - y;
                integral += error * dt;
                // The reference is constant after t = 0, so de/dt = -dy/dt.
                let u = gains.kp * error + gains.ki * integral - gains.kd * dy;
                dy += (u + b * y) / a * dt;
                y += dy * dt;
            }
            if !y.is_finite() || y.abs() > DIVERGENCE_THRESHOLD {
                return false;
            }
            sink(y);
        }
        true
    }
}
