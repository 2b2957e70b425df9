use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use traffic_jam::display::{Layout, TerminalSink};
use traffic_jam::simulation::{
    FlowStats, InitPolicy, InitialVelocity, Parameters, Placement, Simulation,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlacementArg {
    Even,
    Random,
    Alternate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VelocityArg {
    Zero,
    Random,
    Moving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DisplayArg {
    Strip,
    Ring,
    Combined,
    Scrolling,
    None,
}

/// Named road setups
///
/// Both start with cars on every other cell rolling at 1 to 3 cells per
/// step unless `--placement` or `--initial-velocity` say otherwise.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// 100 cells, 35 cars, vmax 3, p 0.25, 500 steps
    D91,
    /// 300 cells, 60 cars, vmax 4, p 0.3, 4000 steps
    D77,
}

#[derive(Parser)]
#[command(name = "traffic_jam")]
#[command(about = "Single-lane ring road traffic jam simulation")]
struct Cli {
    /// Number of cells on the ring
    #[arg(short = 'l', long, default_value = "100")]
    length: usize,

    /// Number of cars on the road
    #[arg(short = 'n', long, default_value = "35")]
    cars: usize,

    /// Maximum velocity in cells per step
    #[arg(long, default_value = "3")]
    vmax: usize,

    /// Probability that a car slows down at each step
    #[arg(short = 'p', long, default_value = "0.25")]
    brake_probability: f64,

    /// Number of steps to simulate
    #[arg(long, default_value = "500")]
    steps: u64,

    /// Seed for the random stream
    #[arg(long, default_value = "0")]
    seed: u64,

    /// How cars are placed at the start [default: even, alternate with a preset]
    #[arg(long, value_enum)]
    placement: Option<PlacementArg>,

    /// How starting velocities are chosen [default: zero, moving with a preset]
    #[arg(long, value_enum)]
    initial_velocity: Option<VelocityArg>,

    /// How each step is printed
    #[arg(long, value_enum, default_value = "strip")]
    display: DisplayArg,

    /// Pause between printed frames in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Use a named setup instead of length, cars, vmax, p and steps
    #[arg(long, value_enum)]
    preset: Option<Preset>,
}

impl Cli {
    /// Road parameters and run length, with any preset applied
    fn parameters(&self) -> Result<(Parameters, u64)> {
        let (length, cars, vmax, p, steps) = match self.preset {
            Some(Preset::D91) => (100, 35, 3, 0.25, 500),
            Some(Preset::D77) => (300, 60, 4, 0.3, 4000),
            None => (
                self.length,
                self.cars,
                self.vmax,
                self.brake_probability,
                self.steps,
            ),
        };
        let params = Parameters::new(length, cars, vmax, p).context("Invalid road parameters")?;
        Ok((params, steps))
    }

    fn policy(&self) -> InitPolicy {
        let (default_placement, default_velocity) = match self.preset {
            Some(_) => (PlacementArg::Alternate, VelocityArg::Moving),
            None => (PlacementArg::Even, VelocityArg::Zero),
        };
        let placement = match self.placement.unwrap_or(default_placement) {
            PlacementArg::Even => Placement::Even,
            PlacementArg::Random => Placement::Random,
            PlacementArg::Alternate => Placement::Alternate,
        };
        let velocity = match self.initial_velocity.unwrap_or(default_velocity) {
            VelocityArg::Zero => InitialVelocity::Zero,
            VelocityArg::Random => InitialVelocity::Random,
            VelocityArg::Moving => InitialVelocity::Moving,
        };
        InitPolicy::new(placement, velocity)
    }

    fn layout(&self) -> Option<Layout> {
        match self.display {
            DisplayArg::Strip => Some(Layout::Strip),
            DisplayArg::Ring => Some(Layout::Ring),
            DisplayArg::Combined => Some(Layout::Combined),
            DisplayArg::Scrolling => Some(Layout::Scrolling),
            DisplayArg::None => None,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,traffic_jam=info"),
    )
    .init();

    let cli = Cli::parse();
    let (params, steps) = cli.parameters()?;

    info!("Running traffic jam simulation for {} steps", steps);

    let mut flow = FlowStats::new();
    {
        let mut simulation = Simulation::new(params, cli.policy(), cli.seed)
            .context("Failed to initialize the road")?;
        if let Some(layout) = cli.layout() {
            simulation.register(TerminalSink::new(
                layout,
                Duration::from_millis(cli.delay_ms),
            ));
        }
        simulation.register(&mut flow);

        simulation.publish();
        simulation.run_steps(steps).context("Simulation aborted")?;
    }

    flow.log_summary();
    Ok(())
}
