use anyhow::Result;
use converging_core::{
    mock::{MockBodySpec, MockSimulator},
    Simulator as _,
};
use converging_robot::{Converging, ConvergingConfig};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::{thread::sleep, time::Duration};

fn run(wait: Duration) -> Result<()> {
    let sim = MockSimulator::new(MockBodySpec::converging());
    let mut rng = StdRng::seed_from_u64(42);
    let mut robot = Converging::build(sim, &ConvergingConfig::default(), &mut rng)?;

    for i in 0..50 {
        if i < 15 {
            robot.set_action(&[1.0; 6])?;
        } else {
            robot.set_action(&[0.0; 6])?;
        }
        robot.sim_mut().step()?;
        info!("{:?}", robot.get_obs()?);
        sleep(wait);
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Duration::from_millis(100))
}

#[test]
fn test_converging_steps() {
    run(Duration::from_millis(0)).unwrap();
}
