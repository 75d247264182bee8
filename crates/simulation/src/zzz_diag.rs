//! TEMPORARY diagnostic — delete before finishing.
#[cfg(test)]
mod diag {
    use bevy::app::App;
    use bevy::prelude::*;
    use crate::clock::SimClock;
    use crate::SimulationPlugin;

    fn count_fixed_ticks(advance_ms: u64, updates: u32) -> (u32, f32) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        app.update();
        let dt = std::time::Duration::from_millis(advance_ms);
        for _ in 0..updates {
            app.world_mut().resource_mut::<Time<Virtual>>().advance_by(dt);
            app.update();
        }
        let tc = app.world().resource::<crate::TickCounter>().0 as u32;
        let elapsed = app.world().resource::<SimClock>().elapsed;
        (tc, elapsed)
    }

    #[test]
    fn diag_default() {
        let (ticks, elapsed) = count_fixed_ticks(100, 10);
        eprintln!("DIAG default: ticks={ticks} elapsed={elapsed}");
    }

    #[test]
    fn diag_fixed_timestep_and_manual() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        app.insert_resource(Time::<Fixed>::from_seconds(0.1));
        app.insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_millis(100),
        ));
        app.update();
        for _ in 0..10 {
            app.update();
        }
        let tc = app.world().resource::<crate::TickCounter>().0;
        let elapsed = app.world().resource::<SimClock>().elapsed;
        eprintln!("DIAG manual+fixed: ticks={tc} elapsed={elapsed}");
    }
}
