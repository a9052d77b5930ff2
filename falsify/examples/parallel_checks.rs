//! Example: running a batch of named properties on a worker pool.
//!
//! The per-trial hook output goes to the `tracing` log at info level.

use falsify::{
    Config, DefaultArbitrary, ParallelConfig, Testable, check_all_with, choose, for_all,
    for_all_gen, implies,
};

fn main() {
    let properties = vec![
        (
            "addition commutes".to_string(),
            for_all(i64::arbitrary(), |a| {
                for_all(i64::arbitrary(), move |b| a.wrapping_add(b) == b.wrapping_add(a))
            }),
        ),
        (
            "division truncates".to_string(),
            for_all(i32::arbitrary(), |a| {
                for_all(i32::arbitrary(), move |b| implies(b != 0, (a / b) * b + a % b == a))
            }),
        ),
        (
            "small dice".to_string(),
            for_all_gen(choose(1u8, 6), |face| {
                (face <= 6).into_property().collect(face)
            }),
        ),
    ];

    let config = Config::new()
        .with_max_tests(200)
        .with_on_every_trial(|index, arguments| format!("#{} {}", index, arguments.join(" ")));
    let parallel = ParallelConfig { num_threads: 3 };

    for result in check_all_with(&parallel, &config, properties) {
        match result {
            Ok(report) => print!("{}", report),
            Err(error) => eprintln!("invalid configuration: {}", error),
        }
    }
}
