//! Example: a correct property and a wrong one over lists
//!
//! Reversing twice is the identity. Reversing once is not, and the check
//! shrinks the first list it finds down to two distinct elements.

use falsify::{Config, DefaultArbitrary, check, check_with_config, for_all};

fn main() {
    println!("=== Reverse ===\n");

    let twice = for_all(Vec::<i32>::arbitrary(), |v| {
        let mut w = v.clone();
        w.reverse();
        w.reverse();
        w == v
    });
    match check(twice) {
        Ok(report) => print!("{}", report),
        Err(error) => eprintln!("invalid configuration: {}", error),
    }

    let once = for_all(Vec::<i32>::arbitrary(), |v| {
        let mut w = v.clone();
        w.reverse();
        w == v
    });
    let config = Config::new().with_name("reverse is identity");
    match check_with_config(&config, once) {
        Ok(report) => {
            print!("{}", report);
            if let Some(counterexample) = report.counterexample() {
                println!("started from {}", counterexample.original_arguments.join(" "));
            }
        }
        Err(error) => eprintln!("invalid configuration: {}", error),
    }
}
