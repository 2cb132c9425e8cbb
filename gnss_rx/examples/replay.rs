//! Feeds a raw capture of the receiver's serial output through the engine.
//!
//! ```text
//! RUST_LOG=debug cargo run --example replay -- capture.bin
//! ```

use std::{env, fs, process};

use gnss_rx::{Config, Engine, Fresh, Intake};

fn main() {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: replay <capture file>");
        process::exit(2);
    };
    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("cannot read {path}: {err}");
            process::exit(1);
        },
    };

    let mut intake = Intake::<1024>::new();
    let (mut tx, rx) = intake.split();
    let config = Config::default().with_report_interval(Some(1_000));
    let mut engine = Engine::new(rx, config);

    // pretend the bytes arrive at 9600 baud, about one per millisecond
    for (now, chunk) in data.chunks(64).enumerate() {
        tx.push_slice(chunk);
        let now = (now * 64) as u32;
        if let Err(err) = engine.poll(now) {
            eprintln!("{err}");
        }
        if engine.take_fresh(Fresh::LOCATION).contains(Fresh::LOCATION) {
            println!("{}", engine.fix());
        }
    }

    for failure in engine.drain_failures() {
        println!("request failed: {failure:?}");
    }
    if let Some(version) = engine.version() {
        println!("receiver: {version:?}");
    }
    println!("{:?}", engine.stats());
}
