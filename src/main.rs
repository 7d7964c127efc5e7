mod audio;
mod clock;
mod constants;
mod engine;
mod input;
mod pad;
mod platform;
mod shell;
mod store;

use engine::EchoEngine;

fn main() -> Result<(), anyhow::Error> {
    platform::run("cabinet", EchoEngine::new)
}
