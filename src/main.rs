//! Tonebox binary: wire the audio generator into the app and map
//! startup failures to a distinct exit code.

use std::process::ExitCode;

use tonebox::{App, AudioGenerator};

/// Exit code for fatal startup failures.
const EXIT_SETUP_FAILED: u8 = 2;

fn main() -> ExitCode {
    env_logger::init();

    let generator = match AudioGenerator::new() {
        Ok(generator) => generator,
        Err(e) => {
            log::error!("cannot open audio output: {e}");
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    let mut app = match App::new(Box::new(generator)) {
        Ok(app) => app,
        Err(e) => {
            log::error!("startup failed: {e}");
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    app.run();
    ExitCode::SUCCESS
}
