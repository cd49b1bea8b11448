//! Dump command implementation

use norlog_core::device::Flash;
use norlog_core::logger::LogState;
use norlog_sim::SimFlash;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Adapts a `std::io::Write` sink to the `embedded_io::Write` the log
/// engine dumps into
struct StdSink<W>(W);

impl<W: Write> embedded_io::ErrorType for StdSink<W> {
    type Error = io::Error;
}

impl<W: Write> embedded_io::Write for StdSink<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

/// Run the dump command
pub fn run_dump(
    flash: &mut Flash<SimFlash>,
    state: &LogState,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let count = match output {
        Some(path) => {
            let mut sink = StdSink(File::create(path)?);
            let count = state.dump(flash, &mut sink)?;
            println!("Dumped {} entries to {:?}", count, path);
            count
        }
        None => {
            let stdout = io::stdout();
            let mut sink = StdSink(stdout.lock());
            state.dump(flash, &mut sink)?
        }
    };

    log::info!("dump complete, {} entries", count);
    Ok(())
}
