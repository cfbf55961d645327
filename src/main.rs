//! textconf command-line entry point

use anyhow::Result;

fn main() -> Result<()> {
    textconf::cli::run()
}
