//! # photo-ingest CLI
//!
//! Command-line interface for the ingest core.
//!
//! ## Usage
//! ```bash
//! photo-ingest watch
//! photo-ingest import-card /media/alice/EOS_DIGITAL/DCIM --project ~/Projects/2024_05_01_Wedding
//! photo-ingest thumbnail ~/Projects/2024_05_01_Wedding/RAW/*.CR2
//! ```

mod cli;

use photo_ingest::Result;

fn main() -> Result<()> {
    cli::run()
}
