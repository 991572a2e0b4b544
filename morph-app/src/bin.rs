//! # disc-morph (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    morph_app::main()
}
