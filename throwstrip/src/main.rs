//! Main binary entry point for `throwstrip`.
//!
//! This binary simply delegates to the shared `entry_point::run_with_args()` function
//! so it behaves exactly like the `throwstrip-cli` binary.

use anyhow::Result;

fn main() -> Result<()> {
    let code = throwstrip::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
