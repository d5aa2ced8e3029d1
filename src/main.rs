use anyhow::Result;

use cress::shell::Shell;

fn main() -> Result<()> {
    env_logger::init();
    Shell::new()?.run_interactive()
}
