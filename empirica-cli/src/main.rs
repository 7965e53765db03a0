//! Empirica command-line entry point

fn main() -> anyhow::Result<()> {
    empirica_cli::run()
}
