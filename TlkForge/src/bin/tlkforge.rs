fn main() -> anyhow::Result<()> {
    tlkforge::cli::run_cli()
}
