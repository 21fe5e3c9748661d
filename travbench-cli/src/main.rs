fn main() -> anyhow::Result<()> {
    travbench_cli::run()
}
